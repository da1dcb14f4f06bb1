//! Property-based tests for SCM log parsers
//!
//! Uses proptest to verify parsers handle arbitrary input without panicking
//! and merge per-file chunks of one commit into a single entry.

use proptest::prelude::*;
use scm_changelog::scm::LogParser;
use scm_changelog::scm::parser::{
    ClearCaseLogParser, CvsLogParser, PerforceLogParser, StarteamLogParser, SvnLogParser,
    VssLogParser,
};

fn all_parsers() -> Vec<Box<dyn LogParser>> {
    vec![
        Box::new(CvsLogParser::new()),
        Box::new(SvnLogParser::new()),
        Box::new(PerforceLogParser::new("//depot/".len(), None)),
        Box::new(ClearCaseLogParser::new()),
        Box::new(StarteamLogParser::new()),
        Box::new(VssLogParser::new("/Project")),
    ]
}

// =============================================================================
// Strategy generators for realistic-ish log fragments
// =============================================================================

/// Lines that steer the state machines into their interesting states
fn marker_line_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Working file: a.c",
        "revision 1.1",
        "date: 2002/04/10 04:48:12;  author: dion;  state: Exp;",
        "----------------------------",
        "=============================================================================",
        "r1 | dion | 2002-08-26 14:33:26 +0000 (Mon, 26 Aug 2002) | 1 line",
        "   M /trunk/a.c",
        "",
        "------------------------------------------------------------------------",
        "//depot/a.c",
        "... #1 change 1 add on 2003/10/15 13:38:40 by jim@desk (text)",
        "NAME:a.c",
        "DATE:20030805.101500",
        "COMM:checkin version",
        "USER:bob",
        "*****  a.c  *****",
        "Version 2",
        "User: Bob          Date: 24.03.04   Time:  9:05",
        "$/Project/src",
        "Comment: hello",
        "Folder: Maven  (working dir: /tmp)",
        "History for: a.c",
        "Revision: 3 View: Maven",
        "Author: Bob Date: 07/04/03 09:17:31",
    ])
    .prop_map(str::to_string)
}

fn description_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 _-]{0,40}".prop_map(|s| s.trim_end().to_string())
}

fn file_name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}\\.[a-z]{1,3}"
}

// =============================================================================
// Robustness tests: parsers should never panic on arbitrary input
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Arbitrary text yields Ok or Err, never a panic
    #[test]
    fn parsers_do_not_panic_on_arbitrary_input(input in ".*") {
        for mut parser in all_parsers() {
            let _ = parser.parse(&mut input.as_bytes());
        }
    }

    /// Arbitrary bytes, including invalid UTF-8 and lone carriage returns
    #[test]
    fn parsers_do_not_panic_on_arbitrary_bytes(input in prop::collection::vec(any::<u8>(), 0..512)) {
        for mut parser in all_parsers() {
            let _ = parser.parse(&mut input.as_slice());
        }
    }

    /// Shuffled marker lines exercise every transition
    #[test]
    fn parsers_do_not_panic_on_marker_soup(
        lines in prop::collection::vec(marker_line_strategy(), 0..40),
    ) {
        let input = lines.join("\n");
        for mut parser in all_parsers() {
            let _ = parser.parse(&mut input.as_bytes());
        }
    }
}

// =============================================================================
// Structured input tests: per-file chunks merge into one entry
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// One CVS commit spread over several files becomes one entry listing them all
    #[test]
    fn cvs_merges_commit_across_files(
        files in prop::collection::btree_set(file_name_strategy(), 1..6),
        author in "[a-z]{3,8}",
        comment in description_strategy(),
        second in 0u32..60,
    ) {
        let mut log = String::new();
        for name in &files {
            log.push_str(&format!(
                "Working file: {name}\n\
                 ----------------------------\n\
                 revision 1.1\n\
                 date: 2002/04/10 04:48:{second:02};  author: {author};  state: Exp;\n\
                 {comment}\n\
                 =============================================================================\n"
            ));
        }

        let entries = CvsLogParser::new().parse(&mut log.as_bytes()).unwrap();
        prop_assert_eq!(entries.len(), 1);
        prop_assert_eq!(&entries[0].author, &author);
        prop_assert_eq!(&entries[0].comment, &format!("{comment}\n"));
        let names: Vec<&str> = entries[0].files.iter().map(|f| f.name.as_str()).collect();
        let expected: Vec<&str> = files.iter().map(String::as_str).collect();
        prop_assert_eq!(names, expected);
    }

    /// Perforce revisions of one changelist merge regardless of comment text
    #[test]
    fn perforce_merges_by_changelist(
        files in prop::collection::btree_set(file_name_strategy(), 1..6),
        changelist in 1u64..100_000,
    ) {
        let mut log = String::new();
        for (i, name) in files.iter().enumerate() {
            log.push_str(&format!(
                "//depot/{name}\n\
                 ... #1 change {changelist} add on 2003/10/15 13:38:40 by jim@desk (text)\n\
                 \n\
                 \tchunk {i}\n\
                 \n"
            ));
        }

        let mut parser = PerforceLogParser::new("//depot/".len(), None);
        let entries = parser.parse(&mut log.as_bytes()).unwrap();
        prop_assert_eq!(entries.len(), 1);
        prop_assert_eq!(entries[0].files.len(), files.len());
        prop_assert!(entries[0].files.iter().all(|f| f.revision == "1"));
    }

    /// Subversion never merges: one entry per revision, in log order
    #[test]
    fn svn_keeps_one_entry_per_revision(revisions in 1usize..10) {
        let separator = "-".repeat(72);
        let mut log = format!("{separator}\n");
        for r in (1..=revisions).rev() {
            log.push_str(&format!(
                "r{r} | dion | 2002-08-26 14:33:26 +0000 (Mon, 26 Aug 2002) | 1 line\n\
                 Changed paths:\n   M /trunk/a.c\n\nSame message\n{separator}\n"
            ));
        }

        let entries = SvnLogParser::new().parse(&mut log.as_bytes()).unwrap();
        prop_assert_eq!(entries.len(), revisions);
        let first_revision = entries[0].files[0].revision.clone();
        prop_assert_eq!(first_revision, revisions.to_string());
    }
}
