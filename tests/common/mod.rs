//! Common test utilities for integration tests.
//!
//! Note: Each integration test file compiles as a separate crate,
//! so not all helpers are used in every test file. We suppress
//! dead_code warnings at the module level.

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

/// Two Subversion revisions, newest first
pub const SVN_LOG: &str = "\
------------------------------------------------------------------------
r15 | evenisse | 2002-08-26 14:33:26 +0000 (Mon, 26 Aug 2002) | 2 lines
Changed paths:
   M /maven/trunk/project.xml
   A /maven/trunk/src/Main.java

Fix the build
and add main
------------------------------------------------------------------------
r14 | jvanzyl | 2002-08-24 09:00:00 +0000 (Sat, 24 Aug 2002) | 1 line
Changed paths:
   M /maven/trunk/README

Initial README
------------------------------------------------------------------------
";

pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

/// A scratch directory holding captured logs and generated documents.
///
/// Removed when dropped.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Write `contents` to `name` inside the workspace and return its path
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write file");
        path
    }
}
