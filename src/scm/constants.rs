//! SCM-specific constants
//!
//! Centralized definitions for client executables, connection prefixes and
//! log markers.

/// Prefix every connection string starts with
pub const SCM_PREFIX: &str = "scm";

/// Default pattern for date markers and the `<date>` element
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";

/// Client binaries
pub mod executables {
    pub const CVS: &str = "cvs";
    pub const SVN: &str = "svn";
    pub const PERFORCE: &str = "p4";
    pub const CLEARCASE: &str = "cleartool";
    pub const STARTEAM: &str = "stcmd";
    pub const VSS: &str = "ss";
}

/// Connection type tokens
pub mod types {
    pub const CVS: &str = "cvs";
    pub const SVN: &str = "svn";
    pub const PERFORCE: &str = "perforce";
    pub const CLEARCASE: &str = "clearcase";
    pub const STARTEAM: &str = "starteam";
    pub const VSS: &str = "vss";
}

/// Separator lines in client output
pub mod markers {
    /// CVS/StarTeam: separates revisions of one file
    pub const REVISION_SEPARATOR: &str = "----------------------------";
    /// CVS: terminates the history of one file (77 '=')
    pub const CVS_FILE_END: &str =
        "=============================================================================";
    /// SVN: terminates one log entry (72 '-')
    pub const SVN_ENTRY_END: &str =
        "------------------------------------------------------------------------";
    /// StarTeam: terminates the history of one file (67 '=')
    pub const STARTEAM_FILE_END: &str =
        "===================================================================";
}

/// stderr chatter that is not worth reporting
pub mod noise {
    pub const CVS_SERVER_LOGGING: &str = "cvs server: Logging";
}
