//! scm-changelog - change logs from SCM history
//!
//! Runs a source-control client (CVS, Subversion, Perforce, ClearCase,
//! StarTeam or Visual SourceSafe), parses its log output and collects the
//! commits into change sets that can be written as XML.
//!
//! This library provides:
//! - [`changelog`]: Configuration, window orchestration and the XML document
//! - [`model`]: Change log entries and sets
//! - [`scm`]: Connections, backends, log generation and log parsers

pub mod changelog;
pub mod model;
pub mod scm;
