//! Data models for scm-changelog
//!
//! Backend-independent structures shared by the parsers, the orchestrator
//! and the XML writer.

mod entry;
mod set;

pub use entry::{ChangeLogEntry, ChangeLogFile};
pub use set::ChangeLogSet;
