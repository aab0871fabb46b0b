//! File-safety checks around destructive writes: hashing, backups,
//! collision detection and overwrite confirmation.

pub mod checksum;
pub mod gate;
pub mod types;

pub use checksum::{compute_checksum, create_backup, file_digest};
pub use gate::{AssumeYes, OverwritePrompt, SafetyGate, StdinPrompt};
pub use types::*;
