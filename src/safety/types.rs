use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Toggles for the checks run before any destructive write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub require_confirmation: bool,
    pub create_backup: bool,
    pub check_hash: bool,
    pub prevent_overwrite: bool,
    pub backup_suffix: String,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        SafetyConfig {
            require_confirmation: true,
            create_backup: true,
            check_hash: true,
            prevent_overwrite: true,
            backup_suffix: ".backup".to_string(),
        }
    }
}

impl SafetyConfig {
    /// No prompts; backups and hash checks stay on
    pub fn non_interactive() -> Self {
        SafetyConfig {
            require_confirmation: false,
            ..Default::default()
        }
    }
}

/// Result of a passed safety check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GateOutcome {
    pub target_existed: bool,
    /// Backup copy of the previous target, when one was made
    pub backup: Option<PathBuf>,
}
