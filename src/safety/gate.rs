use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};

use super::checksum::{create_backup, file_digest};
use super::types::{GateOutcome, SafetyConfig};

/// Asks whether an existing target may be overwritten
pub trait OverwritePrompt {
    fn confirm(&self, target: &Path) -> bool;
}

impl<F> OverwritePrompt for F
where
    F: Fn(&Path) -> bool,
{
    fn confirm(&self, target: &Path) -> bool {
        self(target)
    }
}

/// Interactive `[y/N]` prompt on stdin; anything but `y`/`yes` declines
pub struct StdinPrompt;

impl OverwritePrompt for StdinPrompt {
    fn confirm(&self, target: &Path) -> bool {
        print!("File '{}' exists. Overwrite? [y/N]: ", target.display());
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut response = String::new();
        if std::io::stdin().lock().read_line(&mut response).is_err() {
            return false;
        }
        matches!(response.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Approves every overwrite
pub struct AssumeYes;

impl OverwritePrompt for AssumeYes {
    fn confirm(&self, _target: &Path) -> bool {
        true
    }
}

/// Runs collision, confirmation and backup checks before a write
pub struct SafetyGate {
    config: SafetyConfig,
    prompt: Box<dyn OverwritePrompt>,
}

impl Default for SafetyGate {
    fn default() -> Self {
        SafetyGate::new(SafetyConfig::default())
    }
}

impl SafetyGate {
    /// Gate that prompts on stdin when confirmation is required
    pub fn new(config: SafetyConfig) -> Self {
        SafetyGate {
            config,
            prompt: Box::new(StdinPrompt),
        }
    }

    pub fn with_prompt(config: SafetyConfig, prompt: impl OverwritePrompt + 'static) -> Self {
        SafetyGate {
            config,
            prompt: Box::new(prompt),
        }
    }

    pub fn config(&self) -> &SafetyConfig {
        &self.config
    }

    /// True when `target` exists, shares `source`'s file stem and differs in content
    pub fn detect_collision(&self, source: &Path, target: &Path) -> bool {
        if !target.exists() || source.file_stem() != target.file_stem() {
            return false;
        }
        file_digest(source) != file_digest(target)
    }

    /// Run every check for a prospective write from `source` to `target`.
    ///
    /// The caller must not write unless this returns `Ok`.
    pub fn check(&self, source: &Path, target: &Path) -> Result<GateOutcome> {
        if !self.screen(source, target)? {
            return Ok(GateOutcome::default());
        }
        Ok(self.back_up(target))
    }

    /// Run the checks for every file a write will produce.
    ///
    /// All targets are screened before any backup is made, so a refusal on
    /// one target leaves every other target untouched.
    pub fn check_all(&self, source: &Path, targets: &[PathBuf]) -> Result<Vec<GateOutcome>> {
        let mut existing = Vec::with_capacity(targets.len());
        for target in targets {
            existing.push(self.screen(source, target)?);
        }

        Ok(targets
            .iter()
            .zip(existing)
            .map(|(target, exists)| {
                if exists {
                    self.back_up(target)
                } else {
                    GateOutcome::default()
                }
            })
            .collect())
    }

    /// Collision and confirmation checks; `Ok(true)` when `target` exists
    fn screen(&self, source: &Path, target: &Path) -> Result<bool> {
        if self.config.check_hash && self.detect_collision(source, target) {
            return Err(ConvertError::Collision(target.to_path_buf()));
        }

        if !target.exists() {
            return Ok(false);
        }

        if self.config.prevent_overwrite
            && self.config.require_confirmation
            && !self.prompt.confirm(target)
        {
            return Err(ConvertError::Declined(target.to_path_buf()));
        }
        Ok(true)
    }

    fn back_up(&self, target: &Path) -> GateOutcome {
        let backup = if self.config.create_backup {
            create_backup(target, &self.config.backup_suffix)
        } else {
            None
        };

        GateOutcome {
            target_existed: true,
            backup,
        }
    }
}
