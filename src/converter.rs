use std::path::{Path, PathBuf};

use crate::config::ConversionConfig;
use crate::error::{ConvertError, Result};
use crate::formats::{planned_outputs, read_file, write_file};
use crate::safety::{compute_checksum, file_digest, SafetyConfig, SafetyGate};

/// Outcome of a successful conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub source_checksum: String,
    /// Digest of the first file written, for external verification
    pub output_checksum: String,
    /// First backup made, usually of `output` itself
    pub backup: Option<PathBuf>,
    /// Every backup made before writing
    pub backups: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    /// Metadata attributes that could not be reapplied
    pub skipped: Vec<String>,
}

/// Reads, checks and writes one file at a time
pub struct Converter {
    config: ConversionConfig,
    gate: SafetyGate,
}

impl Default for Converter {
    fn default() -> Self {
        Converter::new(ConversionConfig::default(), SafetyGate::default())
    }
}

impl Converter {
    pub fn new(config: ConversionConfig, gate: SafetyGate) -> Self {
        Converter { config, gate }
    }

    /// Converter that never prompts; backups and collision checks stay on
    pub fn non_interactive(config: ConversionConfig) -> Self {
        Converter::new(config, SafetyGate::new(SafetyConfig::non_interactive()))
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn safety(&self) -> &SafetyConfig {
        self.gate.config()
    }

    /// Convert `input` into the format named by `output`'s extension.
    ///
    /// Nothing is written unless the safety gate passes for every file the
    /// write will produce.
    pub fn convert(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<ConversionReport> {
        let input = input.as_ref();
        let output = output.as_ref();

        if !input.exists() {
            return Err(ConvertError::not_found(input));
        }
        tracing::info!("Converting {} -> {}", input.display(), output.display());

        let (tables, mut metadata) = read_file(input, &self.config)?;
        tracing::info!("Read {} sheet(s) from {}", tables.len(), input.display());

        let targets = planned_outputs(&tables, output, Some(&metadata), &self.config)?;
        let backups: Vec<PathBuf> = self
            .gate
            .check_all(input, &targets)?
            .into_iter()
            .filter_map(|outcome| outcome.backup)
            .collect();
        for backup in &backups {
            tracing::info!("Previous output kept at {}", backup.display());
        }

        let source_checksum = compute_checksum(input)?;
        metadata.file_hash = source_checksum.clone();
        metadata.conversion_timestamp = chrono::Local::now().to_rfc3339();

        let report = write_file(&tables, output, Some(&metadata), &self.config)?;
        if !report.skipped.is_empty() {
            tracing::warn!("{} metadata attribute(s) could not be restored", report.skipped.len());
        }

        let output_checksum = report.files.first().map(file_digest).unwrap_or_default();
        tracing::info!(
            "Conversion complete: {} file(s), output hash {}",
            report.files.len(),
            output_checksum.get(..16).unwrap_or(output_checksum.as_str())
        );

        Ok(ConversionReport {
            source: input.to_path_buf(),
            output: output.to_path_buf(),
            source_checksum,
            output_checksum,
            backup: backups.first().cloned(),
            backups,
            files: report.files,
            skipped: report.skipped,
        })
    }
}
