use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};

/// Compute SHA-256 checksum of a file
pub fn compute_checksum(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path)
        .map_err(|e| ConvertError::parse(path, format!("Failed to open file for checksum: {}", e)))?;

    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| ConvertError::parse(path, format!("Failed to read file for checksum: {}", e)))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}

/// Checksum of a file, or an empty string when it does not exist or cannot be read
pub fn file_digest(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    if !path.exists() {
        return String::new();
    }
    compute_checksum(path).unwrap_or_else(|e| {
        tracing::warn!("{}", e);
        String::new()
    })
}

/// Copy an existing file to `<path><suffix>`, or `<path><suffix>.<n>` when
/// that name is taken.
///
/// Returns `None` when there is nothing to back up or the copy failed.
pub fn create_backup(path: impl AsRef<Path>, suffix: &str) -> Option<PathBuf> {
    let path = path.as_ref();
    if !path.exists() {
        return None;
    }

    let base = with_suffix(path, suffix);
    let mut backup_path = base.clone();
    let mut counter = 1;
    while backup_path.exists() {
        backup_path = with_suffix(&base, &format!(".{}", counter));
        counter += 1;
    }

    match std::fs::copy(path, &backup_path) {
        Ok(_) => {
            tracing::info!("Backup created: {}", backup_path.display());
            Some(backup_path)
        }
        Err(e) => {
            tracing::warn!("Could not create backup of {}: {}", path.display(), e);
            None
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
