use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a conversion
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Collision detected: {} exists with different content", .0.display())]
    Collision(PathBuf),

    #[error("Overwrite of {} cancelled by caller", .0.display())]
    Declined(PathBuf),

    #[error("Failed to read {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

impl ConvertError {
    pub fn not_found(path: &Path) -> Self {
        ConvertError::NotFound(path.to_path_buf())
    }

    pub fn unsupported(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_else(|| path.display().to_string());
        ConvertError::UnsupportedFormat(ext)
    }

    pub fn parse(path: &Path, message: impl Into<String>) -> Self {
        ConvertError::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn write(path: &Path, message: impl Into<String>) -> Self {
        ConvertError::Write {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_reports_extension() {
        let err = ConvertError::unsupported(Path::new("report.docx"));
        assert_eq!(err.to_string(), "Unsupported file format: .docx");
    }

    #[test]
    fn test_unsupported_without_extension() {
        let err = ConvertError::unsupported(Path::new("README"));
        assert!(matches!(err, ConvertError::UnsupportedFormat(ref s) if s == "README"));
    }

    #[test]
    fn test_io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ConvertError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
