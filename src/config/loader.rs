use std::path::Path;

use crate::error::{ConvertError, Result};

use super::types::ConversionConfig;

/// Load a configuration file (JSON or YAML, by extension).
///
/// A missing file, an unknown extension or a malformed document falls back
/// to defaults with a warning; unknown keys are ignored.
pub fn load_config_file(path: impl AsRef<Path>) -> ConversionConfig {
    let path = path.as_ref();

    if !path.exists() {
        tracing::warn!("Config file {} not found, using defaults", path.display());
        return ConversionConfig::default();
    }

    match try_load(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Error loading config: {}, using defaults", e);
            ConversionConfig::default()
        }
    }
}

fn try_load(path: &Path) -> Result<ConversionConfig> {
    let text = std::fs::read_to_string(path)?;

    match extension(path).as_str() {
        "json" => serde_json::from_str(&text)
            .map_err(|e| ConvertError::Config(format!("{}: {}", path.display(), e))),
        "yml" | "yaml" => serde_yaml::from_str(&text)
            .map_err(|e| ConvertError::Config(format!("{}: {}", path.display(), e))),
        _ => Err(ConvertError::unsupported(path)),
    }
}

/// Write the default configuration as JSON or YAML, by extension
pub fn create_sample_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let config = ConversionConfig::default();

    let text = match extension(path).as_str() {
        "json" => serde_json::to_string_pretty(&config)
            .map_err(|e| ConvertError::write(path, e.to_string()))?,
        "yml" | "yaml" => {
            serde_yaml::to_string(&config).map_err(|e| ConvertError::write(path, e.to_string()))?
        }
        _ => return Err(ConvertError::unsupported(path)),
    };

    std::fs::write(path, text)?;
    tracing::info!("Sample configuration created at {}", path.display());
    Ok(())
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JsonOrient;

    #[test]
    fn test_sample_config_round_trip_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        create_sample_config(&path).unwrap();
        assert_eq!(load_config_file(&path), ConversionConfig::default());
    }

    #[test]
    fn test_sample_config_round_trip_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        create_sample_config(&path).unwrap();
        assert_eq!(load_config_file(&path), ConversionConfig::default());
    }

    #[test]
    fn test_yaml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            "json_orient: values\ncombine_sheets: true\nsheet_selection: [Sales]\nunknown_key: 1\n",
        )
        .unwrap();

        let config = load_config_file(&path);
        assert_eq!(config.json_orient, JsonOrient::Values);
        assert!(config.combine_sheets);
        assert_eq!(config.sheet_selection, Some(vec!["Sales".to_string()]));
    }

    #[test]
    fn test_fallbacks_to_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert_eq!(load_config_file(&missing), ConversionConfig::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert_eq!(load_config_file(&broken), ConversionConfig::default());

        let toml = dir.path().join("config.toml");
        std::fs::write(&toml, "x = 1").unwrap();
        assert_eq!(load_config_file(&toml), ConversionConfig::default());
        assert!(create_sample_config(&toml).is_err());
    }
}
