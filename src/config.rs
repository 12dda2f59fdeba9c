//! Campaign map configuration.
//!
//! Loaded from a TOML file; every missing key falls back to [`Default`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nested configuration for the map tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrusadeConfig {
    /// Terrain and warehouse policy.
    pub generator: GeneratorSettings,
    /// Planet sizing rules.
    pub campaign: CampaignSettings,
    /// Where the map lives.
    pub store: StoreSettings,
}

/// Probabilities driving per-cell assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Chance a ring cell copies the majority terrain of its generated neighbors.
    pub copy_neighbor_probability: f64,
    /// Chance a cell holds a warehouse.
    pub warehouse_probability: f64,
}

/// Planet sizing rules used by the campaign layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignSettings {
    /// Rings generated when a planet is first created.
    pub initial_rings: u32,
    /// Cells the map should offer per alliance-affiliated player.
    pub hexes_per_player: u32,
}

/// Storage location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// SQLite database file.
    pub database_path: PathBuf,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            copy_neighbor_probability: 0.5,
            warehouse_probability: 0.1,
        }
    }
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            initial_rings: 1,
            hexes_per_player: 3,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("crusade.db"),
        }
    }
}

/// Failures loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config from {path:?}: {source}")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML for [`CrusadeConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl CrusadeConfig {
    /// Parses TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let config = Self::from_file(path)?;
                tracing::info!(
                    target: "crusade_map::config",
                    source = "file",
                    path = %path.display(),
                    "config.loaded"
                );
                Ok(config)
            }
            None => {
                tracing::info!(
                    target: "crusade_map::config",
                    source = "builtin",
                    "config.loaded"
                );
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn log_of(f: impl FnOnce()) -> String {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = log.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn defaults() {
        let config = CrusadeConfig::default();
        assert_eq!(config.generator.copy_neighbor_probability, 0.5);
        assert_eq!(config.generator.warehouse_probability, 0.1);
        assert_eq!(config.campaign.hexes_per_player, 3);
        assert_eq!(config.store.database_path, PathBuf::from("crusade.db"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = CrusadeConfig::from_toml_str(
            r#"
            [generator]
            copy_neighbor_probability = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(config.generator.copy_neighbor_probability, 0.1);
        assert_eq!(config.generator.warehouse_probability, 0.1);
        assert_eq!(config.campaign, CampaignSettings::default());
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(
            CrusadeConfig::from_toml_str("").unwrap(),
            CrusadeConfig::default()
        );
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = CrusadeConfig::from_toml_str("[generator\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err =
            CrusadeConfig::from_file(Path::new("/nonexistent/crusade.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_without_path_is_default() {
        assert_eq!(CrusadeConfig::load(None).unwrap(), CrusadeConfig::default());
    }

    #[test]
    fn load_reports_its_source_as_a_field() {
        let log = log_of(|| {
            CrusadeConfig::load(None).unwrap();
        });
        assert!(log.contains("config.loaded"), "{log}");
        assert!(log.contains("source="), "{log}");
        assert!(log.contains("builtin"), "{log}");
        assert!(!log.contains("config.loaded="), "{log}");
    }
}
