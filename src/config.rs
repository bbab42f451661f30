//! Configuration file handling.
//!
//! Everything the program needs lives in one TOML file (`devices.toml` by
//! default): Gemini credentials, the persona and home-context text that go
//! into the system prompt, and the camera list.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::devices::Device;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "devices.toml";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GeminiConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Free-text persona prepended to the system prompt.
    #[serde(default)]
    pub system_prompt: String,
    /// Free-text context about the home and its inhabitants.
    #[serde(default)]
    pub home_info: String,
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// Errors that can occur when loading configuration.
///
/// Each variant carries a distinct user-facing message; all of them are
/// fatal (the binary prints the message and exits with status 1).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error: {} not found. Please ensure the file exists and is readable.", .path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error reading {}: {}. Please ensure it is in valid TOML format.", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Please provide the Gemini API key and the model name in {}.", .path.display())]
    MissingCredentials { path: PathBuf },

    #[error("No devices found in {}. Please ensure the file contains a list of devices.", .path.display())]
    NoDevices { path: PathBuf },
}

impl Config {
    /// Load and validate the configuration from a file path.
    ///
    /// Validation happens here so that callers never see a config with
    /// missing credentials or an empty device list.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.devices.is_empty() {
            return Err(ConfigError::NoDevices {
                path: path.to_path_buf(),
            });
        }
        if config.gemini.key.is_empty() || config.gemini.model.is_empty() {
            return Err(ConfigError::MissingCredentials {
                path: path.to_path_buf(),
            });
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
system_prompt = "You are a helpful home assistant."
home_info = "Two adults, one cat."

[gemini]
key = "test-key"
model = "gemini-2.5-flash"

[[devices]]
id = "living_room"
name = "Living room cam"
location = "living room"
info = "wide angle"
address = "rtsp://cam1/stream"
"#;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("devices.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn load_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, VALID);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.gemini.key, "test-key");
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.devices.len(), 1);
        assert_eq!(config.devices[0].id, "living_room");
        assert_eq!(config.devices[0].address, "rtsp://cam1/stream");
        assert_eq!(config.system_prompt, "You are a helpful home assistant.");
        assert_eq!(config.home_info, "Two adults, one cat.");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "devices = [ not toml ???");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_device_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
devices = []

[gemini]
key = "k"
model = "m"
"#,
        );
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NoDevices { .. }));
    }

    #[test]
    fn missing_devices_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[gemini]
key = "k"
model = "m"
"#,
        );
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NoDevices { .. }));
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[gemini]
model = "m"

[[devices]]
id = "a"
name = "A"
location = "x"
info = ""
address = "rtsp://a"
"#,
        );
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials { .. }));
    }

    #[test]
    fn missing_model_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[gemini]
key = "k"

[[devices]]
id = "a"
name = "A"
location = "x"
info = ""
address = "rtsp://a"
"#,
        );
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials { .. }));
    }

    #[test]
    fn error_messages_are_distinct() {
        let path = PathBuf::from("devices.toml");
        let not_found = ConfigError::NotFound { path: path.clone() }.to_string();
        let no_devices = ConfigError::NoDevices { path: path.clone() }.to_string();
        let missing_creds = ConfigError::MissingCredentials { path }.to_string();
        assert_ne!(not_found, no_devices);
        assert_ne!(not_found, missing_creds);
        assert_ne!(no_devices, missing_creds);
    }
}
