//! Application configuration loaded from a TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::remote::sftp::SftpConfig;

/// Top-level application configuration.
///
/// All fields have defaults so devfm works without a config file.
/// Call [`Config::load`] to read from a TOML path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Local pane preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory the local pane opens in. `$HOME` when unset.
    #[serde(default)]
    pub local_root: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub show_hidden: bool,
}

impl GeneralConfig {
    /// The configured local root, else `$HOME`, else `/`.
    pub fn resolved_local_root(&self) -> PathBuf {
        self.local_root.clone().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/"))
        })
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            local_root: None,
            show_hidden: true,
        }
    }
}

/// Which transport serves the device pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceBackend {
    /// A local directory standing in for the device.
    #[default]
    Folder,
    Sftp,
}

/// Device pane and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub backend: DeviceBackend,
    /// Root served by the folder backend.
    #[serde(default = "default_folder_root")]
    pub folder_root: PathBuf,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Keep refused deletes/renames so the UI can show them.
    #[serde(default)]
    pub report_mutation_failures: bool,
}

impl DeviceConfig {
    pub fn sftp_config(&self) -> SftpConfig {
        SftpConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            backend: DeviceBackend::default(),
            folder_root: default_folder_root(),
            host: String::new(),
            port: default_port(),
            username: String::new(),
            password: String::new(),
            report_mutation_failures: false,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    22
}

fn default_folder_root() -> PathBuf {
    PathBuf::from("device")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("/tmp/devfm.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_general() {
        let config = Config::default();
        assert!(config.general.local_root.is_none());
        assert!(config.general.show_hidden);
    }

    #[test]
    fn default_config_device() {
        let config = Config::default();
        assert_eq!(config.device.backend, DeviceBackend::Folder);
        assert_eq!(config.device.folder_root, PathBuf::from("device"));
        assert_eq!(config.device.port, 22);
        assert!(!config.device.report_mutation_failures);
    }

    #[test]
    fn default_config_log() {
        let config = Config::default();
        assert_eq!(config.log.file, PathBuf::from("/tmp/devfm.log"));
    }

    #[test]
    fn load_full_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[general]
local_root = "/work/firmware"
show_hidden = false

[device]
backend = "sftp"
host = "pico.local"
port = 2222
username = "pi"
password = "raspberry"
report_mutation_failures = true

[log]
file = "/var/log/devfm.log"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(
            config.general.local_root,
            Some(PathBuf::from("/work/firmware"))
        );
        assert!(!config.general.show_hidden);
        assert_eq!(config.device.backend, DeviceBackend::Sftp);
        assert!(config.device.report_mutation_failures);
        assert_eq!(config.log.file, PathBuf::from("/var/log/devfm.log"));

        let sftp = config.device.sftp_config();
        assert_eq!(sftp.display_label(), "pi@pico.local:2222");
    }

    #[test]
    fn load_partial_toml_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[device]
folder_root = "/tmp/fake-board"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.device.folder_root, PathBuf::from("/tmp/fake-board"));
        assert_eq!(config.device.backend, DeviceBackend::Folder);
        assert_eq!(config.device.port, 22);
        assert!(config.general.show_hidden);
    }

    #[test]
    fn load_empty_toml_uses_all_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.device.backend, DeviceBackend::Folder);
        assert!(config.general.local_root.is_none());
    }

    #[test]
    fn load_nonexistent_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = Config::load(&tmp.path().join("missing.toml"));
        assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
    }

    #[test]
    fn load_unknown_backend_returns_config_parse() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[device]\nbackend = \"usb\"\n").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result.unwrap_err(), CoreError::ConfigParse(_)));
    }

    #[test]
    fn explicit_local_root_wins() {
        let general = GeneralConfig {
            local_root: Some(PathBuf::from("/srv/code")),
            show_hidden: true,
        };
        assert_eq!(general.resolved_local_root(), PathBuf::from("/srv/code"));
    }
}
