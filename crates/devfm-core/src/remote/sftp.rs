//! SFTP device transport using `russh` and `russh-sftp`.
//!
//! For devices that run an SSH server. [`RemoteSession`] wraps one SFTP
//! session; [`spawn_sftp_device`] serves [`DeviceRequest`]s with it.
//! Device paths are resolved below a base directory on the server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client;
use russh::keys::key::PublicKey;
use russh_sftp::client::SftpSession;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::protocol::{DeviceEvent, DeviceRequest};
use crate::fs::entry::Entry;

/// Configuration for an SFTP connection.
#[derive(Debug, Clone)]
pub struct SftpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl SftpConfig {
    /// Returns a display label like `"user@host"` or `"user@host:port"`.
    pub fn display_label(&self) -> String {
        if self.port == 22 {
            format!("{}@{}", self.username, self.host)
        } else {
            format!("{}@{}:{}", self.username, self.host, self.port)
        }
    }
}

/// Errors that can occur during SFTP operations.
#[derive(Debug, thiserror::Error)]
pub enum SftpError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("SFTP error: {0}")]
    Sftp(String),
}

/// SSH client handler.
struct SshHandler;

#[async_trait]
impl client::Handler for SshHandler {
    type Error = russh::Error;

    /// Accepts all host keys: bench devices regenerate theirs on every reflash.
    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// An active SSH/SFTP session to a device.
pub struct RemoteSession {
    config: SftpConfig,
    sftp: SftpSession,
    base: String,
    _handle: client::Handle<SshHandler>,
}

impl RemoteSession {
    /// Connects via SSH, opens an SFTP session and resolves the login
    /// directory as the device root.
    pub async fn connect(config: SftpConfig) -> Result<Self, SftpError> {
        let ssh_config = client::Config {
            inactivity_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let mut handle = client::connect(
            Arc::new(ssh_config),
            (config.host.as_str(), config.port),
            SshHandler,
        )
        .await
        .map_err(|e| SftpError::ConnectionFailed(e.to_string()))?;

        let auth_ok = handle
            .authenticate_password(&config.username, &config.password)
            .await
            .map_err(|e| SftpError::AuthFailed(e.to_string()))?;

        if !auth_ok {
            return Err(SftpError::AuthFailed(
                "invalid username or password".to_string(),
            ));
        }

        let channel = handle
            .channel_open_session()
            .await
            .map_err(|e| SftpError::ConnectionFailed(e.to_string()))?;

        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(|e| SftpError::Sftp(e.to_string()))?;

        let sftp = SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| SftpError::Sftp(e.to_string()))?;

        let base = sftp
            .canonicalize(".")
            .await
            .map_err(|e| SftpError::Sftp(e.to_string()))?;
        tracing::info!("sftp device {} rooted at {base}", config.display_label());

        Ok(Self {
            config,
            sftp,
            base,
            _handle: handle,
        })
    }

    /// Lists a device directory. `.` and `..` are filtered out.
    pub async fn list_directory(&self, device_path: &str) -> Result<Vec<Entry>, SftpError> {
        let dir_entries = self
            .sftp
            .read_dir(self.resolve(device_path))
            .await
            .map_err(|e| SftpError::Sftp(e.to_string()))?;

        let entries = dir_entries
            .filter(|de| {
                let name = de.file_name();
                name != "." && name != ".."
            })
            .map(|de| {
                let attrs = de.metadata();
                Entry::new(de.file_name(), attrs.is_dir(), attrs.len())
            })
            .collect();

        Ok(entries)
    }

    /// Deletes a file, or a directory with everything below it.
    pub async fn delete(&self, device_path: &str) -> Result<(), SftpError> {
        let path = self.resolve(device_path);
        if path == self.base {
            return Err(SftpError::Sftp(
                "refusing to delete the device root".to_string(),
            ));
        }
        let attrs = self
            .sftp
            .symlink_metadata(path.clone())
            .await
            .map_err(|e| SftpError::Sftp(e.to_string()))?;
        if attrs.is_dir() {
            self.remove_tree(path).await
        } else {
            self.sftp
                .remove_file(path)
                .await
                .map_err(|e| SftpError::Sftp(e.to_string()))
        }
    }

    /// Removes files while walking down, then directories deepest first.
    async fn remove_tree(&self, top: String) -> Result<(), SftpError> {
        let mut pending = vec![top];
        let mut dirs = Vec::new();
        while let Some(dir) = pending.pop() {
            let children = self
                .sftp
                .read_dir(dir.clone())
                .await
                .map_err(|e| SftpError::Sftp(e.to_string()))?;
            for child in children {
                let name = child.file_name();
                if name == "." || name == ".." {
                    continue;
                }
                let child_path = join_remote(&dir, &name);
                if child.metadata().is_dir() {
                    pending.push(child_path);
                } else {
                    self.sftp
                        .remove_file(child_path)
                        .await
                        .map_err(|e| SftpError::Sftp(e.to_string()))?;
                }
            }
            dirs.push(dir);
        }
        for dir in dirs.into_iter().rev() {
            self.sftp
                .remove_dir(dir)
                .await
                .map_err(|e| SftpError::Sftp(e.to_string()))?;
        }
        Ok(())
    }

    pub async fn rename(&self, from: &str, to: &str) -> Result<(), SftpError> {
        self.sftp
            .rename(self.resolve(from), self.resolve(to))
            .await
            .map_err(|e| SftpError::Sftp(e.to_string()))
    }

    /// Returns the connection configuration.
    pub fn config(&self) -> &SftpConfig {
        &self.config
    }

    fn resolve(&self, device_path: &str) -> String {
        join_remote(&self.base, device_path)
    }
}

/// Joins a device path (`""`, `"a/b"` or `"/x"`) below `base`.
fn join_remote(base: &str, device_path: &str) -> String {
    let relative = device_path.trim_matches('/');
    if relative.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), relative)
    }
}

/// Spawns a task answering `requests` over `session`.
///
/// The task ends when the request channel closes.
pub fn spawn_sftp_device(
    session: Arc<RemoteSession>,
    mut requests: UnboundedReceiver<DeviceRequest>,
    events: UnboundedSender<DeviceEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            let event = match &request {
                DeviceRequest::List { token, path } => match session.list_directory(path).await {
                    Ok(entries) => DeviceEvent::Listed {
                        token: *token,
                        entries,
                    },
                    Err(e) => request.failed(e.to_string()),
                },
                DeviceRequest::Delete { path } => match session.delete(path).await {
                    Ok(()) => DeviceEvent::Deleted { path: path.clone() },
                    Err(e) => request.failed(e.to_string()),
                },
                DeviceRequest::Move { from, to } => match session.rename(from, to).await {
                    Ok(()) => DeviceEvent::Moved {
                        from: from.clone(),
                        to: to.clone(),
                    },
                    Err(e) => request.failed(e.to_string()),
                },
            };
            if events.send(event).is_err() {
                tracing::debug!("sftp device: event receiver closed");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_default_port() {
        let config = SftpConfig {
            host: "pico.local".to_string(),
            port: 22,
            username: "pi".to_string(),
            password: "secret".to_string(),
        };
        assert_eq!(config.display_label(), "pi@pico.local");
    }

    #[test]
    fn display_label_custom_port() {
        let config = SftpConfig {
            host: "pico.local".to_string(),
            port: 2222,
            username: "pi".to_string(),
            password: "secret".to_string(),
        };
        assert_eq!(config.display_label(), "pi@pico.local:2222");
    }

    #[test]
    fn join_remote_handles_root_and_children() {
        assert_eq!(join_remote("/home/pi", ""), "/home/pi");
        assert_eq!(join_remote("/home/pi", "/b.txt"), "/home/pi/b.txt");
        assert_eq!(join_remote("/home/pi/", "alpha/x.txt"), "/home/pi/alpha/x.txt");
        assert_eq!(join_remote("/", "lib"), "/lib");
    }

    #[test]
    fn sftp_error_display() {
        let err = SftpError::ConnectionFailed("timeout".to_string());
        assert_eq!(err.to_string(), "connection failed: timeout");

        let err = SftpError::AuthFailed("bad password".to_string());
        assert_eq!(err.to_string(), "authentication failed: bad password");
    }
}
