//! Device transport that serves a local directory.
//!
//! Stands in for real hardware during development: the folder given to
//! [`spawn_folder_device`] plays the role of the device filesystem root.

use std::path::{Component, Path, PathBuf};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::protocol::{DeviceEvent, DeviceRequest};
use crate::fs::entry::Entry;

/// Spawns a task answering `requests` from the contents of `root`.
///
/// The task ends when the request channel closes.
pub fn spawn_folder_device(
    root: PathBuf,
    mut requests: UnboundedReceiver<DeviceRequest>,
    events: UnboundedSender<DeviceEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            let event = serve(&root, request).await;
            if events.send(event).is_err() {
                tracing::debug!("folder device: event receiver closed");
                break;
            }
        }
    })
}

async fn serve(root: &Path, request: DeviceRequest) -> DeviceEvent {
    match &request {
        DeviceRequest::List { token, path } => match list(root, path).await {
            Ok(entries) => DeviceEvent::Listed {
                token: *token,
                entries,
            },
            Err(e) => request.failed(e.to_string()),
        },
        DeviceRequest::Delete { path } => match delete(root, path).await {
            Ok(()) => DeviceEvent::Deleted { path: path.clone() },
            Err(e) => request.failed(e.to_string()),
        },
        DeviceRequest::Move { from, to } => match rename(root, from, to).await {
            Ok(()) => DeviceEvent::Moved {
                from: from.clone(),
                to: to.clone(),
            },
            Err(e) => request.failed(e.to_string()),
        },
    }
}

/// Maps a device path onto `root`, refusing anything that escapes it.
fn resolve(root: &Path, device_path: &str) -> std::io::Result<PathBuf> {
    let relative = Path::new(device_path.trim_start_matches('/'));
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("path outside device root: {device_path}"),
        ));
    }
    Ok(root.join(relative))
}

async fn list(root: &Path, device_path: &str) -> std::io::Result<Vec<Entry>> {
    let dir = resolve(root, device_path)?;
    let mut read_dir = tokio::fs::read_dir(&dir).await?;
    let mut entries = Vec::new();
    while let Some(dir_entry) = read_dir.next_entry().await? {
        let metadata = match dir_entry.metadata().await {
            Ok(m) => m,
            Err(_) => continue,
        };
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        entries.push(Entry::new(name, metadata.is_dir(), metadata.len()));
    }
    Ok(entries)
}

async fn delete(root: &Path, device_path: &str) -> std::io::Result<()> {
    let path = resolve(root, device_path)?;
    if path == root {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "refusing to delete the device root",
        ));
    }
    let metadata = tokio::fs::symlink_metadata(&path).await?;
    if metadata.is_dir() {
        tokio::fs::remove_dir_all(&path).await
    } else {
        tokio::fs::remove_file(&path).await
    }
}

async fn rename(root: &Path, from: &str, to: &str) -> std::io::Result<()> {
    let from = resolve(root, from)?;
    let to = resolve(root, to)?;
    tokio::fs::rename(from, to).await
}
