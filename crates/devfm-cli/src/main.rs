//! devfm: a line-driven dual-pane browser for a local tree and a device.
//!
//! Reads one command per line from stdin and prints both panes whenever
//! either listing changes. Device completions arrive on a channel and are
//! fed to the device model on this same thread.

mod input;
mod render;

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use devfm_core::{
    spawn_folder_device, spawn_sftp_device, ChannelMessenger, Config, CoreResult, DeviceBackend,
    DeviceEvent, DeviceRequest, DualPane, HierarchicalDataSource, LocalDirectoryModel,
    MutationFailure, PaneView, RemoteDirectoryModel, RemoteSession, Side, StdEnumerator,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::input::{parse_line, InputAction};
use crate::render::{device_title, render_pane, HELP};

type Browser = DualPane<LocalDirectoryModel<StdEnumerator>, RemoteDirectoryModel<ChannelMessenger>>;

/// `$1` if given, else `~/.config/devfm/config.toml` when it exists.
fn config_path() -> Option<PathBuf> {
    if let Some(arg) = std::env::args().nth(1) {
        return Some(PathBuf::from(arg));
    }
    let home = std::env::var("HOME").ok()?;
    let path = PathBuf::from(home).join(".config/devfm/config.toml");
    path.exists().then_some(path)
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log.file)
        .with_context(|| format!("failed to open log file {}", config.log.file.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Ok(())
}

/// Starts the configured device transport and returns its task handle.
async fn start_device(
    config: &Config,
    requests: mpsc::UnboundedReceiver<DeviceRequest>,
    events: mpsc::UnboundedSender<DeviceEvent>,
) -> anyhow::Result<JoinHandle<()>> {
    match config.device.backend {
        DeviceBackend::Folder => {
            let root = &config.device.folder_root;
            anyhow::ensure!(
                root.is_dir(),
                "device folder {} is not a directory",
                root.display()
            );
            tracing::info!("serving device from folder {}", root.display());
            Ok(spawn_folder_device(root.clone(), requests, events))
        }
        DeviceBackend::Sftp => {
            let sftp = config.device.sftp_config();
            let label = sftp.display_label();
            println!("connecting to {label}...");
            let session = RemoteSession::connect(sftp)
                .await
                .with_context(|| format!("failed to connect to {label}"))?;
            tracing::info!("connected to {}", session.config().display_label());
            Ok(spawn_sftp_device(Arc::new(session), requests, events))
        }
    }
}

fn print_panes(browser: &Browser) -> CoreResult<()> {
    let focus = browser.focus();
    let local_title = format!("local:{}", browser.local().source().current_dir().display());
    let device_title = device_title(browser.device().source().path());
    print!(
        "{}{}",
        render_pane(&local_title, browser.local(), focus == Side::Local)?,
        render_pane(&device_title, browser.device(), focus == Side::Device)?
    );
    Ok(())
}

fn describe_failure(failure: &MutationFailure) -> String {
    match failure {
        MutationFailure::Delete { path, reason } => {
            format!("device refused to delete {path}: {reason}")
        }
        MutationFailure::Move { from, to, reason } => {
            format!("device refused to move {from} to {to}: {reason}")
        }
    }
}

/// Applies one action. Returns `false` when the user asked to quit.
fn apply(browser: &mut Browser, action: InputAction) -> CoreResult<bool> {
    match action {
        InputAction::Quit => return Ok(false),
        InputAction::ToggleFocus => browser.toggle_focus(),
        InputAction::CursorUp => browser.focused_mut().move_up(),
        InputAction::CursorDown => browser.focused_mut().move_down(),
        InputAction::CursorTop => browser.focused_mut().go_to_first(),
        InputAction::CursorBottom => browser.focused_mut().go_to_last(),
        InputAction::Select(row) => browser.focused_mut().select(row),
        InputAction::Open => browser.focused_mut().activate()?,
        InputAction::Rename(name) => browser.focused_mut().rename_selected(&name)?,
        InputAction::Delete => browser.focused_mut().delete_selected()?,
        InputAction::Refresh => match browser.focus() {
            Side::Local => browser.local_mut().source_mut().refresh()?,
            Side::Device => browser.device_mut().source_mut().invalidate(),
        },
        InputAction::Show => {}
        InputAction::Help => println!("{HELP}"),
    }
    Ok(true)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = match config_path() {
        Some(path) => Config::load(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    init_logging(&config)?;

    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let device_task = start_device(&config, request_rx, event_tx).await?;

    let local_root = config.general.resolved_local_root();
    let local = LocalDirectoryModel::new(StdEnumerator, &local_root)
        .and_then(|model| model.with_hidden(config.general.show_hidden))
        .with_context(|| format!("failed to open {}", local_root.display()))?;
    let device = RemoteDirectoryModel::new(ChannelMessenger::new(request_tx))
        .with_failure_reporting(config.device.report_mutation_failures);
    let mut browser: Browser = DualPane::new(local, device);

    let dirty = Rc::new(Cell::new(true));
    for signal in [
        browser.local().view().data_changed(),
        browser.device().view().data_changed(),
    ] {
        let dirty = Rc::clone(&dirty);
        signal.subscribe(move |_| dirty.set(true));
    }

    println!("devfm: type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if dirty.replace(false) {
            print_panes(&browser)?;
        }

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(action) = parse_line(&line) else {
                    if !line.trim().is_empty() {
                        println!("unknown command: {}", line.trim());
                    }
                    continue;
                };
                let redraw = action != InputAction::Help;
                match apply(&mut browser, action) {
                    Ok(true) => dirty.set(dirty.get() || redraw),
                    Ok(false) => break,
                    Err(e) => {
                        tracing::warn!("command failed: {e}");
                        println!("error: {e}");
                    }
                }
            }
            Some(event) = event_rx.recv() => {
                browser.device_mut().source_mut().handle_event(event);
                if let Some(failure) = browser.device_mut().source_mut().take_failure() {
                    println!("{}", describe_failure(&failure));
                }
            }
        }
    }

    drop(browser);
    if let Err(e) = device_task.await {
        tracing::error!("device task ended abnormally: {e}");
    }
    Ok(())
}
