//! Hot-reload of the rail tuning file.
//!
//! - `notify` watcher on the file's parent directory (editors replace files)
//! - Events drained without blocking from the frame loop
//! - New tuning is validated before it is handed out
//! - Status snapshot for the FFI bridge

use bevy::prelude::*;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Mutex;

use crate::config::RailConfig;
use crate::error::{RailError, RailResult};

/// Watches one rail config file
#[derive(Resource)]
pub struct ConfigWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    receiver: Mutex<Receiver<notify::Result<Event>>>,
}

impl ConfigWatcher {
    pub fn watch(path: impl AsRef<Path>) -> RailResult<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::metadata(&path).map_err(|source| RailError::Io {
            path: path.clone(),
            source,
        })?;

        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        tracing::info!(target: "rail_core::hotreload", path = %path.display(), "Hot-reload enabled");
        Ok(Self {
            path,
            _watcher: watcher,
            receiver: Mutex::new(rx),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain pending file events; reloads once if the watched file changed
    pub fn poll(&self) -> Option<RailResult<RailConfig>> {
        let Ok(receiver) = self.receiver.lock() else {
            tracing::error!(target: "rail_core::hotreload", "Watcher channel poisoned");
            return None;
        };

        let mut changed = false;
        while let Ok(result) = receiver.try_recv() {
            match result {
                Ok(event) => changed |= is_config_modify_event(&event, &self.path),
                Err(e) => tracing::warn!(target: "rail_core::hotreload", "File watcher error: {e}"),
            }
        }
        changed.then(|| RailConfig::load(&self.path))
    }
}

/// Check if event is a modification of the watched file
fn is_config_modify_event(event: &Event, watched: &Path) -> bool {
    let Some(name) = watched.file_name() else {
        return false;
    };
    (event.kind.is_modify() || event.kind.is_create())
        && event.paths.iter().any(|p| p.file_name() == Some(name))
}

/// Hot-reload state tracking
#[derive(Resource, Debug, Default)]
pub struct HotReloadState {
    pub reload_count: u32,
    pub last_reload_success: bool,
    pub last_error: Option<String>,
}

impl HotReloadState {
    pub fn record(&mut self, result: &RailResult<()>) {
        match result {
            Ok(()) => {
                self.reload_count += 1;
                self.last_reload_success = true;
                self.last_error = None;
            }
            Err(e) => {
                self.last_reload_success = false;
                self.last_error = Some(e.to_string());
            }
        }
    }
}

/// Configuration reload event
#[derive(Event, Debug, Clone)]
pub struct ConfigReloadEvent {
    pub path: PathBuf,
    pub success: bool,
    pub error: Option<String>,
}

/// Hot-reload status for FFI
#[derive(Debug, Serialize, Deserialize)]
pub struct HotReloadStatus {
    pub enabled: bool,
    pub watched_file: Option<String>,
    pub reload_count: u32,
    pub last_reload_success: bool,
    pub last_error: Option<String>,
}

impl HotReloadStatus {
    pub fn from_state(watcher: Option<&ConfigWatcher>, state: &HotReloadState) -> Self {
        Self {
            enabled: watcher.is_some(),
            watched_file: watcher.map(|w| w.path().display().to_string()),
            reload_count: state.reload_count,
            last_reload_success: state.last_reload_success,
            last_error: state.last_error.clone(),
        }
    }
}
