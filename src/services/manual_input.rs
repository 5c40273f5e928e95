//! Operator input from sidecar files.
//!
//! For `kidney-04.tif` the operator writes `kidney-04.manual.yaml` next to it:
//!
//! ```yaml
//! canvas_clicks:
//!   - { x: 3, y: 5 }
//! tissue_polygon:
//!   - { x: 10, y: 10 }
//!   - { x: 90, y: 12 }
//!   - { x: 80, y: 95 }
//! ```
//!
//! The file is read again on every request. Before a retry the run blocks
//! until the sidecar changes on disk or the configured wait runs out, so a
//! rejected selection can be fixed in place.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use psr_core::{
    CanvasRequest, ImageId, InputError, ManualInput, Point, Polygon, Region, SelectionRequest,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct Sidecar {
    #[serde(default)]
    canvas_clicks: Vec<Point>,
    #[serde(default)]
    tissue_polygon: Vec<Point>,
}

/// Writes closer together than this are treated as one edit.
const SETTLE: Duration = Duration::from_millis(200);
/// Modification-time check interval while waiting.
const POLL: Duration = Duration::from_millis(250);

/// [`ManualInput`] backed by `<stem>.manual.yaml` files in a directory.
#[derive(Debug, Clone)]
pub struct SidecarInput {
    dir: PathBuf,
    wait: Duration,
    /// Modification time of each sidecar when it was last read.
    seen: HashMap<PathBuf, Option<SystemTime>>,
}

impl SidecarInput {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            wait: Duration::ZERO,
            seen: HashMap::new(),
        }
    }

    /// Longest time a retry blocks for the sidecar to change.
    #[inline]
    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn sidecar_path(&self, id: &ImageId) -> PathBuf {
        self.dir.join(format!("{id}.manual.yaml"))
    }

    fn load(&mut self, id: &ImageId) -> Result<Option<Sidecar>, InputError> {
        let path = self.sidecar_path(id);
        self.seen.insert(path.clone(), modified(&path));
        if !path.exists() {
            tracing::warn!(path = %path.display(), "No manual input file");
            return Ok(None);
        }
        read_sidecar(&path).map(Some)
    }

    /// Block until `path` differs from its last read, or the wait runs out.
    ///
    /// Filesystem events end the wait early; the modification time is polled
    /// as well in case the watcher cannot start or misses an event.
    fn wait_for_change(&self, path: &Path) {
        if self.wait.is_zero() {
            return;
        }
        let last = self.seen.get(path).copied().flatten();
        let (tx, rx) = mpsc::channel();
        let _watcher = match watch_sidecar(&self.dir, path, tx) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "Sidecar watcher unavailable, polling instead");
                None
            }
        };

        tracing::info!(
            path = %path.display(),
            wait_secs = self.wait.as_secs(),
            "Waiting for manual input file to change"
        );
        let deadline = Instant::now() + self.wait;
        loop {
            if modified(path) != last {
                break;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(path = %path.display(), "Manual input file unchanged");
                return;
            }
            match rx.recv_timeout(remaining.min(POLL)) {
                Ok(()) => break,
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => thread::sleep(remaining.min(POLL)),
            }
        }
        while rx.recv_timeout(SETTLE).is_ok() {}
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

fn watch_sidecar(
    dir: &Path,
    path: &Path,
    tx: mpsc::Sender<()>,
) -> Result<RecommendedWatcher, notify::Error> {
    let name = path.file_name().map(|name| name.to_os_string());
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                let edit = event.kind.is_create() || event.kind.is_modify();
                if edit
                    && event
                        .paths
                        .iter()
                        .any(|changed| changed.file_name() == name.as_deref())
                {
                    let _ = tx.send(());
                }
            }
        },
        Config::default(),
    )?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

fn read_sidecar(path: &Path) -> Result<Sidecar, InputError> {
    let content = fs::read_to_string(path)
        .map_err(|e| InputError::Failed(format!("{}: {e}", path.display())))?;
    serde_yaml::from_str(&content)
        .map_err(|e| InputError::Failed(format!("{}: {e}", path.display())))
}

impl ManualInput for SidecarInput {
    fn canvas_clicks(&mut self, request: &CanvasRequest<'_>) -> Result<Vec<Point>, InputError> {
        Ok(self
            .load(request.id)?
            .map(|sidecar| sidecar.canvas_clicks)
            .unwrap_or_default())
    }

    fn tissue_selection(
        &mut self,
        request: &SelectionRequest<'_>,
    ) -> Result<Option<Region>, InputError> {
        if request.attempt > 1 {
            self.wait_for_change(&self.sidecar_path(request.id));
        }
        let Some(sidecar) = self.load(request.id)? else {
            return Ok(None);
        };
        if sidecar.tissue_polygon.len() < 3 {
            tracing::warn!(
                image = %request.id,
                attempt = request.attempt,
                vertices = sidecar.tissue_polygon.len(),
                "Tissue polygon needs at least 3 vertices"
            );
            return Ok(None);
        }
        let polygon = Polygon::new(
            sidecar
                .tissue_polygon
                .iter()
                .map(|p| (f64::from(p.x), f64::from(p.y)))
                .collect(),
        );
        let (width, height) = request.smoothed.dimensions();
        Ok(Some(polygon.rasterize(width, height)))
    }
}
