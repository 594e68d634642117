//! File watching for incremental rebuilds.
//!
//! A [`FileWatcher`] turns raw notify events into [`ChangeEvent`]s naming the
//! binding they matched. The watch loop triggers that binding, whose
//! [`InFlightGate`] keeps at most one invocation of its tasks running.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use glob::{MatchOptions, Pattern};
use notify::Config as NotifyConfig;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::context::BuildContext;
use crate::error::{Error, Result};
use crate::path_utils::relative_to;
use crate::server::ReloadScope;
use crate::task::{invoke, TaskRef};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// What a binding does when one of its files changes.
pub enum WatchAction {
    /// Run the tasks in order.
    Run(Vec<TaskRef>),
    /// Refresh connected browsers without rebuilding anything.
    Reload,
}

/// Per-binding guard against overlapping invocations.
///
/// Events arriving during a run collapse into a single follow-up run.
#[derive(Debug, Default)]
pub struct InFlightGate {
    state: Mutex<GateState>,
}

#[derive(Debug, Default)]
struct GateState {
    running: bool,
    pending: bool,
}

impl InFlightGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the gate. Returns `false` and records a pending run when an
    /// invocation is already in flight.
    pub fn try_enter(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.running {
            state.pending = true;
            false
        } else {
            state.running = true;
            true
        }
    }

    /// Called by the holder after each run. Returns `true` when another run
    /// was requested meanwhile; the holder keeps the gate and runs again.
    pub fn finish(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.pending {
            state.pending = false;
            true
        } else {
            state.running = false;
            false
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).running
    }
}

/// Glob patterns under a base directory bound to an action.
pub struct WatchBinding {
    name: String,
    base: String,
    patterns: Vec<Pattern>,
    action: WatchAction,
    gate: InFlightGate,
}

impl WatchBinding {
    /// `base` is project-relative; patterns are relative to `base`.
    pub fn new(
        name: impl Into<String>,
        patterns: &[&str],
        base: impl Into<String>,
        action: WatchAction,
    ) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.trim_start_matches("./")).map_err(|e| Error::Glob {
                    pattern: p.to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.into(),
            base: base.into(),
            patterns,
            action,
            gate: InFlightGate::new(),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[inline]
    pub fn gate(&self) -> &InFlightGate {
        &self.gate
    }

    /// Whether a path relative to the base directory is covered.
    pub fn matches(&self, relative: &Path) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
    }

    /// Starts the bound action unless it is already in flight.
    ///
    /// Returns the handle of the spawned run, or `None` when the trigger was
    /// folded into the running invocation.
    pub fn trigger(self: &Arc<Self>, ctx: &Arc<BuildContext>) -> Option<JoinHandle<()>> {
        if !self.gate.try_enter() {
            debug!("'{}' is in flight, queued another run", self.name);
            return None;
        }

        let binding = Arc::clone(self);
        let ctx = Arc::clone(ctx);
        Some(tokio::spawn(async move {
            loop {
                binding.execute(&ctx).await;
                if !binding.gate.finish() {
                    break;
                }
            }
        }))
    }

    async fn execute(&self, ctx: &Arc<BuildContext>) {
        match &self.action {
            WatchAction::Run(tasks) => {
                for task in tasks {
                    if let Err(e) = invoke(task.as_ref(), ctx).await {
                        error!("Rebuild of '{}' failed: {}", task.name(), e);
                        break;
                    }
                }
            }
            WatchAction::Reload => ctx.reloader().reload(ReloadScope::Page),
        }
    }
}

/// A filesystem change that matched a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Index into the watcher's bindings.
    pub binding: usize,
    pub path: PathBuf,
}

struct WatchRoot {
    dir: PathBuf,
    canonical: Option<PathBuf>,
}

impl WatchRoot {
    fn relative(&self, path: &Path) -> Option<PathBuf> {
        relative_to(path, &self.dir).or_else(|| {
            self.canonical
                .as_deref()
                .and_then(|canonical| relative_to(path, canonical))
        })
    }
}

pub struct FileWatcher {
    watcher: RecommendedWatcher,
    receiver: mpsc::UnboundedReceiver<notify::Result<Event>>,
    bindings: Vec<Arc<WatchBinding>>,
    roots: Vec<WatchRoot>,
}

impl FileWatcher {
    /// Watches every binding's base directory under `root`.
    ///
    /// # Errors
    ///
    /// Fails when a base directory is missing or cannot be watched.
    pub fn new(root: &Path, bindings: Vec<Arc<WatchBinding>>) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            NotifyConfig::default(),
        )
        .map_err(|e| Error::Watch(format!("Failed to create watcher: {}", e)))?;

        let mut file_watcher = Self {
            watcher,
            receiver: rx,
            bindings: Vec::new(),
            roots: Vec::new(),
        };

        let mut watched = BTreeSet::new();
        for binding in &bindings {
            let dir = root.join(binding.base());
            if !dir.is_dir() {
                return Err(Error::Watch(format!(
                    "Cannot watch '{}': {} is not a directory",
                    binding.name(),
                    dir.display()
                )));
            }
            if watched.insert(dir.clone()) {
                file_watcher
                    .watcher
                    .watch(&dir, RecursiveMode::Recursive)
                    .map_err(|e| {
                        Error::Watch(format!("Failed to watch {}: {}", dir.display(), e))
                    })?;
            }
            file_watcher.roots.push(WatchRoot {
                canonical: dir.canonicalize().ok(),
                dir,
            });
        }
        file_watcher.bindings = bindings;

        Ok(file_watcher)
    }

    #[inline]
    pub fn bindings(&self) -> &[Arc<WatchBinding>] {
        &self.bindings
    }

    /// Maps a raw notify event onto the bindings it concerns.
    pub fn changes_for(&self, event: &Event) -> Vec<ChangeEvent> {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
        ) {
            return Vec::new();
        }

        let mut changes = Vec::new();
        for path in &event.paths {
            for (index, (binding, root)) in self.bindings.iter().zip(&self.roots).enumerate() {
                if let Some(relative) = root.relative(path) {
                    if binding.matches(&relative) {
                        changes.push(ChangeEvent {
                            binding: index,
                            path: path.clone(),
                        });
                    }
                }
            }
        }
        changes
    }

    /// Waits for the next event touching at least one binding.
    ///
    /// Returns `Ok(None)` once the event source is gone.
    pub async fn next_changes(&mut self) -> Result<Option<Vec<ChangeEvent>>> {
        loop {
            match self.receiver.recv().await {
                None => return Ok(None),
                Some(Err(e)) => return Err(Error::Watch(format!("Watcher error: {}", e))),
                Some(Ok(event)) => {
                    let changes = self.changes_for(&event);
                    if !changes.is_empty() {
                        return Ok(Some(changes));
                    }
                }
            }
        }
    }

    /// Consumes change events and triggers the matching bindings until the
    /// event source closes. Failed runs are logged and watching continues.
    pub async fn run(mut self, ctx: Arc<BuildContext>) {
        loop {
            match self.next_changes().await {
                Ok(Some(changes)) => {
                    let mut triggered = BTreeSet::new();
                    for change in changes {
                        debug!("Changed: {}", change.path.display());
                        if triggered.insert(change.binding) {
                            self.bindings[change.binding].trigger(&ctx);
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => warn!("{}", e),
            }
        }
    }

    /// Moves the watcher onto the runtime; it lives as long as the returned task.
    pub fn spawn(self, ctx: Arc<BuildContext>) -> JoinHandle<()> {
        tokio::spawn(self.run(ctx))
    }
}
