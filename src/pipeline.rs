//! Background directory loading.
//!
//! A pipeline owns at most one current load. Starting another load cancels the
//! current worker, and workers publish only while their load is current, so a
//! superseded load never delivers anything after its successor started.

use crate::cancellation::CancellationToken;
use crate::config::ScanOptions;
use crate::error::ScanError;
use crate::index::SeriesIndex;
use crate::scanner::collect_records;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

/// Identifies one `start` call on a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadId(u64);

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "load#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Scanning,
    Indexing,
    Ready,
    Failed,
}

impl LoadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

#[derive(Debug, Clone)]
pub enum LoadEvent {
    /// Files processed so far by the current load.
    Progress { load: LoadId, count: usize },
    Ready {
        load: LoadId,
        path: PathBuf,
        series: Arc<SeriesIndex>,
    },
    Failed { load: LoadId, error: ScanError },
}

impl LoadEvent {
    pub fn load(&self) -> LoadId {
        match self {
            Self::Progress { load, .. } | Self::Ready { load, .. } | Self::Failed { load, .. } => {
                *load
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

#[derive(Debug, Default)]
struct Shared {
    current: Option<LoadId>,
    next_id: u64,
    state: LoadState,
    cancellation: Option<CancellationToken>,
    series: Option<Arc<SeriesIndex>>,
}

/// Runs scans on a background thread and reports through one event channel.
pub struct AsyncLoadPipeline {
    shared: Arc<Mutex<Shared>>,
    events: Sender<LoadEvent>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl AsyncLoadPipeline {
    /// Creates an idle pipeline and the receiver its events arrive on.
    pub fn new() -> (Self, Receiver<LoadEvent>) {
        let (events, receiver) = mpsc::channel();
        let pipeline = Self {
            shared: Arc::new(Mutex::new(Shared::default())),
            events,
            workers: Vec::new(),
        };
        (pipeline, receiver)
    }

    /// Starts loading `path`, superseding any load still in flight.
    pub fn start(&mut self, path: impl AsRef<Path>) -> LoadId {
        let path = path.as_ref().to_path_buf();
        let cancellation = CancellationToken::new();
        let load = {
            let mut shared = lock(&self.shared);
            if let Some(previous) = shared.cancellation.take() {
                if !shared.state.is_terminal() {
                    if let Some(current) = shared.current {
                        log::info!("Superseding {current} with a load of {}", path.display());
                    }
                }
                previous.cancel();
            }
            shared.next_id += 1;
            let load = LoadId(shared.next_id);
            shared.current = Some(load);
            shared.state = LoadState::Scanning;
            shared.cancellation = Some(cancellation.clone());
            load
        };

        self.workers.retain(|worker| !worker.is_finished());
        let worker = Worker {
            load,
            path,
            shared: Arc::clone(&self.shared),
            events: self.events.clone(),
            cancellation,
        };
        self.workers.push(thread::spawn(move || worker.run()));
        load
    }

    /// Cancels the current load, if any, and returns to `Idle`.
    pub fn cancel(&self) {
        let mut shared = lock(&self.shared);
        if let Some(token) = shared.cancellation.take() {
            token.cancel();
        }
        if !shared.state.is_terminal() {
            shared.state = LoadState::Idle;
        }
        shared.current = None;
    }

    pub fn state(&self) -> LoadState {
        lock(&self.shared).state
    }

    pub fn current_load(&self) -> Option<LoadId> {
        lock(&self.shared).current
    }

    /// Series of the most recent load that reached `Ready`.
    pub fn series(&self) -> Option<Arc<SeriesIndex>> {
        lock(&self.shared).series.clone()
    }
}

impl Drop for AsyncLoadPipeline {
    fn drop(&mut self) {
        self.cancel();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("Load worker panicked");
            }
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Worker {
    load: LoadId,
    path: PathBuf,
    shared: Arc<Mutex<Shared>>,
    events: Sender<LoadEvent>,
    cancellation: CancellationToken,
}

impl Worker {
    fn run(self) {
        log::info!("{} scanning {}", self.load, self.path.display());
        let options = ScanOptions::with_cancellation(self.cancellation.clone());
        let scanned = collect_records(&self.path, options, |count| {
            self.publish(None, LoadEvent::Progress {
                load: self.load,
                count,
            });
        });

        let records = match scanned {
            Ok(records) => records,
            Err(ScanError::Cancelled(_)) => {
                log::info!("{} cancelled", self.load);
                return;
            }
            Err(error) => {
                log::error!("{} failed: {error}", self.load);
                self.publish(
                    Some(LoadState::Failed),
                    LoadEvent::Failed {
                        load: self.load,
                        error,
                    },
                );
                return;
            }
        };

        if !self.transition(LoadState::Indexing) {
            return;
        }
        let series = Arc::new(SeriesIndex::build(records));
        log::info!(
            "{} ready: {} series, {} images",
            self.load,
            series.len(),
            series.image_count()
        );

        let mut shared = lock(&self.shared);
        if shared.current != Some(self.load) {
            return;
        }
        shared.state = LoadState::Ready;
        shared.series = Some(Arc::clone(&series));
        shared.cancellation = None;
        let _ = self.events.send(LoadEvent::Ready {
            load: self.load,
            path: self.path.clone(),
            series,
        });
    }

    fn is_current(&self, shared: &Shared) -> bool {
        shared.current == Some(self.load) && !self.cancellation.is_cancelled()
    }

    /// Moves to `state` if this load is still current.
    fn transition(&self, state: LoadState) -> bool {
        let mut shared = lock(&self.shared);
        if !self.is_current(&shared) {
            return false;
        }
        shared.state = state;
        true
    }

    /// Sends `event` while holding the lock, so a newer `start` cannot slip in
    /// between the currency check and the send.
    fn publish(&self, state: Option<LoadState>, event: LoadEvent) {
        let mut shared = lock(&self.shared);
        if !self.is_current(&shared) {
            return;
        }
        if let Some(state) = state {
            shared.state = state;
            shared.cancellation = None;
        }
        let _ = self.events.send(event);
    }
}
