//! Resolution engine
//!
//! A single tokio task owns all resolution state. Host calls and fetch
//! completions reach it as messages, so every mutation of the caches,
//! trackers and registries happens in one place, one message at a time.
//!
//! # Lifecycle
//! - [`ResolutionEngine::spawn`] takes ownership of a [`ResultCache`] and
//!   returns an [`EngineHandle`] plus the task's join handle.
//! - Fetches run as separate tasks; each one posts exactly one completion,
//!   whether it succeeds, fails, times out, or is torn down.
//! - Once every handle is dropped and no fetch is in flight, the task exits
//!   and its join handle yields the cache back.
//!
//! # Album loads
//! [`EngineHandle::on_album_metadata`] opens an album's load and
//! [`EngineHandle::end_album_load`] closes it once every track has been
//! sent. The album is written back and finalized exactly once, after the
//! close and after every lookup issued during the load has completed.
//! [`EngineHandle::load_release`] does all three steps in one message.
//!
//! # Example
//! ```rust,ignore
//! let (engine, task) = ResolutionEngine::spawn(fetcher, ResultCache::new(), options);
//! engine.on_album_metadata(album.clone(), album_metadata)?;
//! engine.on_track_metadata(album.clone(), track_metadata, track)?;
//! engine.end_album_load(album)?;
//! // ... album.finalize_loading() is called once all lookups complete
//! drop(engine);
//! let cache = task.await?;
//! ```

mod state;

pub use state::EngineStats;

use crate::cache::ResultCache;
use crate::error::{ResolveError, Result};
use crate::fetcher::{FetchError, FetchRequest, Fetcher};
use crate::host::{Album, MetadataTarget};
use crate::model::EntityKind;
use crate::options::EnrichmentOptions;
use serde_json::Value;
use state::{Effects, ResolverState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, Instrument};

/// Track payload paired with the destination that receives its details
pub struct TrackInput {
    pub track: Value,
    pub target: Arc<dyn MetadataTarget>,
}

enum Command {
    AlbumMetadata {
        album: Arc<dyn Album>,
        target: Arc<dyn MetadataTarget>,
    },
    TrackMetadata {
        album: Arc<dyn Album>,
        target: Arc<dyn MetadataTarget>,
        track: Value,
    },
    LoadRelease {
        album: Arc<dyn Album>,
        target: Arc<dyn MetadataTarget>,
        tracks: Vec<TrackInput>,
    },
    EndAlbumLoad {
        album: Arc<dyn Album>,
    },
    AlbumRemoved {
        album_id: String,
    },
    UpdateOptions(EnrichmentOptions),
    Stats(oneshot::Sender<EngineStats>),
}

struct Completion {
    request: FetchRequest,
    result: std::result::Result<Value, FetchError>,
}

/// Posts the fetch outcome when dropped
///
/// A task that finishes normally records its result first; a task that is
/// aborted or panics still reports, as [`FetchError::Cancelled`].
struct CompletionGuard {
    tx: mpsc::UnboundedSender<Completion>,
    request: Option<FetchRequest>,
    result: Option<std::result::Result<Value, FetchError>>,
}

impl CompletionGuard {
    fn new(tx: mpsc::UnboundedSender<Completion>, request: FetchRequest) -> Self {
        Self {
            tx,
            request: Some(request),
            result: None,
        }
    }

    fn complete(mut self, result: std::result::Result<Value, FetchError>) {
        self.result = Some(result);
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            let result = self.result.take().unwrap_or(Err(FetchError::Cancelled));
            // Receiver only disappears when the runtime is shutting down
            let _ = self.tx.send(Completion { request, result });
        }
    }
}

/// Host-facing handle to a running engine
///
/// Cheap to clone; all methods only enqueue a message and return.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl EngineHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| ResolveError::EngineStopped)
    }

    /// Seed album-level artist resolution
    pub fn on_album_metadata(
        &self,
        album: Arc<dyn Album>,
        target: Arc<dyn MetadataTarget>,
    ) -> Result<()> {
        self.send(Command::AlbumMetadata { album, target })
    }

    /// Resolve the artists credited on one track
    pub fn on_track_metadata(
        &self,
        album: Arc<dyn Album>,
        target: Arc<dyn MetadataTarget>,
        track: Value,
    ) -> Result<()> {
        self.send(Command::TrackMetadata {
            album,
            target,
            track,
        })
    }

    /// No more track metadata will follow for this album
    pub fn end_album_load(&self, album: Arc<dyn Album>) -> Result<()> {
        self.send(Command::EndAlbumLoad { album })
    }

    /// Process an album and all its tracks, then close its load
    pub fn load_release(
        &self,
        album: Arc<dyn Album>,
        target: Arc<dyn MetadataTarget>,
        tracks: Vec<TrackInput>,
    ) -> Result<()> {
        self.send(Command::LoadRelease {
            album,
            target,
            tracks,
        })
    }

    /// Drop all bookkeeping for an album leaving processing
    pub fn on_album_removed(&self, album_id: &str) -> Result<()> {
        self.send(Command::AlbumRemoved {
            album_id: album_id.to_string(),
        })
    }

    pub fn update_options(&self, options: EnrichmentOptions) -> Result<()> {
        self.send(Command::UpdateOptions(options))
    }

    pub async fn stats(&self) -> Result<EngineStats> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Stats(reply_tx))?;
        reply_rx.await.map_err(|_| ResolveError::EngineStopped)
    }
}

pub struct ResolutionEngine {
    state: ResolverState,
    fetcher: Arc<dyn Fetcher>,
    commands: mpsc::UnboundedReceiver<Command>,
    completions: mpsc::UnboundedReceiver<Completion>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    in_flight: usize,
}

impl ResolutionEngine {
    /// Start the engine task on the current tokio runtime
    pub fn spawn(
        fetcher: Arc<dyn Fetcher>,
        cache: ResultCache,
        options: EnrichmentOptions,
    ) -> (EngineHandle, JoinHandle<ResultCache>) {
        let (tx, commands) = mpsc::unbounded_channel();
        let (completion_tx, completions) = mpsc::unbounded_channel();

        let engine = Self {
            state: ResolverState::new(cache, options),
            fetcher,
            commands,
            completions,
            completion_tx,
            in_flight: 0,
        };

        let task = tokio::spawn(engine.run());
        (EngineHandle { tx }, task)
    }

    async fn run(mut self) -> ResultCache {
        info!("Resolution engine started");
        let mut host_open = true;

        while host_open || self.in_flight > 0 {
            tokio::select! {
                command = self.commands.recv(), if host_open => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        debug!(in_flight = self.in_flight, "All engine handles dropped");
                        host_open = false;
                    }
                },
                Some(completion) = self.completions.recv() => {
                    self.in_flight -= 1;
                    self.handle_completion(completion);
                }
            }
        }

        info!("Resolution engine stopped");
        self.state.into_cache()
    }

    fn handle_command(&mut self, command: Command) {
        let mut effects = Effects::default();

        match command {
            Command::AlbumMetadata { album, target } => {
                self.state.album_metadata(&album, target, &mut effects);
            }
            Command::TrackMetadata {
                album,
                target,
                track,
            } => {
                self.state
                    .track_metadata(&album, target, &track, &mut effects);
            }
            Command::LoadRelease {
                album,
                target,
                tracks,
            } => {
                self.state.album_metadata(&album, target, &mut effects);
                for input in tracks {
                    self.state
                        .track_metadata(&album, input.target, &input.track, &mut effects);
                }
                self.state.end_album_load(&album, &mut effects);
            }
            Command::EndAlbumLoad { album } => self.state.end_album_load(&album, &mut effects),
            Command::AlbumRemoved { album_id } => self.state.remove_album(&album_id),
            Command::UpdateOptions(options) => self.state.set_options(options),
            Command::Stats(reply) => {
                let _ = reply.send(self.state.stats());
            }
        }

        self.apply(effects);
    }

    fn handle_completion(&mut self, completion: Completion) {
        let mut effects = Effects::default();
        let Completion { request, result } = completion;

        match request.kind {
            EntityKind::Artist => self.state.artist_response(&request.id, result, &mut effects),
            EntityKind::Area => self.state.area_response(&request.id, result, &mut effects),
        }

        self.apply(effects);
    }

    fn apply(&mut self, effects: Effects) {
        for request in effects.fetches {
            self.spawn_fetch(request);
        }
        for album in effects.finalize {
            debug!(album_id = %album.id(), "Album artist details complete");
            album.finalize_loading(None);
        }
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        let span = tracing::debug_span!(
            "fetch",
            task_id = %request.task_id(),
            description = %request.description()
        );
        let guard = CompletionGuard::new(self.completion_tx.clone(), request.clone());
        let fetcher = Arc::clone(&self.fetcher);
        let timeout: Duration = self.state.options().fetch_timeout;

        self.in_flight += 1;
        tokio::spawn(
            async move {
                fetcher.ready().await;
                let result = match tokio::time::timeout(timeout, fetcher.fetch(&request)).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout(timeout)),
                };
                guard.complete(result);
            }
            .instrument(span),
        );
    }
}
