//! Album double that records finalization

use aad_resolver::{Album, EngineHandle, EngineStats};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const WAIT_LIMIT: Duration = Duration::from_secs(5);

pub struct TestAlbum {
    id: String,
    artists: Vec<String>,
    finalized: AtomicUsize,
    notify: Notify,
}

impl TestAlbum {
    pub fn new(id: &str, artists: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            artists: artists.iter().map(|s| s.to_string()).collect(),
            finalized: AtomicUsize::new(0),
            notify: Notify::new(),
        })
    }

    pub fn finalize_count(&self) -> usize {
        self.finalized.load(Ordering::SeqCst)
    }

    /// Wait for the next finalization, panicking after a few seconds
    pub async fn wait_finalized(&self) {
        tokio::time::timeout(WAIT_LIMIT, self.notify.notified())
            .await
            .unwrap_or_else(|_| panic!("album '{}' was never finalized", self.id));
    }
}

impl Album for TestAlbum {
    fn id(&self) -> &str {
        &self.id
    }

    fn album_artists(&self) -> Vec<String> {
        self.artists.clone()
    }

    fn finalize_loading(&self, error: Option<String>) {
        assert!(error.is_none(), "unexpected finalize error: {:?}", error);
        self.finalized.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_one();
    }
}

/// Poll engine stats until `ready` holds
pub async fn wait_for_stats<F>(engine: &EngineHandle, ready: F) -> EngineStats
where
    F: Fn(&EngineStats) -> bool,
{
    let poll = async {
        loop {
            let stats = engine.stats().await.unwrap();
            if ready(&stats) {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(WAIT_LIMIT, poll)
        .await
        .expect("engine never reached the expected state")
}
