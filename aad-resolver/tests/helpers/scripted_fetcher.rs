//! In-memory Fetcher with per-request scripting
//!
//! Responses are keyed by task id (`Artist=<id>`, `Area=<id>`). Unscripted
//! requests answer `NotFound`. A request can be gated (held until released),
//! delayed, or made to hang forever. `paced` spaces the start of requests
//! the way a rate-limited client does.

use aad_resolver::{FetchError, FetchRequest, Fetcher};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

#[derive(Default)]
pub struct ScriptedFetcher {
    responses: HashMap<String, Result<Value, FetchError>>,
    gates: HashMap<String, Arc<Semaphore>>,
    hanging: HashSet<String>,
    delay: Option<Duration>,
    pacing: Option<Duration>,
    next_start: tokio::sync::Mutex<Option<Instant>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artist(mut self, id: &str, doc: Value) -> Self {
        self.responses
            .insert(FetchRequest::artist(id).task_id(), Ok(doc));
        self
    }

    pub fn area(mut self, id: &str, doc: Value) -> Self {
        self.responses.insert(FetchRequest::area(id).task_id(), Ok(doc));
        self
    }

    pub fn failing(mut self, request: FetchRequest, error: FetchError) -> Self {
        self.responses.insert(request.task_id(), Err(error));
        self
    }

    /// Hold the request until [`ScriptedFetcher::release`] is called
    pub fn gated(mut self, request: FetchRequest) -> Self {
        self.gates
            .insert(request.task_id(), Arc::new(Semaphore::new(0)));
        self
    }

    /// Never answer the request
    pub fn hanging(mut self, request: FetchRequest) -> Self {
        self.hanging.insert(request.task_id());
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Let one request start per `interval`
    pub fn paced(mut self, interval: Duration) -> Self {
        self.pacing = Some(interval);
        self
    }

    pub fn release(&self, request: &FetchRequest) {
        if let Some(gate) = self.gates.get(&request.task_id()) {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self, request: &FetchRequest) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&request.task_id())
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn ready(&self) {
        let Some(interval) = self.pacing else {
            return;
        };
        let mut next = self.next_start.lock().await;
        if let Some(at) = *next {
            tokio::time::sleep_until(at).await;
        }
        *next = Some(Instant::now() + interval);
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Value, FetchError> {
        let task_id = request.task_id();
        *self.calls.lock().unwrap().entry(task_id.clone()).or_insert(0) += 1;

        if self.hanging.contains(&task_id) {
            std::future::pending::<()>().await;
        }
        if let Some(gate) = self.gates.get(&task_id) {
            gate.acquire()
                .await
                .map_err(|_| FetchError::Cancelled)?
                .forget();
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .get(&task_id)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NotFound(request.id.clone())))
    }
}
