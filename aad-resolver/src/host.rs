//! Host-side collaborators
//!
//! The host owns albums and the metadata records being annotated; the engine
//! only sees them through these traits.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// An album being loaded by the host
pub trait Album: Send + Sync {
    fn id(&self) -> &str;

    /// Album-level artist identifiers
    fn album_artists(&self) -> Vec<String>;

    /// Signals that enrichment work for the album is complete
    fn finalize_loading(&self, error: Option<String>);
}

/// A metadata record that receives artist-detail variables
pub trait MetadataTarget: Send + Sync {
    fn set(&self, key: &str, value: &str);
}

/// In-memory metadata record
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MetadataTarget for Metadata {
    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }
}
