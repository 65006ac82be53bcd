//! Area hierarchy arena
//!
//! Nodes reference their parent by identifier, so a node may name a parent
//! that has not been resolved (yet, or ever). Lookups of such parents simply
//! miss.

use crate::model::AreaRecord;
use std::collections::HashMap;

/// Area records keyed by area identifier (append-only)
#[derive(Debug, Default)]
pub struct AreaStore {
    areas: HashMap<String, AreaRecord>,
}

impl AreaStore {
    pub fn get(&self, area_id: &str) -> Option<&AreaRecord> {
        self.areas.get(area_id)
    }

    pub fn contains(&self, area_id: &str) -> bool {
        self.areas.contains_key(area_id)
    }

    /// Store a record unless one is already present; returns true if stored
    pub fn put(&mut self, area_id: &str, record: AreaRecord) -> bool {
        if self.areas.contains_key(area_id) {
            return false;
        }
        self.areas.insert(area_id.to_string(), record);
        true
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}
