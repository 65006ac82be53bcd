//! Request dedup sets
//!
//! An identifier enters its set when the first fetch for it is issued and
//! stays there whether that fetch succeeds or fails, so each identifier is
//! fetched at most once per cache lifetime. `forget` exists only for the
//! opt-in retry policy.

use crate::model::EntityKind;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct PendingSets {
    artists: HashSet<String>,
    areas: HashSet<String>,
}

impl PendingSets {
    fn set(&self, kind: EntityKind) -> &HashSet<String> {
        match kind {
            EntityKind::Artist => &self.artists,
            EntityKind::Area => &self.areas,
        }
    }

    fn set_mut(&mut self, kind: EntityKind) -> &mut HashSet<String> {
        match kind {
            EntityKind::Artist => &mut self.artists,
            EntityKind::Area => &mut self.areas,
        }
    }

    pub fn is_requested(&self, kind: EntityKind, id: &str) -> bool {
        self.set(kind).contains(id)
    }

    /// Returns true if the identifier was not already marked
    pub fn mark_requested(&mut self, kind: EntityKind, id: &str) -> bool {
        self.set_mut(kind).insert(id.to_string())
    }

    /// Allow the identifier to be requested again
    pub fn forget(&mut self, kind: EntityKind, id: &str) -> bool {
        self.set_mut(kind).remove(id)
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.set(kind).len()
    }
}
