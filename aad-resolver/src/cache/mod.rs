//! Process-lifetime result caches
//!
//! A [`ResultCache`] is created once by the host and moved into the
//! resolution engine, which becomes its single owner. Every album loaded
//! through that engine shares the same caches; the engine hands the cache
//! back when it shuts down. Nothing here is persisted.

mod areas;
mod artists;
mod pending;

pub use areas::AreaStore;
pub use artists::ArtistStore;
pub use pending::PendingSets;

use crate::model::EntityKind;

/// Artist and area stores plus their request dedup sets
#[derive(Debug, Default)]
pub struct ResultCache {
    pub artists: ArtistStore,
    pub areas: AreaStore,
    pub pending: PendingSets,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artist_requested(&self, artist_id: &str) -> bool {
        self.pending.is_requested(EntityKind::Artist, artist_id)
    }

    /// Returns true when this call is the first request for the artist
    pub fn mark_artist_requested(&mut self, artist_id: &str) -> bool {
        self.pending.mark_requested(EntityKind::Artist, artist_id)
    }

    pub fn area_requested(&self, area_id: &str) -> bool {
        self.pending.is_requested(EntityKind::Area, area_id)
    }

    /// Returns true when this call is the first request for the area
    pub fn mark_area_requested(&mut self, area_id: &str) -> bool {
        self.pending.mark_requested(EntityKind::Area, area_id)
    }
}
