//! Per-album in-flight request accounting
//!
//! An album's enrichment is complete when its load has been closed by the
//! host, its outstanding request counter is zero, and none of the area
//! fetches started on its behalf are still open.

use std::collections::{HashMap, HashSet};

/// Result of ending one request for an album
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Work is still outstanding
    Pending,
    /// Counter reached zero with no open area fetches
    Drained,
    /// No bookkeeping exists for the album (removed, or never started)
    Untracked,
}

#[derive(Debug, Default)]
struct AlbumLoad {
    outstanding: usize,
    areas: HashSet<String>,
    /// Host is still feeding album and track metadata
    loading: bool,
}

impl AlbumLoad {
    fn state(&self) -> LoadState {
        if self.outstanding == 0 && self.areas.is_empty() && !self.loading {
            LoadState::Drained
        } else {
            LoadState::Pending
        }
    }
}

#[derive(Debug, Default)]
pub struct AlbumLoadTracker {
    albums: HashMap<String, AlbumLoad>,
}

impl AlbumLoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_request(&mut self, album_id: &str) {
        self.albums
            .entry(album_id.to_string())
            .or_default()
            .outstanding += 1;
    }

    /// Decrement the album's counter
    ///
    /// A missing entry counts as holding exactly this one request, so it lands
    /// at zero; no entry is kept for it and the caller must skip write-back.
    pub fn end_request(&mut self, album_id: &str) -> LoadState {
        let Some(load) = self.albums.get_mut(album_id) else {
            return LoadState::Untracked;
        };

        load.outstanding = load.outstanding.saturating_sub(1);
        load.state()
    }

    /// Hold the album open until [`AlbumLoadTracker::close_load`]
    pub fn open_load(&mut self, album_id: &str) {
        self.albums.entry(album_id.to_string()).or_default().loading = true;
    }

    /// Release the hold taken by `open_load`
    ///
    /// Returns `Untracked` when no load is open, so a repeated close never
    /// drains the album a second time.
    pub fn close_load(&mut self, album_id: &str) -> LoadState {
        match self.albums.get_mut(album_id) {
            Some(load) if load.loading => {
                load.loading = false;
                load.state()
            }
            _ => LoadState::Untracked,
        }
    }

    pub fn is_loading(&self, album_id: &str) -> bool {
        self.albums.get(album_id).is_some_and(|load| load.loading)
    }

    pub fn track_area(&mut self, album_id: &str, area_id: &str) {
        self.albums
            .entry(album_id.to_string())
            .or_default()
            .areas
            .insert(area_id.to_string());
    }

    pub fn untrack_area(&mut self, album_id: &str, area_id: &str) {
        if let Some(load) = self.albums.get_mut(album_id) {
            load.areas.remove(area_id);
        }
    }

    pub fn outstanding_area_count(&self, album_id: &str) -> usize {
        self.albums.get(album_id).map_or(0, |load| load.areas.len())
    }

    pub fn outstanding_requests(&self, album_id: &str) -> usize {
        self.albums.get(album_id).map_or(0, |load| load.outstanding)
    }

    /// True when no load, request or area fetch is open for the album
    pub fn is_idle(&self, album_id: &str) -> bool {
        self.albums
            .get(album_id)
            .map_or(true, |load| load.state() == LoadState::Drained)
    }

    pub fn is_tracked(&self, album_id: &str) -> bool {
        self.albums.contains_key(album_id)
    }

    pub fn remove_album(&mut self, album_id: &str) -> bool {
        self.albums.remove(album_id).is_some()
    }

    /// Albums with at least one open request
    pub fn busy_albums(&self) -> impl Iterator<Item = (&str, usize)> {
        self.albums
            .iter()
            .filter(|(_, load)| load.outstanding > 0)
            .map(|(id, load)| (id.as_str(), load.outstanding))
    }
}
