//! Resolution state machine
//!
//! All bookkeeping lives here and is mutated only by the engine task, one
//! message at a time. Handlers never perform I/O themselves; they return
//! [`Effects`] (fetches to start, albums to finalize) for the task to carry
//! out.
//!
//! Every fetch in flight keeps the list of albums waiting on it. An album
//! that references an artist or area already being fetched for another album
//! joins that list instead of issuing a second request, so it is finalized
//! only after the shared result has arrived.

use crate::cache::ResultCache;
use crate::drill::MAX_DRILL_HOPS;
use crate::error::ResolveError;
use crate::fetcher::{FetchError, FetchRequest};
use crate::host::{Album, MetadataTarget};
use crate::model::{AreaRecord, EntityKind};
use crate::options::EnrichmentOptions;
use crate::parse::{self, AreaRelation, ParsedArea, RelationDirection};
use crate::targets::TargetRegistry;
use crate::tracker::{AlbumLoadTracker, LoadState};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Side effects produced by one handled message
#[derive(Default)]
pub struct Effects {
    pub fetches: Vec<FetchRequest>,
    pub finalize: Vec<Arc<dyn Album>>,
}

/// Which entry point supplied an artist set (for log messages)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Album,
    Track,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Album => f.write_str("Album"),
            SourceKind::Track => f.write_str("Track"),
        }
    }
}

/// Counters reported by [`ResolverState::stats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub artists_cached: usize,
    pub areas_cached: usize,
    pub artists_requested: usize,
    pub areas_requested: usize,
    pub active_albums: usize,
    pub fetches_in_flight: usize,
    /// Open requests per album (albums with none are omitted)
    pub outstanding: BTreeMap<String, usize>,
}

impl EngineStats {
    pub fn outstanding_for(&self, album_id: &str) -> usize {
        self.outstanding.get(album_id).copied().unwrap_or(0)
    }
}

pub struct ResolverState {
    cache: ResultCache,
    tracker: AlbumLoadTracker,
    targets: TargetRegistry,
    options: EnrichmentOptions,
    /// Albums waiting on each fetch in flight
    waiting: HashMap<FetchRequest, Vec<Arc<dyn Album>>>,
}

impl ResolverState {
    pub fn new(cache: ResultCache, options: EnrichmentOptions) -> Self {
        Self {
            cache,
            tracker: AlbumLoadTracker::new(),
            targets: TargetRegistry::new(),
            options,
            waiting: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    #[cfg(test)]
    pub fn tracker(&self) -> &AlbumLoadTracker {
        &self.tracker
    }

    #[cfg(test)]
    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    pub fn options(&self) -> &EnrichmentOptions {
        &self.options
    }

    pub fn into_cache(self) -> ResultCache {
        self.cache
    }

    pub fn set_options(&mut self, options: EnrichmentOptions) {
        debug!(?options, "Updating enrichment options");
        self.options = options;
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            artists_cached: self.cache.artists.len(),
            areas_cached: self.cache.areas.len(),
            artists_requested: self.cache.pending.len(EntityKind::Artist),
            areas_requested: self.cache.pending.len(EntityKind::Area),
            active_albums: self.targets.len(),
            fetches_in_flight: self.waiting.len(),
            outstanding: self
                .tracker
                .busy_albums()
                .map(|(id, count)| (id.to_string(), count))
                .collect(),
        }
    }

    // ------------------------------------------------------------------
    // Host entry points
    // ------------------------------------------------------------------

    /// Seed album-level artist resolution and open the album's load
    ///
    /// The album is neither written nor finalized until
    /// [`ResolverState::end_album_load`] closes the load, so track metadata
    /// arriving later still belongs to the same load.
    pub fn album_metadata(
        &mut self,
        album: &Arc<dyn Album>,
        target: Arc<dyn MetadataTarget>,
        effects: &mut Effects,
    ) {
        let artists: BTreeSet<String> = album.album_artists().into_iter().collect();
        self.tracker.open_load(album.id());
        self.targets.set_album_artists(album.id(), artists.clone());
        if !self.options.process_track_artists {
            info!("Track artist processing is disabled.");
        }
        self.process_artist_set(artists, album, target, SourceKind::Album, effects);
    }

    /// Resolve the artists credited on one track
    ///
    /// With track processing disabled the track is still registered, so it
    /// receives the album artists' details.
    pub fn track_metadata(
        &mut self,
        album: &Arc<dyn Album>,
        target: Arc<dyn MetadataTarget>,
        track: &Value,
        effects: &mut Effects,
    ) {
        let mut artists = BTreeSet::new();
        if self.options.process_track_artists {
            let credits = parse::track_credits(track);
            for element in credits.missing {
                let err = ResolveError::MetadataShape {
                    album_id: album.id().to_string(),
                    element: element.to_string(),
                    group: "track".to_string(),
                };
                error!("{}", err);
            }
            artists = credits.artist_ids;
        }
        self.process_artist_set(artists, album, target, SourceKind::Track, effects);
    }

    /// Close the album's load; finalizes now if nothing is outstanding
    pub fn end_album_load(&mut self, album: &Arc<dyn Album>, effects: &mut Effects) {
        match self.tracker.close_load(album.id()) {
            LoadState::Drained => self.finish(album, effects),
            LoadState::Pending => {
                debug!(album_id = %album.id(), "Album load closed with lookups outstanding");
            }
            LoadState::Untracked => {
                debug!(album_id = %album.id(), "No open load for album");
            }
        }
    }

    /// Drop all bookkeeping for an album
    ///
    /// Fetches already in flight still fill the caches when they complete.
    pub fn remove_album(&mut self, album_id: &str) {
        debug!(album_id = %album_id, "Removing album");
        self.targets.remove_album(album_id);
        self.tracker.remove_album(album_id);
        for waiters in self.waiting.values_mut() {
            waiters.retain(|album| album.id() != album_id);
        }
    }

    /// Register a destination and fetch every artist not requested before
    pub fn process_artist_set(
        &mut self,
        artist_ids: BTreeSet<String>,
        album: &Arc<dyn Album>,
        target: Arc<dyn MetadataTarget>,
        source: SourceKind,
        effects: &mut Effects,
    ) {
        let album_id = album.id().to_string();
        self.targets.register_album(&album_id);

        for artist_id in &artist_ids {
            let request = FetchRequest::artist(artist_id.as_str());
            if self.cache.mark_artist_requested(artist_id) {
                debug!(artist_id = %artist_id, "Retrieving artist information from MusicBrainz");
                self.issue(request, vec![Arc::clone(album)], effects);
            } else if self.join(&request, album) {
                debug!(artist_id = %artist_id, source = %source, "Artist lookup already in progress");
            } else {
                debug!(
                    artist_id = %artist_id,
                    source = %source,
                    "Artist information available from cache"
                );
                self.join_artist_areas(artist_id, album);
            }
        }

        self.targets.add_destination(&album_id, artist_ids, target);
        self.try_write_back(&album_id);
    }

    // ------------------------------------------------------------------
    // Waiter bookkeeping
    // ------------------------------------------------------------------

    /// Start a fetch on behalf of `albums`
    fn issue(&mut self, request: FetchRequest, albums: Vec<Arc<dyn Album>>, effects: &mut Effects) {
        for album in &albums {
            self.account(&request, album.id());
        }
        self.waiting.insert(request.clone(), albums);
        effects.fetches.push(request);
    }

    fn account(&mut self, request: &FetchRequest, album_id: &str) {
        self.tracker.begin_request(album_id);
        if request.kind == EntityKind::Area {
            self.tracker.track_area(album_id, &request.id);
        }
    }

    /// Attach the album to a fetch in flight; false if there is none
    fn join(&mut self, request: &FetchRequest, album: &Arc<dyn Album>) -> bool {
        let Some(waiters) = self.waiting.get_mut(request) else {
            return false;
        };
        if waiters.iter().all(|waiter| waiter.id() != album.id()) {
            waiters.push(Arc::clone(album));
            self.account(request, album.id());
        }
        true
    }

    /// Wait for any area fetch still completing a cached artist's locations
    fn join_artist_areas(&mut self, artist_id: &str, album: &Arc<dyn Album>) {
        let area_ids: Vec<String> = match self.cache.artists.get(artist_id) {
            Some(record) => record
                .area_fields()
                .into_iter()
                .map(|(_, area_id)| area_id.to_string())
                .collect(),
            None => return,
        };
        for area_id in area_ids {
            self.join_area_chain(&area_id, album);
        }
    }

    /// Climb known parents until reaching an area whose fetch is in flight
    fn join_area_chain(&mut self, start_area_id: &str, album: &Arc<dyn Album>) {
        let mut area_id = start_area_id.to_string();
        for _ in 0..MAX_DRILL_HOPS {
            if area_id.is_empty() || self.join(&FetchRequest::area(area_id.as_str()), album) {
                return;
            }
            match self.cache.areas.get(&area_id) {
                Some(area) => area_id = area.parent.clone(),
                None => return,
            }
        }
    }

    /// Fetch an area for `albums` unless it was requested before
    fn request_area(&mut self, area_id: &str, albums: &[Arc<dyn Album>], effects: &mut Effects) {
        if self.cache.mark_area_requested(area_id) {
            debug!(area_id = %area_id, "Retrieving area from MusicBrainz");
            self.issue(FetchRequest::area(area_id), albums.to_vec(), effects);
        } else {
            for album in albums {
                self.join_area_chain(area_id, album);
            }
        }
    }

    // ------------------------------------------------------------------
    // Fetch completions
    // ------------------------------------------------------------------

    fn take_waiters(&mut self, request: &FetchRequest) -> Vec<Arc<dyn Album>> {
        let waiters = self.waiting.remove(request).unwrap_or_default();
        if waiters.is_empty() {
            debug!(task_id = %request.task_id(), "No album is waiting on this result");
        }
        waiters
    }

    pub fn artist_response(
        &mut self,
        artist_id: &str,
        result: Result<Value, FetchError>,
        effects: &mut Effects,
    ) {
        let waiters = self.take_waiters(&FetchRequest::artist(artist_id));

        match result {
            Err(err) => {
                error!(artist_id = %artist_id, error = %err, "Artist information retrieval error");
                self.after_failure(EntityKind::Artist, artist_id);
            }
            Ok(doc) => {
                let record = parse::parse_artist(artist_id, &doc);
                let area_ids: Vec<String> = record
                    .area_fields()
                    .into_iter()
                    .map(|(_, area_id)| area_id.to_string())
                    .collect();
                self.cache.artists.put(record);
                for area_id in &area_ids {
                    self.request_area(area_id, &waiters, effects);
                }
            }
        }

        for album in &waiters {
            self.end_request(album, effects);
        }
    }

    pub fn area_response(
        &mut self,
        area_id: &str,
        result: Result<Value, FetchError>,
        effects: &mut Effects,
    ) {
        let waiters = self.take_waiters(&FetchRequest::area(area_id));

        match result {
            Err(err) => {
                error!(area_id = %area_id, error = %err, "Area information retrieval error");
                self.after_failure(EntityKind::Area, area_id);
            }
            Ok(doc) => self.apply_area_document(area_id, &doc, &waiters, effects),
        }

        for album in &waiters {
            self.tracker.untrack_area(album.id(), area_id);
            self.end_request(album, effects);
        }
    }

    fn after_failure(&mut self, kind: EntityKind, id: &str) {
        if self.options.retry_failed_lookups {
            self.cache.pending.forget(kind, id);
            debug!(id = %id, "Failed {} lookup may be retried on next reference", kind);
        }
    }

    fn apply_area_document(
        &mut self,
        requested_id: &str,
        doc: &Value,
        waiters: &[Arc<dyn Album>],
        effects: &mut Effects,
    ) {
        let area = parse::parse_area(doc);
        if area.id.is_empty() {
            error!(area_id = %requested_id, "Area response has no identifier");
            return;
        }

        if area.is_country() && !self.cache.areas.contains(&area.id) {
            log_area(&area.id, &format!("{} ({})", area.name, area.country), &area.type_text);
            self.cache.areas.put(
                &area.id,
                AreaRecord {
                    parent: String::new(),
                    name: area.name.clone(),
                    country: area.country.clone(),
                    area_type: area.area_type.clone(),
                    type_text: area.type_text.clone(),
                },
            );
        }

        for relation in parse::part_of_relations(doc) {
            self.apply_relation(&area, relation, waiters, effects);
        }
    }

    /// Link one `part of` relation into the hierarchy
    fn apply_relation(
        &mut self,
        area: &ParsedArea,
        relation: AreaRelation,
        waiters: &[Arc<dyn Album>],
        effects: &mut Effects,
    ) {
        let related = relation.area;

        match relation.direction {
            RelationDirection::Backward => {
                // `area` is part of `related`
                if !self.cache.areas.contains(&area.id) {
                    log_area(&area.id, &area.name, &area.type_text);
                    self.cache.areas.put(
                        &area.id,
                        AreaRecord {
                            parent: related.id.clone(),
                            name: area.name.clone(),
                            country: String::new(),
                            area_type: area.area_type.clone(),
                            type_text: area.type_text.clone(),
                        },
                    );
                    self.cache.mark_area_requested(&area.id);
                }

                if related.is_country() {
                    self.add_country(&related);
                } else if !self.cache.areas.contains(&related.id) {
                    self.request_area(&related.id, waiters, effects);
                }
            }
            RelationDirection::Forward if related.is_country() => {
                self.add_country(&related);
            }
            _ => {
                if !self.cache.areas.contains(&related.id) {
                    log_area(&related.id, &related.name, &related.type_text);
                    self.cache.areas.put(
                        &related.id,
                        AreaRecord {
                            parent: area.id.clone(),
                            name: related.name.clone(),
                            country: String::new(),
                            area_type: related.area_type.clone(),
                            type_text: related.type_text.clone(),
                        },
                    );
                }
                self.cache.mark_area_requested(&related.id);
            }
        }
    }

    fn add_country(&mut self, country: &ParsedArea) {
        if self.cache.areas.contains(&country.id) {
            return;
        }
        log_area(
            &country.id,
            &format!("{} ({})", country.name, country.country),
            &country.type_text,
        );
        self.cache.areas.put(
            &country.id,
            AreaRecord {
                parent: String::new(),
                name: country.name.clone(),
                country: country.country.clone(),
                area_type: country.area_type.clone(),
                type_text: country.type_text.clone(),
            },
        );
        self.cache.mark_area_requested(&country.id);
    }

    // ------------------------------------------------------------------
    // Album completion
    // ------------------------------------------------------------------

    fn end_request(&mut self, album: &Arc<dyn Album>, effects: &mut Effects) {
        match self.tracker.end_request(album.id()) {
            LoadState::Pending => {}
            LoadState::Drained => self.finish(album, effects),
            LoadState::Untracked => {
                debug!(album_id = %album.id(), "No request bookkeeping for album");
            }
        }
    }

    fn finish(&mut self, album: &Arc<dyn Album>, effects: &mut Effects) {
        self.write_back(album.id());
        effects.finalize.push(Arc::clone(album));
    }

    /// Write back now if the album has no open load and nothing outstanding
    fn try_write_back(&mut self, album_id: &str) {
        if self.tracker.is_idle(album_id) {
            self.write_back(album_id);
        }
    }

    fn write_back(&self, album_id: &str) {
        match self
            .targets
            .write_all(album_id, &self.cache, &self.options.location)
        {
            Ok(count) => debug!(
                album_id = %album_id,
                destinations = count,
                "Artist details written"
            ),
            Err(err) => error!(album_id = %album_id, "{}", err),
        }
    }
}

fn log_area(area_id: &str, area_name: &str, area_type: &str) {
    debug!("Adding area: {} => {} of type '{}'", area_id, area_name, area_type);
}
