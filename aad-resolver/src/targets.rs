//! Per-album destinations awaiting artist details
//!
//! Each album keeps its album-level artist set and an ordered list of
//! destinations (the album record itself plus one per track). Write-back
//! gives every destination the union of the album artists and its own set.

use crate::cache::{AreaStore, ResultCache};
use crate::drill::drill_area;
use crate::error::ResolveError;
use crate::host::MetadataTarget;
use crate::model::ArtistRecord;
use crate::options::LocationOptions;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// A metadata record and the artists referenced by it
pub struct Destination {
    pub artists: BTreeSet<String>,
    pub target: Arc<dyn MetadataTarget>,
}

struct AlbumTarget {
    album_artists: BTreeSet<String>,
    destinations: Vec<Destination>,
}

#[derive(Default)]
pub struct TargetRegistry {
    albums: HashMap<String, AlbumTarget>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty album entry if none exists
    pub fn register_album(&mut self, album_id: &str) {
        self.albums
            .entry(album_id.to_string())
            .or_insert_with(|| AlbumTarget {
                album_artists: BTreeSet::new(),
                destinations: Vec::new(),
            });
    }

    pub fn set_album_artists(&mut self, album_id: &str, artists: BTreeSet<String>) {
        self.register_album(album_id);
        if let Some(album) = self.albums.get_mut(album_id) {
            album.album_artists = artists;
        }
    }

    pub fn add_destination(
        &mut self,
        album_id: &str,
        artists: BTreeSet<String>,
        target: Arc<dyn MetadataTarget>,
    ) {
        self.register_album(album_id);
        if let Some(album) = self.albums.get_mut(album_id) {
            album.destinations.push(Destination { artists, target });
        }
    }

    pub fn contains(&self, album_id: &str) -> bool {
        self.albums.contains_key(album_id)
    }

    pub fn destination_count(&self, album_id: &str) -> usize {
        self.albums
            .get(album_id)
            .map_or(0, |album| album.destinations.len())
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    pub fn remove_album(&mut self, album_id: &str) -> bool {
        self.albums.remove(album_id).is_some()
    }

    /// Write resolved artist details into every destination of the album
    ///
    /// Returns the number of destinations written. Artists without a stored
    /// record (not resolved yet, or failed) are skipped.
    pub fn write_all(
        &self,
        album_id: &str,
        cache: &ResultCache,
        options: &LocationOptions,
    ) -> Result<usize, ResolveError> {
        let album = self
            .albums
            .get(album_id)
            .filter(|album| !album.destinations.is_empty())
            .ok_or_else(|| {
                ResolveError::InternalState(format!(
                    "No metadata targets found for album '{}'",
                    album_id
                ))
            })?;

        for destination in &album.destinations {
            let artists = album.album_artists.union(&destination.artists);
            for artist_id in artists {
                let Some(record) = cache.artists.get(artist_id) else {
                    continue;
                };
                for (key, value) in artist_variables(artist_id, record, &cache.areas, options) {
                    destination.target.set(&key, &value);
                }
            }
        }

        Ok(album.destinations.len())
    }
}

fn variable_name(artist_id: &str, field: &str) -> String {
    format!("artist_{}_{}", artist_id, field.replace('-', "_"))
}

/// Destination variables for one artist
///
/// Plain fields are written as-is; each area field is drilled up and written
/// as a country code and a location string, each only when non-empty.
pub fn artist_variables(
    artist_id: &str,
    record: &ArtistRecord,
    areas: &AreaStore,
    options: &LocationOptions,
) -> Vec<(String, String)> {
    let mut variables: Vec<(String, String)> = record
        .plain_fields()
        .into_iter()
        .map(|(field, value)| (variable_name(artist_id, field), value.to_string()))
        .collect();

    for (field, area_id) in record.area_fields() {
        let (country, location) = drill_area(areas, area_id, options);
        if !country.is_empty() {
            variables.push((variable_name(artist_id, field.country_key()), country));
        }
        if !location.is_empty() {
            variables.push((variable_name(artist_id, field.location_key()), location));
        }
    }

    variables
}
