//! aad-resolver library
//!
//! Enriches album and track metadata with details about the credited
//! artists. Artist and area identifiers are resolved against the MusicBrainz
//! web service; each identifier is fetched at most once per cache lifetime,
//! area hierarchies are climbed up to their country, and an album's
//! destinations are written once every lookup it triggered has completed.

pub mod cache;
pub mod drill;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod host;
pub mod model;
pub mod musicbrainz;
pub mod options;
pub mod parse;
pub mod targets;
pub mod tracker;

pub use crate::cache::ResultCache;
pub use crate::engine::{EngineHandle, EngineStats, ResolutionEngine, TrackInput};
pub use crate::error::{ResolveError, Result};
pub use crate::fetcher::{FetchError, FetchRequest, Fetcher};
pub use crate::host::{Album, Metadata, MetadataTarget};
pub use crate::options::{EnrichmentOptions, LocationOptions};
