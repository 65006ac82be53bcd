//! Runtime options for the resolution engine

use aad_common::DetailsConfig;
use std::time::Duration;

/// Which conditional area types are kept in composed location strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOptions {
    pub include_county: bool,
    pub include_municipality: bool,
    pub include_subdivision: bool,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            include_county: true,
            include_municipality: true,
            include_subdivision: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentOptions {
    pub process_track_artists: bool,
    pub location: LocationOptions,
    /// Per-fetch timeout; an expired fetch completes as a transport error
    pub fetch_timeout: Duration,
    /// Forget failed identifiers so a later reference fetches them again
    pub retry_failed_lookups: bool,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self::from(&DetailsConfig::default())
    }
}

impl From<&DetailsConfig> for EnrichmentOptions {
    fn from(details: &DetailsConfig) -> Self {
        Self {
            process_track_artists: details.process_track_artists,
            location: LocationOptions {
                include_county: details.include_county,
                include_municipality: details.include_municipality,
                include_subdivision: details.include_subdivision,
            },
            fetch_timeout: Duration::from_secs(details.fetch_timeout_secs),
            retry_failed_lookups: details.retry_failed_lookups,
        }
    }
}
