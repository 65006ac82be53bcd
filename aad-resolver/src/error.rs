//! Error types for aad-resolver
//!
//! Fetch-triggered errors are absorbed at the completion handler: they are
//! logged and never surface to the host as a failed album load.

use crate::fetcher::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Fetch failed or timed out
    #[error("Transport error: {0}")]
    Transport(#[from] FetchError),

    /// Expected element missing from a payload
    #[error("Album '{album_id}' missing '{element}' in {group} metadata")]
    MetadataShape {
        album_id: String,
        element: String,
        group: String,
    },

    /// Bookkeeping inconsistency (e.g. write-back with no destinations)
    #[error("Internal state error: {0}")]
    InternalState(String),

    /// The engine task has stopped and no longer accepts work
    #[error("Resolution engine is not running")]
    EngineStopped,
}

pub type Result<T> = std::result::Result<T, ResolveError>;
