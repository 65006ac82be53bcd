//! # AAD Common Library
//!
//! Shared code for the additional-artist-details workspace:
//! - Error type shared by all crates
//! - TOML configuration model, loading and persistence
//! - Configuration file path resolution

pub mod config;
pub mod error;

pub use config::{DetailsConfig, LoggingConfig, MusicBrainzConfig, TomlConfig};
pub use error::{Error, Result};
