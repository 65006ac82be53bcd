//! Test Helper Utilities
//!
//! Shared fixtures for driving the resolution engine

#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod log_capture;
pub mod scripted_fetcher;
pub mod test_album;

pub use fixtures::{artist_doc, country_rel, county_doc, part_of, town_doc};
pub use log_capture::LogCapture;
pub use scripted_fetcher::ScriptedFetcher;
pub use test_album::{wait_for_stats, TestAlbum};
