//! aad-resolver - artist details for a MusicBrainz release
//!
//! Fetches a release, resolves the details of its album artists (and
//! optionally its track artists) and prints the resulting variables as JSON.

use aad_common::TomlConfig;
use aad_resolver::musicbrainz::MusicBrainzClient;
use aad_resolver::parse::release_tracks;
use aad_resolver::{
    Album, EnrichmentOptions, Metadata, ResolutionEngine, ResultCache, TrackInput,
};
use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for aad-resolver
#[derive(Parser, Debug)]
#[command(name = "aad-resolver")]
#[command(about = "Resolve additional artist details for a MusicBrainz release")]
#[command(version)]
struct Args {
    /// Release MBID
    release: String,

    /// Config file (defaults to AAD_CONFIG or the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resolve track artists as well as album artists
    #[arg(long)]
    process_tracks: bool,

    /// Log filter, overriding the configured level
    #[arg(long, env = "AAD_LOG")]
    log_level: Option<String>,

    /// Persist the effective options (including --process-tracks) to the config file
    #[arg(long)]
    save_config: bool,
}

/// Release being enriched
struct ReleaseAlbum {
    id: String,
    artists: Vec<String>,
    finished: Notify,
}

impl Album for ReleaseAlbum {
    fn id(&self) -> &str {
        &self.id
    }

    fn album_artists(&self) -> Vec<String> {
        self.artists.clone()
    }

    fn finalize_loading(&self, _error: Option<String>) {
        self.finished.notify_one();
    }
}

fn init_tracing(config: &TomlConfig, override_level: Option<&str>) -> Result<()> {
    let filter = match override_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
    };

    let file_layer = match &config.logging.file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = file_layer
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}

fn album_artist_ids(release: &Value) -> Vec<String> {
    release
        .get("artist-credit")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|credit| credit.pointer("/artist/id").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = aad_common::config::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&config, args.log_level.as_deref())?;

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    config.details.process_track_artists |= args.process_tracks;
    if args.save_config {
        aad_common::config::save_config(args.config.as_deref(), &config)
            .context("Failed to save configuration")?;
    }
    let options = EnrichmentOptions::from(&config.details);

    let client = Arc::new(
        MusicBrainzClient::new(&config.musicbrainz).context("Failed to create MusicBrainz client")?,
    );

    let release = client
        .lookup_release(&args.release)
        .await
        .with_context(|| format!("Failed to fetch release {}", args.release))?;
    info!(
        release = %args.release,
        title = %release["title"].as_str().unwrap_or("Unknown"),
        "Retrieved release from MusicBrainz"
    );

    let album = Arc::new(ReleaseAlbum {
        id: args.release.clone(),
        artists: album_artist_ids(&release),
        finished: Notify::new(),
    });
    let album_metadata = Metadata::new();
    let tracks: Vec<(String, Metadata, Value)> = release_tracks(&release)
        .into_iter()
        .map(|track| {
            let title = track["title"].as_str().unwrap_or_default().to_string();
            (title, Metadata::new(), track.clone())
        })
        .collect();

    let (engine, task) = ResolutionEngine::spawn(client, ResultCache::new(), options);

    let inputs = tracks
        .iter()
        .map(|(_, metadata, track)| TrackInput {
            track: track.clone(),
            target: Arc::new(metadata.clone()),
        })
        .collect();
    engine.load_release(album.clone(), Arc::new(album_metadata.clone()), inputs)?;

    album.finished.notified().await;
    let stats = engine.stats().await?;

    drop(engine);
    let cache = task.await.context("Resolution engine task failed")?;
    info!(
        artists = cache.artists.len(),
        areas = cache.areas.len(),
        "Resolution complete"
    );

    let output = json!({
        "release": args.release,
        "album": album_metadata.snapshot(),
        "stats": stats,
        "tracks": tracks
            .iter()
            .map(|(title, metadata, _)| json!({"title": title, "variables": metadata.snapshot()}))
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
