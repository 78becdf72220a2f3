//! Reset the marketplace store and staging directory, then repopulate both
//! with a fresh fixture snapshot.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::sync::Arc;

use marketplace_seed::config::SeedSettings;
use marketplace_seed::outbound::{BcryptPasswordHasher, DbPool, DieselFixtureStore, PoolConfig};
use marketplace_seed::{ImagePool, SeedPipeline, StagingArea};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main()).inspect_err(|failure| {
        error!(error = %failure, "seeding run failed");
    })
}

async fn async_main() -> io::Result<()> {
    let settings = SeedSettings::load_from_iter(std::env::args_os()).map_err(|error| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("load settings: {error}"),
        )
    })?;
    let database_url = settings
        .resolve_database_url()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
    let staging_path = settings
        .staging_path()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
    let image_path = settings
        .image_path()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

    let staging = StagingArea::open(&staging_path).map_err(io::Error::other)?;
    let images = ImagePool::open(&image_path).map_err(io::Error::other)?;
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let mut pipeline = SeedPipeline::new(
        Arc::new(DieselFixtureStore::new(pool)),
        Arc::new(BcryptPasswordHasher::default()),
        staging,
        images,
        Arc::new(DefaultClock),
    );
    if let Some(seed) = settings.rng_seed {
        pipeline = pipeline.with_rng_seed(seed);
    }

    let report = pipeline
        .run()
        .await
        .map_err(|error| io::Error::other(format!("seeding run failed: {error}")))?;
    let summary = serde_json::to_string(&report)
        .map_err(|error| io::Error::other(format!("serialize run report: {error}")))?;
    info!(report = %summary, "fixture snapshot ready");
    Ok(())
}
