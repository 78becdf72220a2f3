//! Seeding configuration loaded via OrthoConfig.

use std::env;
use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_STAGING_DIR: &str = "temp";
const DATABASE_URL_ENV: &str = "DATABASE_URL";

fn default_image_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("images")
}

/// Errors raised while resolving settings into runnable values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// Neither the setting nor `DATABASE_URL` provides a connection string.
    #[error("database URL missing: set MARKETPLACE_SEED_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,
    /// The resolved connection string is blank.
    #[error("database URL must not be empty")]
    EmptyDatabaseUrl,
    /// A configured directory is not valid UTF-8.
    #[error("path '{path}' is not valid UTF-8")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },
}

/// Configuration values controlling a seeding run.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MARKETPLACE_SEED")]
pub struct SeedSettings {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    pub database_url: Option<String>,
    /// Staging directory, relative to the working directory unless
    /// absolute. Must exist before the run.
    #[ortho_config(default = PathBuf::from(DEFAULT_STAGING_DIR))]
    pub staging_dir: PathBuf,
    /// Image pool directory override.
    pub image_dir: Option<PathBuf>,
    /// Fixed RNG seed for reproducible runs.
    pub rng_seed: Option<u64>,
}

impl SeedSettings {
    /// Return the configured staging directory.
    #[must_use]
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Return the configured image pool, falling back to the bundled images.
    #[must_use]
    pub fn image_dir(&self) -> PathBuf {
        self.image_dir.clone().unwrap_or_else(default_image_dir)
    }

    /// Staging directory as a UTF-8 path.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NonUtf8Path`] for a non UTF-8 path.
    pub fn staging_path(&self) -> Result<Utf8PathBuf, SettingsError> {
        utf8(self.staging_dir.clone())
    }

    /// Image pool directory as a UTF-8 path.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NonUtf8Path`] for a non UTF-8 path.
    pub fn image_path(&self) -> Result<Utf8PathBuf, SettingsError> {
        utf8(self.image_dir())
    }

    /// Resolve the database URL from the setting or `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when no URL is configured or it is blank.
    pub fn resolve_database_url(&self) -> Result<String, SettingsError> {
        let url = self.database_url.clone().map_or_else(
            || env::var(DATABASE_URL_ENV).map_err(|_| SettingsError::MissingDatabaseUrl),
            Ok,
        )?;
        if url.trim().is_empty() {
            return Err(SettingsError::EmptyDatabaseUrl);
        }
        Ok(url)
    }
}

fn utf8(path: PathBuf) -> Result<Utf8PathBuf, SettingsError> {
    Utf8PathBuf::from_path_buf(path).map_err(|raw| SettingsError::NonUtf8Path {
        path: raw.to_string_lossy().into_owned(),
    })
}
