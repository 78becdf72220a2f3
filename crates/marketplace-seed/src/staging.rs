//! Attachment staging area and the source image pool.
//!
//! Both directories are reached through `cap_std` capability handles opened
//! once up front. Every filesystem call runs on Tokio's blocking pool so that
//! copies and deletes for independent products overlap.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use futures_util::future::try_join_all;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::error::StagingError;

/// Runs a blocking filesystem closure on the Tokio blocking pool.
async fn blocking<T, F>(op: F) -> Result<T, StagingError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StagingError> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|err| StagingError::BackgroundTask {
            message: err.to_string(),
        })?
}

fn open_dir(path: &Utf8Path) -> Result<Dir, StagingError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|source| {
        StagingError::OpenDirectory {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Lists the raw entry names in `dir`, sorted.
fn list_entries(dir: &Dir, path: &Utf8Path) -> Result<Vec<DirEntryName>, StagingError> {
    let read_error = |source: io::Error| StagingError::ReadDirectory {
        path: path.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for item in dir.entries().map_err(read_error)? {
        let entry = item.map_err(read_error)?;
        let is_dir = entry.file_type().map_err(read_error)?.is_dir();
        names.push(DirEntryName {
            name: entry.file_name(),
            is_dir,
        });
    }
    names.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(names)
}

/// Converts listed names to UTF-8 for reporting and image selection.
fn utf8_names<I>(entries: I, path: &Utf8Path) -> Result<Vec<String>, StagingError>
where
    I: IntoIterator<Item = DirEntryName>,
{
    entries
        .into_iter()
        .map(|entry| {
            entry
                .name
                .into_string()
                .map_err(|_| StagingError::NonUtf8Name {
                    path: path.to_path_buf(),
                })
        })
        .collect()
}

struct DirEntryName {
    name: OsString,
    is_dir: bool,
}

/// The directory attachment files are staged into.
///
/// The directory must already exist; it is never created here.
#[derive(Debug, Clone)]
pub struct StagingArea {
    path: Utf8PathBuf,
    dir: Arc<Dir>,
}

impl StagingArea {
    /// Opens an existing staging directory.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::OpenDirectory`] if the directory is missing or
    /// cannot be opened.
    pub fn open(path: &Utf8Path) -> Result<Self, StagingError> {
        let dir = open_dir(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            dir: Arc::new(dir),
        })
    }

    /// Path the staging area was opened from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Removes every entry in the staging directory.
    ///
    /// Entries are deleted concurrently; the first failure aborts the reset
    /// and is returned. An empty directory is a no-op. Returns the number of
    /// entries removed.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError`] if the directory cannot be listed or any entry
    /// cannot be removed.
    pub async fn reset(&self) -> Result<usize, StagingError> {
        let dir = Arc::clone(&self.dir);
        let path = self.path.clone();
        let entries = blocking(move || list_entries(&dir, &path)).await?;
        if entries.is_empty() {
            return Ok(0);
        }

        let removals = entries.into_iter().map(|entry| {
            let handle = Arc::clone(&self.dir);
            blocking(move || {
                let outcome = if entry.is_dir {
                    handle.remove_dir_all(&entry.name)
                } else {
                    handle.remove_file(&entry.name)
                };
                outcome.map_err(|source| StagingError::RemoveEntry {
                    name: entry.name.to_string_lossy().into_owned(),
                    source,
                })
            })
        });
        let removed = try_join_all(removals).await?.len();
        debug!(path = %self.path, removed, "staging area cleared");
        Ok(removed)
    }

    /// Copies `source_image` from `pool` into the staging area as `file_name`.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::CopyImage`] if the source is unreadable or the
    /// target cannot be written.
    pub async fn stage(
        &self,
        pool: &ImagePool,
        source_image: &str,
        file_name: &str,
    ) -> Result<(), StagingError> {
        let from_dir = Arc::clone(&pool.dir);
        let to_dir = Arc::clone(&self.dir);
        let image = source_image.to_owned();
        let target = file_name.to_owned();
        blocking(move || {
            from_dir
                .copy(&image, &to_dir, &target)
                .map(drop)
                .map_err(|source| StagingError::CopyImage {
                    source_image: image,
                    target,
                    source,
                })
        })
        .await
    }

    /// Names of the entries currently in the staging directory.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::ReadDirectory`] if the directory cannot be
    /// listed, or [`StagingError::NonUtf8Name`] if an entry name is not
    /// UTF-8.
    pub async fn file_names(&self) -> Result<BTreeSet<String>, StagingError> {
        let dir = Arc::clone(&self.dir);
        let path = self.path.clone();
        let names = blocking(move || {
            let entries = list_entries(&dir, &path)?;
            utf8_names(entries, &path)
        })
        .await?;
        Ok(names.into_iter().collect())
    }
}

/// The curated set of images every staged attachment is copied from.
#[derive(Debug, Clone)]
pub struct ImagePool {
    path: Utf8PathBuf,
    dir: Arc<Dir>,
    images: Vec<String>,
}

impl ImagePool {
    /// Opens a pool directory and indexes its regular files in name order.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError`] if the directory cannot be opened or listed,
    /// or [`StagingError::EmptyImagePool`] if it holds no files.
    pub fn open(path: &Utf8Path) -> Result<Self, StagingError> {
        let dir = open_dir(path)?;
        let files = list_entries(&dir, path)?
            .into_iter()
            .filter(|entry| !entry.is_dir);
        let images = utf8_names(files, path)?;
        if images.is_empty() {
            return Err(StagingError::EmptyImagePool {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            dir: Arc::new(dir),
            images,
        })
    }

    /// Path the pool was opened from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Image names in selection order.
    #[must_use]
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Picks images in turn, wrapping around the pool.
    #[must_use]
    pub fn round_robin(&self, index: usize) -> &str {
        index
            .checked_rem(self.images.len())
            .and_then(|slot| self.images.get(slot))
            .map_or("", String::as_str)
    }

    /// Picks an image uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.images.choose(rng).map_or("", String::as_str)
    }
}
