//! Error types for fixture generation.
//!
//! Every failure aborts the run. These enums only classify what went wrong;
//! nothing in the pipeline inspects them to retry or compensate.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::ports::{FixtureStoreError, PasswordHashError};

/// Errors raised while touching the staging area or the image pool.
#[derive(Debug, Error)]
pub enum StagingError {
    /// A directory could not be opened. The staging directory is never
    /// created by the generator, so a missing directory lands here.
    #[error("failed to open directory '{path}': {source}")]
    OpenDirectory {
        /// Directory that failed to open.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Directory entries could not be enumerated.
    #[error("failed to list directory '{path}': {source}")]
    ReadDirectory {
        /// Directory being listed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A stale entry could not be removed from the staging directory.
    #[error("failed to remove staged entry '{name}': {source}")]
    RemoveEntry {
        /// Entry name relative to the staging directory.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A pool image could not be copied into the staging directory.
    #[error("failed to stage '{source_image}' as '{target}': {source}")]
    CopyImage {
        /// Image name within the pool.
        source_image: String,
        /// Staged file name.
        target: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The image pool directory holds no files to stage from.
    #[error("image pool at '{path}' contains no files")]
    EmptyImagePool {
        /// Pool directory.
        path: Utf8PathBuf,
    },

    /// An entry name is not valid UTF-8.
    #[error("directory '{path}' contains a non UTF-8 entry name")]
    NonUtf8Name {
        /// Directory containing the entry.
        path: Utf8PathBuf,
    },

    /// A blocking filesystem task panicked or was cancelled.
    #[error("filesystem task failed: {message}")]
    BackgroundTask {
        /// Join error description.
        message: String,
    },
}

/// Errors raised by synthetic value generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// A unique viewer e-mail could not be drawn within the retry budget.
    #[error("failed to generate a unique viewer e-mail after {max_attempts} attempts")]
    UniqueEmailExhausted {
        /// Number of attempts made before giving up.
        max_attempts: usize,
    },

    /// Products need a category but none were loaded.
    #[error("no categories available to assign products to")]
    NoCategories,
}

/// Errors that abort a seeding run.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Staging directory or image pool failure.
    #[error("staging error: {0}")]
    Staging(#[from] StagingError),
    /// The store rejected a read or write.
    #[error("store error: {0}")]
    Store(#[from] FixtureStoreError),
    /// The seller password could not be hashed.
    #[error("password hashing error: {0}")]
    PasswordHash(#[from] PasswordHashError),
    /// Synthetic values could not be generated.
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn open_directory_error_names_the_path() {
        let err = StagingError::OpenDirectory {
            path: Utf8PathBuf::from("temp"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "failed to open directory 'temp': missing");
    }

    #[test]
    fn copy_error_names_source_and_target() {
        let err = StagingError::CopyImage {
            source_image: "sofa.png".to_owned(),
            target: "abc.png".to_owned(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "failed to stage 'sofa.png' as 'abc.png': gone");
    }

    #[test]
    fn seed_error_wraps_store_errors() {
        let err = SeedError::from(FixtureStoreError::constraint("duplicate slug"));
        assert_eq!(
            err.to_string(),
            "store error: fixture store constraint violated: duplicate slug"
        );
    }

    #[test]
    fn generation_error_formats_attempts() {
        let err = GenerationError::UniqueEmailExhausted { max_attempts: 100 };
        assert_eq!(
            err.to_string(),
            "failed to generate a unique viewer e-mail after 100 attempts"
        );
    }

    #[test]
    fn generation_error_formats_missing_categories() {
        assert_eq!(
            GenerationError::NoCategories.to_string(),
            "no categories available to assign products to"
        );
    }
}
