//! Product image storage.
//!
//! Images live on the local filesystem under a single upload root:
//!
//! ```text
//! <upload_root>/images/<stamp>-<original file name>
//! ```
//!
//! Products store a root-relative reference such as
//! `/uploads/images/1700000000000000000-mug.png`, where [`PUBLIC_PREFIX`] maps
//! to the upload root and is served statically.
//!
//! Deleting an image is best effort. A reference is only ever deleted when its
//! canonical path lies strictly inside the canonical upload root, so a crafted
//! reference (`/uploads/../Cargo.toml`, `/etc/passwd`, a symlink out of the
//! root) can never remove files elsewhere. Refusals and failures are logged and
//! reported as a [`Discard`] outcome, never as an error.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use thiserror::Error;

use crate::models::product::has_image_reference;

/// URL prefix under which the upload root is exposed.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Subdirectory of the upload root holding product images.
pub const IMAGES_DIR: &str = "images";

/// Errors that abort an image write.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The uploaded file name has no usable base name.
    #[error("invalid image file name: {0:?}")]
    InvalidFilename(String),

    /// Filesystem operation failed.
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a best-effort image deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discard {
    /// The reference was empty or the "no image" sentinel.
    NoImage,
    /// The file was deleted.
    Removed(PathBuf),
    /// The reference resolves outside the upload root and was left alone.
    OutsideRoot(PathBuf),
    /// The file could not be resolved or deleted.
    Failed(PathBuf),
}

/// Filesystem-backed image store rooted at the upload directory.
#[derive(Debug)]
pub struct ImageStore {
    root: PathBuf,
    last_stamp: AtomicI64,
}

impl ImageStore {
    /// Create a store rooted at `root`. Nothing is created on disk yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            last_stamp: AtomicI64::new(0),
        }
    }

    /// The upload root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory new images are written to.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// Create the images directory (and the root) if missing.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Io` if the directory cannot be created.
    pub async fn ensure_dirs(&self) -> Result<(), ImageError> {
        let dir = self.images_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| ImageError::Io {
                action: "create directory",
                path: dir,
                source,
            })
    }

    /// Nanosecond timestamp, strictly greater than any previously returned.
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        let previous = self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now.max(previous.saturating_add(1))
    }

    /// Build a fresh blob name `<stamp>-<base name>` for an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::InvalidFilename` if `original` has no base name.
    pub fn blob_name(&self, original: &str) -> Result<String, ImageError> {
        let base = original
            .rsplit(['/', '\\'])
            .next()
            .filter(|base| !base.is_empty() && *base != "." && *base != "..")
            .ok_or_else(|| ImageError::InvalidFilename(original.to_owned()))?;

        Ok(format!("{}-{base}", self.next_stamp()))
    }

    /// Persist uploaded bytes and return the new image reference.
    ///
    /// # Errors
    ///
    /// Returns `ImageError` if the name is unusable or the write fails. Nothing
    /// should be written to the row store in that case.
    pub async fn store(&self, original: &str, bytes: &[u8]) -> Result<String, ImageError> {
        let name = self.blob_name(original)?;
        self.write_blob(&name, bytes).await
    }

    /// Delete the old image (best effort), then store the new one.
    ///
    /// The upload name is checked before anything is deleted, so a rejected
    /// name leaves the current image in place.
    ///
    /// # Errors
    ///
    /// Returns `ImageError` if the name is unusable or the new image cannot be
    /// stored.
    pub async fn replace(
        &self,
        current: &str,
        original: &str,
        bytes: &[u8],
    ) -> Result<String, ImageError> {
        let name = self.blob_name(original)?;
        self.discard(current).await;
        self.write_blob(&name, bytes).await
    }

    async fn write_blob(&self, name: &str, bytes: &[u8]) -> Result<String, ImageError> {
        self.ensure_dirs().await?;

        let path = self.images_dir().join(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| ImageError::Io {
                action: "write",
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Stored image");
        Ok(format!("{PUBLIC_PREFIX}/{IMAGES_DIR}/{name}"))
    }

    /// Map a reference to its path under the upload root, without touching disk.
    ///
    /// Returns `None` if the reference is not under [`PUBLIC_PREFIX`].
    #[must_use]
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let relative = Path::new(reference.trim_start_matches('/'));
        let prefix = PUBLIC_PREFIX.trim_start_matches('/');
        relative
            .strip_prefix(prefix)
            .ok()
            .map(|rest| self.root.join(rest))
    }

    /// Delete the image behind `reference` if it is safely inside the upload root.
    pub async fn discard(&self, reference: &str) -> Discard {
        if !has_image_reference(reference) {
            return Discard::NoImage;
        }

        let Some(candidate) = self.resolve(reference) else {
            tracing::warn!(reference, "Refusing to delete image outside the upload root");
            return Discard::OutsideRoot(PathBuf::from(reference));
        };

        let canonical = (
            tokio::fs::canonicalize(&self.root).await,
            tokio::fs::canonicalize(&candidate).await,
        );
        let (root, path) = match canonical {
            (Ok(root), Ok(path)) => (root, path),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(
                    path = %candidate.display(),
                    error = %e,
                    "Failed to resolve image for deletion"
                );
                return Discard::Failed(candidate);
            }
        };

        if path == root || !path.starts_with(&root) {
            tracing::warn!(
                reference,
                path = %path.display(),
                "Refusing to delete image outside the upload root"
            );
            return Discard::OutsideRoot(path);
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Deleted image");
                Discard::Removed(path)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to delete image");
                Discard::Failed(path)
            }
        }
    }
}
