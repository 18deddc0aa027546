// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON document storage under a typed directory tree.
//!
//! Documents live at `(segment, …, filename)` below a root directory, e.g.
//! `Components/lamp.1/settings.json`. Writes go through a temp file and a
//! rename so a crash never leaves a half-written document behind.

use glob::Pattern;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid glob pattern `{0}`")]
    Pattern(String),

    #[error("invalid path segment `{0}`")]
    Segment(String),
}

/// Disk-backed store of JSON documents.
#[derive(Debug, Clone)]
pub struct ValueStorage {
    root: PathBuf,
}

impl ValueStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read and deserialize a document. Not-found is `Ok(None)`, never an
    /// error; a present but malformed document is an error.
    pub fn try_read<T: DeserializeOwned>(&self, path: &[&str]) -> Result<Option<T>, StorageError> {
        let full = self.resolve(path)?;
        let bytes = match fs::read(&full) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Serialize and write a document, creating parent directories as
    /// needed. The write is atomic: temp file in the target directory, then
    /// rename over the destination.
    pub fn write<T: Serialize + ?Sized>(&self, value: &T, path: &[&str]) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        let parent = full.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)?;

        let tmp = full.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, &full)?;
        Ok(())
    }

    /// Immediate sub-directory names under `path` matching `pattern`.
    ///
    /// A missing parent directory yields an empty list.
    pub fn enumerate_directories(
        &self,
        pattern: &str,
        path: &[&str],
    ) -> Result<Vec<String>, StorageError> {
        let pattern =
            Pattern::new(pattern).map_err(|_| StorageError::Pattern(pattern.to_string()))?;
        let full = self.resolve(path)?;

        let entries = match fs::read_dir(&full) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if pattern.matches(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Recursively delete the directory at `path`. Missing is a no-op.
    pub fn delete_directory(&self, path: &[&str]) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        match fs::remove_dir_all(&full) {
            Ok(()) => {
                debug!(path = %full.display(), "deleted directory tree");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Join segments below the root, rejecting traversal and separators.
    fn resolve(&self, path: &[&str]) -> Result<PathBuf, StorageError> {
        let mut full = self.root.clone();
        for segment in path {
            if segment.is_empty()
                || *segment == ".."
                || segment.contains('/')
                || segment.contains('\\')
            {
                return Err(StorageError::Segment(segment.to_string()));
            }
            full.push(segment);
        }
        Ok(full)
    }
}

#[cfg(test)]
#[path = "value_store_tests.rs"]
mod tests;
