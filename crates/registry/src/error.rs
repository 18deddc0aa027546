// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry error taxonomy.

use thiserror::Error;
use wh_storage::StorageError;

/// Errors surfaced by the component and component-group registries.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("component `{0}` not found")]
    ComponentNotFound(String),

    #[error("component group `{0}` not found")]
    ComponentGroupNotFound(String),

    #[error("empty {0} identifier")]
    InvalidUid(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl RegistryError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::ComponentNotFound(_) | RegistryError::ComponentGroupNotFound(_)
        )
    }
}

/// Reject empty or whitespace-only identifiers.
pub(crate) fn require_uid(uid: &str, what: &'static str) -> Result<(), RegistryError> {
    if uid.trim().is_empty() {
        return Err(RegistryError::InvalidUid(what));
    }
    Ok(())
}
