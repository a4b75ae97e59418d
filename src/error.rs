// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The snapshot could not be read; callers must not compute on a partial one.
    #[error("failed to read ledger: {0}")]
    Retrieval(String),

    #[error("category '{name}' is still used by {count} transaction(s)")]
    CategoryInUse { name: String, count: i64 },

    #[error("{what} '{key}' not found")]
    NotFound { what: &'static str, key: String },

    #[error("{what} '{name}' already exists")]
    Duplicate { what: &'static str, name: String },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
