// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::PathBuf;

use acerto_domain::DomainError;
use acerto_persistence::PersistenceError;
use thiserror::Error;

/// Errors surfaced by the `acerto` command line.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Cannot access {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("This command needs a store: pass --database or set ACERTO_DATABASE")]
    DatabaseRequired,

    /// The snapshot failed validation and was not imported.
    #[error("Snapshot is not valid: {}", .errors.join("; "))]
    InvalidSnapshot { errors: Vec<String> },
}

impl CliError {
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
