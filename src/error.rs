//! Error types shared by the product pipeline.
//!
//! Only `ClassifyError` and store initialization failures are meant to reach
//! callers as hard failures. Network conditions are absorbed by the loader
//! into a `DisplayState`.

use thiserror::Error;

/// A record could not be turned into a `Product`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifyError {
  #[error("unknown product type {found:?} for {name:?}, expected \"Equipment\" or \"Food\"")]
  UnknownType { name: String, found: String },

  #[error("row {row}: expected exactly 4 items, got {len}")]
  RowArity { row: usize, len: usize },

  #[error("row {row}: {field} {expected}")]
  RowField {
    row: usize,
    field: &'static str,
    expected: &'static str,
  },
}

impl ClassifyError {
  /// Attach the position of the failing element when classifying a batch.
  pub(crate) fn at_row(self, row: usize) -> Self {
    match self {
      Self::RowArity { len, .. } => Self::RowArity { row, len },
      Self::RowField {
        field, expected, ..
      } => Self::RowField {
        row,
        field,
        expected,
      },
      other => other,
    }
  }
}

/// Failure of the remote product endpoint.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("server responded with {status}")]
  Server { status: reqwest::StatusCode },

  #[error("product server unreachable: {0}")]
  Connectivity(#[source] reqwest::Error),

  #[error("malformed product response: {0}")]
  Decode(#[source] reqwest::Error),

  /// The host answered, but the exchange failed (redirect loop, protocol error).
  #[error("product request failed: {0}")]
  Request(#[source] reqwest::Error),
}

/// Failure of the local product cache.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("product cache is unavailable")]
  Unavailable,

  #[error("product cache query failed: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("product cache lock poisoned: {0}")]
  Lock(String),

  #[error("failed to create cache directory: {0}")]
  Io(#[from] std::io::Error),

  #[error("cache task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

/// Hard failure of a load or import.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error(transparent)]
  Classify(#[from] ClassifyError),

  #[error("load task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}
