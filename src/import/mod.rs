//! Bulk template import — reconcile externally maintained message content
//! (spreadsheet exports) with the catalog.

pub mod record;
pub mod reconciler;
pub mod source;

pub use record::*;
pub use reconciler::*;
pub use source::*;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::resolution::MalformedQuery;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed record: {0}")]
    Malformed(#[from] MalformedQuery),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
