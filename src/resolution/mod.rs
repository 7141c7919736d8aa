//! Template resolution — map a participant's messaging parameters to the
//! closest template in a catalog.

mod cascade;
mod query;

pub use cascade::*;
pub use query::*;

use thiserror::Error;

use crate::db::DatabaseError;

/// Query tuples share the template key shape.
pub type ResolutionQuery = crate::models::TemplateKey;

#[derive(Error, Debug, PartialEq)]
pub enum MalformedQuery {
    #[error("Description {description:?} has {found} parts, expected 6")]
    WrongPartCount { description: String, found: usize },

    #[error("Unknown {field} value: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Flag {field} must be Y or N, got {value:?}")]
    InvalidFlag { field: &'static str, value: String },

    #[error("Send offset is not an integer: {0:?}")]
    InvalidOffset(String),

    #[error("Priority is not an integer: {0:?}")]
    InvalidPriority(String),
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Malformed query: {0}")]
    Malformed(#[from] MalformedQuery),

    #[error("Catalog error: {0}")]
    Database(#[from] DatabaseError),
}
