//! Automated-message template engine for maternal/HIV-care SMS messaging.
//!
//! - [`catalog`]: templates keyed by canonical description, in memory or SQLite.
//! - [`resolution`]: pick the closest template for a participant's parameters.
//! - [`import`]: reconcile spreadsheet exports with the catalog.

pub mod catalog;
pub mod config;
pub mod db;
pub mod import;
pub mod models;
pub mod render;
pub mod resolution;

pub use catalog::{MemoryCatalog, SqliteCatalog, TemplateCatalog};
pub use import::{reconcile, ImportOutcome, ImportRecord};
pub use models::{MessageTemplate, TemplateKey};
pub use resolution::{Resolution, Resolver};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. Honors `RUST_LOG`, falling back
/// to [`config::default_log_filter`]. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);
}
