//! Repository layer — entity-scoped database operations.

mod message_template;

pub use message_template::*;
