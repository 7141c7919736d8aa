//! Template catalog — storage of message templates keyed by their
//! canonical 6-part description.
//!
//! Two backends share the [`TemplateCatalog`] contract:
//! - [`MemoryCatalog`]: process-local, indexed by `(send_base, send_offset)`.
//! - [`SqliteCatalog`]: persisted, uniqueness enforced by the schema.
//!
//! Both return templates sharing an anchor+offset in insertion order, which
//! is what makes cascade tie-breaks deterministic.

mod memory;
mod sqlite;

pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;

use crate::db::DatabaseError;
use crate::models::enums::SendBase;
use crate::models::{MessageTemplate, TemplateKey};

pub trait TemplateCatalog {
    /// Add a new template. Fails with `DatabaseError::DuplicateKey` if the
    /// key is already taken.
    fn insert(&mut self, template: &MessageTemplate) -> Result<(), DatabaseError>;

    /// Template with exactly this key, if any.
    fn exact_lookup(&self, key: &TemplateKey) -> Result<Option<MessageTemplate>, DatabaseError>;

    /// Every template for this anchor and offset, in insertion order.
    fn filter_by_offset(
        &self,
        send_base: SendBase,
        send_offset: i32,
    ) -> Result<Vec<MessageTemplate>, DatabaseError>;

    /// Overwrite content fields of the template stored under `template.key`.
    fn update_content(&mut self, template: &MessageTemplate) -> Result<(), DatabaseError>;

    fn len(&self) -> Result<usize, DatabaseError>;

    fn is_empty(&self) -> Result<bool, DatabaseError> {
        Ok(self.len()? == 0)
    }

    /// All templates in insertion order.
    fn all(&self) -> Result<Vec<MessageTemplate>, DatabaseError>;
}
