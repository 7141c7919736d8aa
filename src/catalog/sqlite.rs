use std::path::Path;

use rusqlite::Connection;

use crate::db::{self, repository, DatabaseError};
use crate::models::enums::SendBase;
use crate::models::{MessageTemplate, TemplateKey};

use super::TemplateCatalog;

/// Catalog persisted in the `message_templates` table.
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Open (or create) a catalog database on disk and run migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        tracing::info!(path = %path.display(), "Opening template catalog");
        Ok(Self {
            conn: db::open_database(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: db::open_memory_database()?,
        })
    }

    /// Wrap a connection whose schema is already migrated.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl TemplateCatalog for SqliteCatalog {
    fn insert(&mut self, template: &MessageTemplate) -> Result<(), DatabaseError> {
        repository::insert_message_template(&self.conn, template)
    }

    fn exact_lookup(&self, key: &TemplateKey) -> Result<Option<MessageTemplate>, DatabaseError> {
        repository::get_message_template_by_key(&self.conn, key)
    }

    fn filter_by_offset(
        &self,
        send_base: SendBase,
        send_offset: i32,
    ) -> Result<Vec<MessageTemplate>, DatabaseError> {
        repository::get_message_templates_by_offset(&self.conn, send_base, send_offset)
    }

    fn update_content(&mut self, template: &MessageTemplate) -> Result<(), DatabaseError> {
        repository::update_message_template_content(&self.conn, template)
    }

    fn len(&self) -> Result<usize, DatabaseError> {
        let count = repository::count_message_templates(&self.conn)?;
        Ok(count as usize)
    }

    fn all(&self) -> Result<Vec<MessageTemplate>, DatabaseError> {
        repository::list_message_templates(&self.conn)
    }
}
