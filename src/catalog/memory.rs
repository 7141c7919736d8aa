use std::collections::HashMap;

use crate::db::DatabaseError;
use crate::models::enums::SendBase;
use crate::models::{MessageTemplate, TemplateKey};

use super::TemplateCatalog;

/// In-memory catalog. Templates are kept in insertion order with two
/// indexes over them: the full key and the `(send_base, send_offset)` pair.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    templates: Vec<MessageTemplate>,
    by_key: HashMap<TemplateKey, usize>,
    by_offset: HashMap<(SendBase, i32), Vec<usize>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from templates, rejecting the first duplicate key.
    pub fn from_templates(
        templates: impl IntoIterator<Item = MessageTemplate>,
    ) -> Result<Self, DatabaseError> {
        let mut catalog = Self::new();
        for template in templates {
            catalog.insert(&template)?;
        }
        Ok(catalog)
    }
}

impl TemplateCatalog for MemoryCatalog {
    fn insert(&mut self, template: &MessageTemplate) -> Result<(), DatabaseError> {
        let key = template.key;
        if self.by_key.contains_key(&key) {
            return Err(DatabaseError::DuplicateKey {
                description: key.description(),
            });
        }

        let idx = self.templates.len();
        self.templates.push(template.clone());
        self.by_key.insert(key, idx);
        self.by_offset
            .entry((key.send_base, key.send_offset))
            .or_default()
            .push(idx);
        Ok(())
    }

    fn exact_lookup(&self, key: &TemplateKey) -> Result<Option<MessageTemplate>, DatabaseError> {
        Ok(self.by_key.get(key).map(|&idx| self.templates[idx].clone()))
    }

    fn filter_by_offset(
        &self,
        send_base: SendBase,
        send_offset: i32,
    ) -> Result<Vec<MessageTemplate>, DatabaseError> {
        Ok(self
            .by_offset
            .get(&(send_base, send_offset))
            .map(|indexes| indexes.iter().map(|&idx| self.templates[idx].clone()).collect())
            .unwrap_or_default())
    }

    fn update_content(&mut self, template: &MessageTemplate) -> Result<(), DatabaseError> {
        let idx = *self
            .by_key
            .get(&template.key)
            .ok_or_else(|| DatabaseError::NotFound {
                entity_type: "MessageTemplate".into(),
                id: template.key.description(),
            })?;

        let stored = &mut self.templates[idx];
        stored.english = template.english.clone();
        stored.swahili = template.swahili.clone();
        stored.luo = template.luo.clone();
        stored.comment = template.comment.clone();
        stored.priority = template.priority;
        stored.modified = template.modified;
        Ok(())
    }

    fn len(&self) -> Result<usize, DatabaseError> {
        Ok(self.templates.len())
    }

    fn all(&self) -> Result<Vec<MessageTemplate>, DatabaseError> {
        Ok(self.templates.clone())
    }
}
