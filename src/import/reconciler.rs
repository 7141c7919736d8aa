use serde::{Deserialize, Serialize};

use crate::catalog::TemplateCatalog;
use crate::db::DatabaseError;
use crate::models::MessageTemplate;
use crate::resolution::Resolver;

use super::record::ImportRecord;
use super::ImportError;

/// What reconciling one record did to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportOutcome {
    Created,
    Changed,
    Same,
}

impl ImportOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Changed => "changed",
            Self::Same => "same",
        }
    }
}

/// A record that could not be reconciled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowFailure {
    /// 1-based position in the batch.
    pub row: usize,
    pub error: String,
}

/// Batch reconciliation totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: usize,
    pub changed: usize,
    pub same: usize,
    pub failures: Vec<RowFailure>,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.created + self.changed + self.same + self.failures.len()
    }

    fn record(&mut self, outcome: ImportOutcome) {
        match outcome {
            ImportOutcome::Created => self.created += 1,
            ImportOutcome::Changed => self.changed += 1,
            ImportOutcome::Same => self.same += 1,
        }
    }

    pub(crate) fn fail(&mut self, row: usize, error: &dyn std::fmt::Display) {
        tracing::warn!(row, error = %error, "Failed to import template row");
        self.failures.push(RowFailure {
            row,
            error: error.to_string(),
        });
    }

    pub(crate) fn log_totals(&self) {
        tracing::info!(
            created = self.created,
            changed = self.changed,
            same = self.same,
            failed = self.failures.len(),
            "Template import finished"
        );
    }
}

/// Create or update the catalog template matching `record`'s canonical key.
///
/// Only an exact key match counts as "the same template". A template
/// inserted by someone else between lookup and insert is treated as an
/// existing match rather than a failure.
pub fn reconcile<C, R>(
    catalog: &mut C,
    record: &R,
) -> Result<(MessageTemplate, ImportOutcome), ImportError>
where
    C: TemplateCatalog + ?Sized,
    R: ImportRecord + ?Sized,
{
    let key = record.key()?;
    // Content cells are checked up front so a bad one fails the row even
    // when the template already exists.
    record.priority()?;

    if let Some(existing) = Resolver::new(&*catalog).find_exact(&key)? {
        return merge_content(catalog, existing, record);
    }

    let template = record.to_template()?;
    match catalog.insert(&template) {
        Ok(()) => {
            tracing::info!(description = %key, "Created message template");
            Ok((template, ImportOutcome::Created))
        }
        Err(e) if e.is_duplicate_key() => {
            tracing::warn!(description = %key, "Template inserted concurrently, merging instead");
            let existing = Resolver::new(&*catalog).find_exact(&key)?.ok_or_else(|| {
                DatabaseError::NotFound {
                    entity_type: "MessageTemplate".into(),
                    id: key.description(),
                }
            })?;
            merge_content(catalog, existing, record)
        }
        Err(e) => Err(e.into()),
    }
}

/// Reconcile every record, collecting per-row failures instead of stopping.
pub fn reconcile_all<C, R>(catalog: &mut C, records: &[R]) -> ImportSummary
where
    C: TemplateCatalog + ?Sized,
    R: ImportRecord,
{
    let mut summary = ImportSummary::default();
    reconcile_numbered(
        catalog,
        records.iter().enumerate().map(|(idx, record)| (idx + 1, record)),
        &mut summary,
    );
    summary.log_totals();
    summary
}

/// Reconcile `(row, record)` pairs into `summary`, keeping the caller's row
/// numbers for failures.
pub(crate) fn reconcile_numbered<'r, C, R, I>(
    catalog: &mut C,
    records: I,
    summary: &mut ImportSummary,
) where
    C: TemplateCatalog + ?Sized,
    R: ImportRecord + 'r,
    I: IntoIterator<Item = (usize, &'r R)>,
{
    for (row, record) in records {
        match reconcile(catalog, record) {
            Ok((_, outcome)) => summary.record(outcome),
            Err(e) => summary.fail(row, &e),
        }
    }
}

fn merge_content<C, R>(
    catalog: &mut C,
    mut existing: MessageTemplate,
    record: &R,
) -> Result<(MessageTemplate, ImportOutcome), ImportError>
where
    C: TemplateCatalog + ?Sized,
    R: ImportRecord + ?Sized,
{
    let english = record.primary_text();
    let changed = english != existing.english
        || record.swahili() != existing.swahili
        || record.luo() != existing.luo;

    if !changed {
        return Ok((existing, ImportOutcome::Same));
    }

    existing.english = english.to_string();
    existing.swahili = record.swahili().to_string();
    existing.luo = record.luo().to_string();
    existing.modified = chrono::Local::now().naive_local();
    catalog.update_content(&existing)?;

    tracing::info!(description = %existing.key, "Updated message template text");
    Ok((existing, ImportOutcome::Changed))
}
