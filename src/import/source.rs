//! Readers for exported template spreadsheets.

use std::io::Read;
use std::path::Path;

use crate::catalog::TemplateCatalog;

use super::reconciler::{reconcile_numbered, ImportSummary, RowFailure};
use super::record::TemplateRow;
use super::ImportError;

/// Rows read from a CSV export. Rows that could not be decoded are kept as
/// failures so the rest of the file still imports.
#[derive(Debug, Clone, Default)]
pub struct CsvRows {
    /// Decoded rows with their 1-based position among the data rows.
    pub rows: Vec<(usize, TemplateRow)>,
    pub failures: Vec<RowFailure>,
}

impl CsvRows {
    pub fn into_records(self) -> Vec<TemplateRow> {
        self.rows.into_iter().map(|(_, row)| row).collect()
    }

    /// Reconcile the decoded rows into `catalog`. The summary lists decode
    /// and reconcile failures together, in file order.
    pub fn reconcile_into<C: TemplateCatalog + ?Sized>(&self, catalog: &mut C) -> ImportSummary {
        let mut summary = ImportSummary {
            failures: self.failures.clone(),
            ..Default::default()
        };
        reconcile_numbered(
            catalog,
            self.rows.iter().map(|(row, record)| (*row, record)),
            &mut summary,
        );
        summary.failures.sort_by_key(|f| f.row);
        summary.log_totals();
        summary
    }
}

/// Read template rows from CSV with a header line. Only I/O errors fail the
/// whole read.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<CsvRows, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let mut batch = CsvRows::default();
    for (idx, row) in reader.deserialize::<TemplateRow>().enumerate() {
        match row {
            Ok(row) => batch.rows.push((idx + 1, row)),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(row = idx + 1, error = %e, "Could not decode CSV row");
                batch.failures.push(RowFailure {
                    row: idx + 1,
                    error: ImportError::from(e).to_string(),
                });
            }
        }
    }
    Ok(batch)
}

pub fn read_csv_file(path: &Path) -> Result<CsvRows, ImportError> {
    let file = std::fs::File::open(path)?;
    read_csv_rows(file)
}

/// Parse a JSON array of template rows.
pub fn load_json_rows(json: &str) -> Result<Vec<TemplateRow>, ImportError> {
    Ok(serde_json::from_str(json)?)
}

/// Read a CSV export and reconcile every row into `catalog`.
pub fn import_csv_file<C: TemplateCatalog + ?Sized>(
    catalog: &mut C,
    path: &Path,
) -> Result<ImportSummary, ImportError> {
    tracing::info!(file = %path.display(), "Importing message templates");
    Ok(read_csv_file(path)?.reconcile_into(catalog))
}
