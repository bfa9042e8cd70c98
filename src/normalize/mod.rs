// src/normalize/mod.rs

pub mod categories;
pub mod clean;

pub use categories::CATEGORY_LABELS;
pub use clean::clean_cell;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

use crate::parse::RawTable;
use crate::record::ChampionRecord;

/// Informational columns each championship row carries before `Category`.
pub const ORG_COLUMNS: usize = 5;

/// What to do when the page has more keyword tables than labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentPolicy {
    /// Keep the first N tables, drop the rest (footnotes, legends).
    #[default]
    Truncate,
    /// Any count other than N is an error.
    Strict,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected {expected} championship tables, found {found}")]
pub struct AlignmentError {
    pub expected: usize,
    pub found: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
    #[error("{category} table row {row} has {found} columns, expected at most {expected}")]
    ColumnCount {
        category: String,
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Pair each table with its label, or fail before anything is labelled.
pub fn align_tables<'a>(
    tables: Vec<RawTable>,
    labels: &[&'a str],
    policy: AlignmentPolicy,
) -> Result<Vec<(&'a str, RawTable)>, AlignmentError> {
    let found = tables.len();
    let expected = labels.len();
    let too_few = found < expected;
    let mismatch = policy == AlignmentPolicy::Strict && found != expected;
    if too_few || mismatch {
        return Err(AlignmentError { expected, found });
    }
    if found > expected {
        warn!(
            dropped = found - expected,
            "discarding trailing tables past the last weight class"
        );
    }
    Ok(labels.iter().copied().zip(tables).collect())
}

/// Turns matched raw tables into canonical records.
#[derive(Debug, Clone)]
pub struct Normalizer {
    labels: Vec<&'static str>,
    policy: AlignmentPolicy,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(AlignmentPolicy::default())
    }
}

impl Normalizer {
    pub fn new(policy: AlignmentPolicy) -> Self {
        Self {
            labels: CATEGORY_LABELS.to_vec(),
            policy,
        }
    }

    pub fn with_labels(mut self, labels: &[&'static str]) -> Self {
        self.labels = labels.to_vec();
        self
    }

    #[instrument(level = "info", skip(self, tables), fields(tables = tables.len()))]
    pub fn normalize(&self, tables: Vec<RawTable>) -> Result<Vec<ChampionRecord>, TransformError> {
        let aligned = align_tables(tables, &self.labels, self.policy)?;

        let mut records = Vec::new();
        let mut leaked_headers = 0usize;
        for (category, table) in aligned {
            let before = records.len();
            for (row_idx, row) in table.rows.into_iter().enumerate() {
                let cells = shape_row(row, category, row_idx)?;
                let record = ChampionRecord::from_cells(cells, category);
                if record.wba == "WBA" {
                    leaked_headers += 1;
                    continue;
                }
                records.push(record);
            }
            trace!(category, rows = records.len() - before, "labelled table");
        }

        debug!(
            records = records.len(),
            leaked_headers, "normalized championship rows"
        );
        Ok(records)
    }
}

/// Clean each cell and fit the row to the five organization columns.
fn shape_row(
    row: Vec<String>,
    category: &str,
    row_idx: usize,
) -> Result<[String; ORG_COLUMNS], TransformError> {
    if row.len() > ORG_COLUMNS {
        return Err(TransformError::ColumnCount {
            category: category.to_string(),
            row: row_idx,
            found: row.len(),
            expected: ORG_COLUMNS,
        });
    }
    let mut cells: [String; ORG_COLUMNS] = Default::default();
    for (slot, raw) in cells.iter_mut().zip(row) {
        *slot = clean_cell(&raw);
    }
    Ok(cells)
}
