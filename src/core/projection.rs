// projection.rs - Row projection onto the common header set

use std::path::Path;

use csv::StringRecord;

use crate::core::headers::{CommonHeaderSet, PROVENANCE_COLUMN};
use crate::error::{MergeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    /// Index into the source file's own record
    Field(usize),
    /// The source file's base name
    Source,
}

/// Maps one file's column layout onto the output layout.
#[derive(Debug, Clone)]
pub struct Projection {
    columns: Vec<Column>,
}

impl Projection {
    /// Build the projection for a file with header `file_headers`.
    ///
    /// Every common name must exist in `file_headers`; repeated names resolve
    /// to their first occurrence.
    pub fn new(common: &CommonHeaderSet, file_headers: &[String], path: &Path) -> Result<Self> {
        let mut columns = Vec::with_capacity(common.len() + 1);

        for name in common.names() {
            if name == PROVENANCE_COLUMN {
                columns.push(Column::Source);
                continue;
            }
            let index = file_headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| {
                    MergeError::malformed(
                        path,
                        format!("common column '{}' is missing from the header", name),
                    )
                })?;
            columns.push(Column::Field(index));
        }

        if !common.contains(PROVENANCE_COLUMN) {
            columns.push(Column::Source);
        }

        Ok(Self { columns })
    }

    /// Number of output fields per row
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn apply(&self, record: &StringRecord, source: &str) -> ProjectedRow {
        let values = self
            .columns
            .iter()
            .map(|column| match column {
                Column::Field(index) => record.get(*index).unwrap_or_default().to_string(),
                Column::Source => source.to_string(),
            })
            .collect();
        ProjectedRow { values }
    }
}

/// A data row restricted to the common columns plus its provenance value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRow {
    values: Vec<String>,
}

impl ProjectedRow {
    pub fn values(&self) -> &[String] {
        &self.values
    }
}
