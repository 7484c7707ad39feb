// batch.rs - Bounded output batches and their serialized chunks

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::core::projection::ProjectedRow;
use crate::error::{MergeError, Result};

/// Rows waiting to be serialized; never grows past the configured batch size.
#[derive(Debug, Default)]
pub struct OutputBatch {
    rows: Vec<ProjectedRow>,
}

impl OutputBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, row: ProjectedRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize the batch, prefixed by `header` when given, consuming it.
    pub fn serialize(self, index: usize, header: Option<&[String]>) -> Result<Chunk> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        if let Some(header) = header {
            writer.write_record(header)?;
        }
        for row in &self.rows {
            writer.write_record(row.values())?;
        }

        let data = writer
            .into_inner()
            .map_err(|e| MergeError::Output(e.into_error()))?;

        Ok(Chunk {
            index,
            rows: self.rows.len(),
            has_header: header.is_some(),
            data,
        })
    }
}

/// One independently emitted fragment of the merged CSV document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    index: usize,
    rows: usize,
    has_header: bool,
    data: Vec<u8>,
}

impl Chunk {
    /// Position of this chunk in the run, starting at 0
    pub fn index(&self) -> usize {
        self.index
    }

    /// Data rows in this chunk, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
