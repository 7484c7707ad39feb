// source.rs - CSV input file reader

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Reader, ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{MergeError, Result};

/// Column names read from the first row of a file, in file order.
pub type Header = Vec<String>;

/// Base name of an input path, used as the provenance value of its rows.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    // Width is checked per record so mismatches carry the file's own header count.
    builder.has_headers(true).flexible(true);
    builder
}

/// An opened input file positioned after its header row.
pub struct CsvSource {
    path: PathBuf,
    name: String,
    reader: Reader<File>,
    headers: Header,
}

impl CsvSource {
    /// Open `path` and read its header row
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| MergeError::unreadable(path, e))?;
        let mut reader = reader_builder().from_reader(file);

        let record = reader.headers().map_err(|e| {
            if e.is_io_error() {
                MergeError::unreadable(path, e)
            } else {
                MergeError::malformed(path, e.to_string())
            }
        })?;

        if record.is_empty() {
            return Err(MergeError::malformed(path, "file is empty (no header line)"));
        }

        let headers: Header = record.iter().map(str::to_string).collect();
        debug!(file = %path.display(), columns = headers.len(), "read header");

        Ok(Self {
            path: path.to_path_buf(),
            name: source_name(path),
            reader,
            headers,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name written into the provenance column
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn into_headers(self) -> Header {
        self.headers
    }

    /// Read the next data row into `record`.
    ///
    /// Returns `Ok(false)` at end of file. Rows whose field count differs from
    /// the header fail with [`MergeError::RowWidthMismatch`]; nothing is padded.
    pub fn read_record(&mut self, record: &mut StringRecord) -> Result<bool> {
        let more = self
            .reader
            .read_record(record)
            .map_err(|e| MergeError::ReadFailed {
                path: self.path.clone(),
                line: e.position().map(|p| p.line()).unwrap_or(0),
                source: e,
            })?;

        if more && record.len() != self.headers.len() {
            return Err(MergeError::RowWidthMismatch {
                path: self.path.clone(),
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: self.headers.len(),
                found: record.len(),
            });
        }

        Ok(more)
    }
}

/// Read only the header row of `path`; the file is closed before returning.
pub fn read_headers(path: &Path) -> Result<Header> {
    Ok(CsvSource::open(path)?.into_headers())
}
