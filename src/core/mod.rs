// mod.rs - Core merge logic module

pub mod batch;
pub mod headers;
pub mod merger;
pub mod projection;

use std::io::Write;
use std::path::PathBuf;

use crate::error::Result;
use crate::output::write_chunks;

// Re-export main types for convenience
pub use batch::{Chunk, OutputBatch};
pub use headers::{
    intersect_ordered, resolve_common_headers, resolve_headers, CommonHeaderSet, FileHeader,
    HeaderIntersection, HeaderResolution, PROVENANCE_COLUMN,
};
pub use merger::{FileStats, MergeConfig, MergeStats, StreamingMerger, MAX_ROWS_BUFFER};
pub use projection::{ProjectedRow, Projection};

/// Resolve the common headers of `files`, then stream their merged rows into `sink`.
///
/// Chunks are written and flushed as they are produced; on failure whatever
/// was already written stays in `sink`.
pub fn combine_csvs<W: Write>(
    files: Vec<PathBuf>,
    config: MergeConfig,
    sink: &mut W,
) -> Result<MergeStats> {
    let common = resolve_common_headers(files.as_slice())?;
    let mut merger = StreamingMerger::new(files, common, config);
    write_chunks(&mut merger, sink, None)?;
    Ok(merger.into_stats())
}
