// merger.rs - Streaming merge of input files into bounded CSV chunks

use std::mem;
use std::path::PathBuf;

use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::batch::{Chunk, OutputBatch};
use crate::core::headers::CommonHeaderSet;
use crate::core::projection::Projection;
use crate::data::CsvSource;
use crate::error::{MergeError, Result};

/// Default number of rows per emitted chunk.
pub const MAX_ROWS_BUFFER: usize = 1000;

/// Tunables for one merge run.
///
/// Only built through [`MergeConfig::new`] or `Default`, so `batch_size` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeConfig {
    batch_size: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            batch_size: MAX_ROWS_BUFFER,
        }
    }
}

impl MergeConfig {
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(MergeError::Usage("Batch size must be at least 1".to_string()));
        }
        Ok(Self { batch_size })
    }

    /// Rows buffered before a chunk is emitted
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

/// Rows merged from one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub name: String,
    pub rows: u64,
}

/// Counters for a merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub rows: u64,
    pub chunks: usize,
    pub files: Vec<FileStats>,
}

impl MergeStats {
    fn begin_file(&mut self, name: &str) {
        self.files.push(FileStats {
            name: name.to_string(),
            rows: 0,
        });
    }

    fn record_row(&mut self) {
        self.rows += 1;
        if let Some(file) = self.files.last_mut() {
            file.rows += 1;
        }
    }
}

enum MergeState {
    Init,
    Reading {
        index: usize,
        source: CsvSource,
        projection: Projection,
    },
    FlushFinal,
    Done,
    Failed,
}

/// Lazily merges files into CSV chunks.
///
/// Each `next()` reads rows until a batch fills (or input ends) and yields the
/// serialized chunk. The first chunk alone carries the header line. Batch
/// boundaries follow the run-wide row count, so a chunk may span two files.
/// After an error the iterator is exhausted.
pub struct StreamingMerger {
    files: Vec<PathBuf>,
    common: CommonHeaderSet,
    output_header: Vec<String>,
    config: MergeConfig,
    state: MergeState,
    batch: OutputBatch,
    record: StringRecord,
    header_sent: bool,
    stats: MergeStats,
}

impl StreamingMerger {
    pub fn new(files: Vec<PathBuf>, common: CommonHeaderSet, config: MergeConfig) -> Self {
        let output_header = common.output_header();
        Self {
            files,
            common,
            output_header,
            config,
            state: MergeState::Init,
            batch: OutputBatch::with_capacity(config.batch_size.min(MAX_ROWS_BUFFER)),
            record: StringRecord::new(),
            header_sent: false,
            stats: MergeStats::default(),
        }
    }

    pub fn common_headers(&self) -> &CommonHeaderSet {
        &self.common
    }

    pub fn output_header(&self) -> &[String] {
        &self.output_header
    }

    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    pub fn into_stats(self) -> MergeStats {
        self.stats
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, MergeState::Done)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, MergeState::Failed)
    }

    fn open_file(&mut self, index: usize) -> Result<MergeState> {
        let Some(path) = self.files.get(index) else {
            return Ok(MergeState::FlushFinal);
        };

        let source = CsvSource::open(path)?;
        let projection = Projection::new(&self.common, source.headers(), path)?;
        debug!(file = %path.display(), columns = source.headers().len(), "merging file");

        self.stats.begin_file(source.name());
        Ok(MergeState::Reading {
            index,
            source,
            projection,
        })
    }

    fn flush(&mut self) -> Result<Chunk> {
        let capacity = self.config.batch_size.min(MAX_ROWS_BUFFER);
        let batch = mem::replace(&mut self.batch, OutputBatch::with_capacity(capacity));
        let header = if self.header_sent {
            None
        } else {
            Some(self.output_header.as_slice())
        };

        let chunk = batch.serialize(self.stats.chunks, header)?;
        self.header_sent = true;
        self.stats.chunks += 1;
        debug!(
            chunk = chunk.index(),
            rows = chunk.rows(),
            total_rows = self.stats.rows,
            "emitting chunk"
        );
        Ok(chunk)
    }

    /// Run the state machine until a chunk is ready or the run ends.
    ///
    /// The state is parked as `Failed` while a step runs, so any `?` exit
    /// leaves the merger in its terminal failed state.
    fn advance(&mut self) -> Result<Option<Chunk>> {
        loop {
            match mem::replace(&mut self.state, MergeState::Failed) {
                MergeState::Init => {
                    debug!(
                        files = self.files.len(),
                        batch_size = self.config.batch_size,
                        "starting merge"
                    );
                    self.state = self.open_file(0)?;
                }
                MergeState::Reading {
                    index,
                    mut source,
                    projection,
                } => {
                    if !source.read_record(&mut self.record)? {
                        debug!(file = %source.path().display(), "finished file");
                        drop(source);
                        self.state = self.open_file(index + 1)?;
                        continue;
                    }

                    let row = projection.apply(&self.record, source.name());
                    self.batch.push(row);
                    self.stats.record_row();
                    self.state = MergeState::Reading {
                        index,
                        source,
                        projection,
                    };

                    if self.stats.rows % self.config.batch_size as u64 == 0 {
                        return self.flush().map(Some);
                    }
                }
                MergeState::FlushFinal => {
                    self.state = MergeState::Done;
                    info!(
                        files = self.files.len(),
                        rows = self.stats.rows,
                        "all input files merged"
                    );
                    // A run with no data rows still emits its header line.
                    if !self.batch.is_empty() || !self.header_sent {
                        return self.flush().map(Some);
                    }
                    return Ok(None);
                }
                MergeState::Done => {
                    self.state = MergeState::Done;
                    return Ok(None);
                }
                MergeState::Failed => return Ok(None),
            }
        }
    }
}

impl Iterator for StreamingMerger {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => {
                self.state = MergeState::Failed;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::headers::resolve_common_headers;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn write_csv(dir: &TempDir, name: &str, header: &str, rows: usize) -> PathBuf {
        let mut content = format!("{}\n", header);
        let width = header.split(',').count();
        for i in 0..rows {
            let fields: Vec<String> = (0..width).map(|c| format!("{}-{}", i, c)).collect();
            content.push_str(&fields.join(","));
            content.push('\n');
        }
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn merger_for(files: &[PathBuf], batch_size: usize) -> StreamingMerger {
        let common = resolve_common_headers(files).unwrap();
        StreamingMerger::new(
            files.to_vec(),
            common,
            MergeConfig::new(batch_size).unwrap(),
        )
    }

    fn collect_output(merger: &mut StreamingMerger) -> (Vec<Chunk>, String) {
        let chunks: Vec<Chunk> = merger.by_ref().map(|c| c.unwrap()).collect();
        let text = chunks
            .iter()
            .map(|c| std::str::from_utf8(c.as_bytes()).unwrap())
            .collect::<String>();
        (chunks, text)
    }

    #[test]
    fn test_two_files_with_partial_overlap() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "id,name,age\n1,Ann,30\n2,Bob,41\n3,Cid,25\n").unwrap();
        fs::write(&b, "id,name,city\n4,Dee,Rome\n5,Eve,Oslo\n").unwrap();

        let mut merger = merger_for(&[a, b], MAX_ROWS_BUFFER);
        let (chunks, text) = collect_output(&mut merger);

        assert_eq!(chunks.len(), 1);
        assert_eq!(
            text,
            "id,name,filename\n1,Ann,a.csv\n2,Bob,a.csv\n3,Cid,a.csv\n4,Dee,b.csv\n5,Eve,b.csv\n"
        );
        assert!(merger.is_done());
        assert_eq!(merger.stats().rows, 5);
        assert_eq!(merger.stats().files[0].rows, 3);
        assert_eq!(merger.stats().files[1].rows, 2);
    }

    #[test]
    fn test_batches_follow_run_wide_row_count() {
        let dir = tempdir().unwrap();
        let a = write_csv(&dir, "a.csv", "id,x", 1500);
        let b = write_csv(&dir, "b.csv", "x,id,y", 1000);

        let mut merger = merger_for(&[a, b], 1000);
        let (chunks, text) = collect_output(&mut merger);

        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks.iter().map(Chunk::rows).collect::<Vec<_>>(),
            vec![1000, 1000, 500]
        );
        assert!(chunks[0].has_header());
        assert!(!chunks[1].has_header());
        assert!(!chunks[2].has_header());

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2501);
        assert_eq!(lines[0], "id,x,filename");
        assert_eq!(lines.iter().filter(|l| **l == "id,x,filename").count(), 1);

        // Second chunk straddles the file boundary.
        let second = std::str::from_utf8(chunks[1].as_bytes()).unwrap();
        assert!(second.contains(",a.csv\n"));
        assert!(second.contains(",b.csv\n"));
        // b.csv columns are reordered to the first file's order.
        assert_eq!(lines[1501], "0-1,0-0,b.csv");
    }

    #[test]
    fn test_exact_multiple_emits_no_trailing_chunk() {
        let dir = tempdir().unwrap();
        let a = write_csv(&dir, "a.csv", "id", 2);
        let b = write_csv(&dir, "b.csv", "id", 2);

        let mut merger = merger_for(&[a, b], 2);
        let (chunks, text) = collect_output(&mut merger);

        assert_eq!(chunks.len(), 2);
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_disjoint_headers_emit_filename_only() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("left.csv");
        let b = dir.path().join("right.csv");
        fs::write(&a, "a,b\n1,2\n3,4\n").unwrap();
        fs::write(&b, "c\n5\n").unwrap();

        let mut merger = merger_for(&[a, b], MAX_ROWS_BUFFER);
        let (_, text) = collect_output(&mut merger);

        assert!(merger.common_headers().is_empty());
        assert_eq!(text, "filename\nleft.csv\nleft.csv\nright.csv\n");
    }

    #[test]
    fn test_header_only_inputs_still_emit_header() {
        let dir = tempdir().unwrap();
        let a = write_csv(&dir, "a.csv", "id,name", 0);
        let b = write_csv(&dir, "b.csv", "name,id", 0);

        let mut merger = merger_for(&[a, b], 10);
        let (chunks, text) = collect_output(&mut merger);

        assert_eq!(chunks.len(), 1);
        assert_eq!(text, "id,name,filename\n");
    }

    #[test]
    fn test_row_width_mismatch_stops_the_run() {
        let dir = tempdir().unwrap();
        let a = write_csv(&dir, "a.csv", "id,name", 1);
        let b = dir.path().join("b.csv");
        fs::write(&b, "id,name\n1,ok\n2\n3,never\n").unwrap();

        let mut merger = merger_for(&[a, b.clone()], 2);

        let first = merger.next().unwrap().unwrap();
        assert_eq!(first.rows(), 2);

        match merger.next() {
            Some(Err(MergeError::RowWidthMismatch {
                path,
                line,
                expected,
                found,
            })) => {
                assert_eq!(path, b);
                assert_eq!(line, 3);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected RowWidthMismatch, got {:?}", other),
        }

        assert!(merger.is_failed());
        assert!(merger.next().is_none());
    }

    #[test]
    fn test_file_removed_mid_run_is_unreadable() {
        let dir = tempdir().unwrap();
        let a = write_csv(&dir, "a.csv", "id", 1);
        let b = write_csv(&dir, "b.csv", "id", 1);

        let mut merger = merger_for(&[a, b.clone()], 1);
        assert!(merger.next().unwrap().is_ok());

        fs::remove_file(&b).unwrap();
        assert!(matches!(
            merger.next(),
            Some(Err(MergeError::FileUnreadable { .. }))
        ));
        assert!(merger.next().is_none());
    }

    #[test]
    fn test_repeated_runs_are_byte_identical() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "id,note\n1,\"x, y\"\n2,\"say \"\"hi\"\"\"\n").unwrap();
        fs::write(&b, "note,id\nplain,3\n").unwrap();
        let files = vec![a, b];

        let (_, first) = collect_output(&mut merger_for(&files, 1));
        let (_, second) = collect_output(&mut merger_for(&files, 1));
        assert_eq!(first, second);
        assert_eq!(
            first,
            "id,note,filename\n1,\"x, y\",a.csv\n2,\"say \"\"hi\"\"\",a.csv\n3,plain,b.csv\n"
        );
    }

    #[test]
    fn test_provenance_uses_base_name() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        let a = dir.path().join("nested").join("inner.csv");
        fs::write(&a, "id\n1\n").unwrap();
        let b = write_csv(&dir, "outer.csv", "id", 0);

        let (_, text) = collect_output(&mut merger_for(&[a, b], 5));
        assert_eq!(text, "id,filename\n1,inner.csv\n");
        assert!(!text.contains("nested"));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        assert!(matches!(MergeConfig::new(0), Err(MergeError::Usage(_))));
        assert_eq!(MergeConfig::default().batch_size(), 1000);
        assert_eq!(MergeConfig::new(1).unwrap().batch_size(), 1);
    }

    #[test]
    fn test_batch_size_of_one_emits_a_chunk_per_row() {
        let dir = tempdir().unwrap();
        let a = write_csv(&dir, "a.csv", "id", 2);
        let b = write_csv(&dir, "b.csv", "id", 1);

        let mut merger = merger_for(&[a, b], 1);
        let (chunks, text) = collect_output(&mut merger);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.rows() == 1));
        assert_eq!(text, "id,filename\n0-0,a.csv\n1-0,a.csv\n0-0,b.csv\n");
    }
}
