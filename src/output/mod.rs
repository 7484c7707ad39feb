// mod.rs - Output sink and chunk streaming

use std::fs::{create_dir_all, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::core::Chunk;
use crate::error::{MergeError, Result};

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).map_err(MergeError::Output)?;
        }
    }
    Ok(())
}

/// Open the destination for merged output: `path`, or stdout when `None`.
pub fn open_sink(path: Option<&str>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let path = Path::new(path);
            ensure_parent_dir(path)?;
            let file = File::create(path).map_err(MergeError::Output)?;
            info!(output = %path.display(), "writing merged CSV to file");
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Spinner on stderr counting merged rows
pub fn row_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} rows merged ({per_sec}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Write each chunk to `sink` as soon as it is produced, flushing per chunk.
///
/// Stops at the first error; chunks written before it are not retracted.
pub fn write_chunks<I, W>(chunks: I, sink: &mut W, progress: Option<&ProgressBar>) -> Result<()>
where
    I: IntoIterator<Item = Result<Chunk>>,
    W: Write + ?Sized,
{
    for chunk in chunks {
        let chunk = chunk?;
        sink.write_all(chunk.as_bytes()).map_err(MergeError::Output)?;
        sink.flush().map_err(MergeError::Output)?;

        if let Some(pb) = progress {
            pb.inc(chunk.rows() as u64);
        }
    }
    Ok(())
}
