// lib.rs - csv-combiner library root

//! # csv-combiner - Merge CSV files on the columns they all share
//!
//! Merges two or more CSV files whose column sets differ into one CSV document
//! holding only the columns present in every input, plus a `filename` column
//! naming the file each row came from.
//!
//! ## Features
//!
//! - **Ordered intersection**: common columns keep the first file's order
//! - **Streaming**: rows are emitted in bounded chunks, so memory does not grow with input size
//! - **Single header**: the header line is written once, at the start of the first chunk
//! - **Strict rows**: rows whose width disagrees with their file's header stop the run
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use csv_combiner::prelude::*;
//! use std::path::PathBuf;
//!
//! let files = vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")];
//! let common = resolve_common_headers(files.as_slice())?;
//!
//! let mut merger = StreamingMerger::new(files, common, MergeConfig::default());
//! for chunk in &mut merger {
//!     let chunk = chunk?;
//!     print!("{}", String::from_utf8_lossy(chunk.as_bytes()));
//! }
//! # Ok::<(), csv_combiner::MergeError>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod logging;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{combine_csvs, resolve_common_headers, resolve_headers};
    pub use crate::core::{Chunk, CommonHeaderSet, MergeConfig, MergeStats, StreamingMerger};
    pub use crate::data::CsvSource;
    pub use crate::error::MergeError;
    pub use crate::output::{open_sink, write_chunks};
}

// Re-export main types at the root level for convenience
pub use cli::{Args, ValidationResult};
pub use core::{Chunk, CommonHeaderSet, MergeConfig, StreamingMerger, MAX_ROWS_BUFFER};
pub use error::{MergeError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "csv-combiner v{} - Streaming merge of CSV files on common columns",
        VERSION
    )
}
