// mod.rs - Input data module

pub mod source;

// Re-export main types for convenience
pub use source::{read_headers, source_name, CsvSource, Header};
