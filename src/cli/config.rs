// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::{MergeError, Result};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    // Output
    pub output: Option<String>,
    pub batch_size: Option<usize>,

    // Flags
    pub progress: Option<bool>,
    pub verbose: Option<bool>,
    pub dry_run: Option<bool>,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MergeError::Config(e.to_string()))
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            MergeError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::parse(&content).map_err(|e| {
            MergeError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        info!(config = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# csv-combiner.toml - Configuration file for csv-combiner
# Command line arguments will override these settings

# =============================================================================
# OUTPUT
# =============================================================================

# Write the merged CSV to this file instead of stdout
# output = "merged.csv"

# Rows buffered before a chunk is written (bounds memory use)
batch_size = 1000

# =============================================================================
# FLAGS
# =============================================================================

# Show a progress spinner on stderr
progress = false

# Enable debug logging on stderr
verbose = false

# Resolve and report headers without merging
dry_run = false
"#
        .to_string()
    }

    /// Write the sample configuration to `out`, surfacing write failures as output errors
    pub fn write_sample<W: Write>(mut out: W) -> Result<()> {
        writeln!(out, "{}", Self::generate_sample()).map_err(MergeError::Output)?;
        out.flush().map_err(MergeError::Output)
    }
}
