// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};
use crate::error::Result;

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        if self.output.is_none() {
            self.output = config.output;
        }

        if self.batch_size.is_none() {
            self.batch_size = config.batch_size;
        }

        // Flags: config can switch on, never off
        if !self.progress && config.progress.unwrap_or(false) {
            self.progress = true;
        }
        if !self.verbose && config.verbose.unwrap_or(false) {
            self.verbose = true;
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}
