// args.rs - Command line arguments definition

use argh::FromArgs;

use crate::core::MAX_ROWS_BUFFER;

#[derive(FromArgs, Debug)]
/// csv-combiner - Merge CSV files on the columns they all share
pub struct Args {
    /// CSV files to merge (at least 2)
    #[argh(positional)]
    pub files: Vec<String>,

    /// rows buffered per output chunk (default: 1000)
    #[argh(option)]
    pub batch_size: Option<usize>,

    /// write the merged CSV to this file instead of stdout
    #[argh(option, short = 'o')]
    pub output: Option<String>,

    /// show a progress spinner on stderr
    #[argh(switch)]
    pub progress: bool,

    /// enable debug logging on stderr
    #[argh(switch, short = 'v')]
    pub verbose: bool,

    /// resolve and report headers without merging (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}

impl Args {
    /// Batch size from the command line, or the default when none was given
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(MAX_ROWS_BUFFER)
    }
}
