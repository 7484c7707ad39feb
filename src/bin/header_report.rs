// header_report.rs - Standalone report of the headers a merge would keep and drop

use std::io;
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};
use serde::Serialize;

use csv_combiner::cli::validate_paths;
use csv_combiner::core::{resolve_headers, HeaderResolution};
use csv_combiner::logging::init_logging;
use csv_combiner::{MergeError, VERSION};

#[derive(Debug, Serialize)]
struct HeaderReport {
    generated: String,
    version: &'static str,
    #[serde(flatten)]
    resolution: HeaderResolution,
    output_header: Vec<String>,
}

fn print_text(report: &HeaderReport) {
    println!("# Generated: {}", report.generated);
    println!("# csv-combiner v{}", report.version);
    println!();

    for file in &report.resolution.files {
        println!("{} ({})", file.name, file.path.display());
        println!("  columns: {}", file.headers.join(", "));
        if file.dropped.is_empty() {
            println!("  dropped: -");
        } else {
            println!("  dropped: {}", file.dropped.join(", "));
        }
    }

    println!();
    let common = &report.resolution.common;
    if common.is_empty() {
        println!("common headers: (none)");
    } else {
        println!("common headers ({}): {}", common.len(), common.names().join(", "));
    }
    println!("output header: {}", report.output_header.join(","));
}

fn run(files: Vec<String>, json: bool) -> Result<(), MergeError> {
    let paths: Vec<PathBuf> = validate_paths(files.as_slice())?;
    let resolution = resolve_headers(paths.as_slice())?;

    let report = HeaderReport {
        generated: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        version: VERSION,
        output_header: resolution.output_header(),
        resolution,
    };

    if json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| MergeError::Output(io::Error::from(e)))?;
        println!("{}", text);
    } else {
        print_text(&report);
    }
    Ok(())
}

fn main() {
    let matches = Command::new("header_report")
        .version(VERSION)
        .about("Report per-file headers and the common header set of CSV files")
        .arg(
            Arg::new("files")
                .value_name("FILE")
                .help("CSV files to inspect (at least 2)")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the report as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging on stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    let files: Vec<String> = matches
        .get_many::<String>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if let Err(e) = run(files, matches.get_flag("json")) {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(e.exit_code());
    }
}
