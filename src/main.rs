// main.rs - CLI entry point

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use csv_combiner::cli::Config;
use csv_combiner::logging::init_logging;
use csv_combiner::output::row_spinner;
use csv_combiner::prelude::*;
use tracing::{debug, info};

fn main() {
    let args: Args = argh::from_env();

    match run_main(args) {
        Ok(()) => {}
        // Downstream stopped reading; nothing left to report.
        Err(e) if e.is_broken_pipe() => {}
        Err(e) => {
            eprintln!("❌ ERROR: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn run_main(mut args: Args) -> Result<(), MergeError> {
    // Handle generate config first
    if args.generate_config {
        Config::write_sample(io::stdout().lock())?;
        eprintln!("💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    init_logging(args.verbose);

    // Argument count and readability are checked before any merge work
    let validation = validate_args(&args)?;

    if args.dry_run {
        return run_dry_run(&validation.files);
    }

    let total_start = Instant::now();
    let common = resolve_common_headers(validation.files.as_slice())?;

    let mut sink = open_sink(args.output.as_deref())?;
    let progress = args.progress.then(row_spinner);
    let mut merger = StreamingMerger::new(validation.files, common, validation.merge_config);

    let result = write_chunks(&mut merger, &mut sink, progress.as_ref());
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    result?;

    let stats = merger.stats();
    for file in &stats.files {
        debug!(file = %file.name, rows = file.rows, "file merged");
    }
    info!(
        rows = stats.rows,
        chunks = stats.chunks,
        elapsed_ms = total_start.elapsed().as_millis() as u64,
        "merge complete"
    );
    Ok(())
}

fn run_dry_run(files: &[PathBuf]) -> Result<(), MergeError> {
    let resolution = resolve_headers(files)?;

    for file in &resolution.files {
        if file.dropped.is_empty() {
            eprintln!("📋 {}: {} columns", file.name, file.headers.len());
        } else {
            eprintln!(
                "📋 {}: {} columns (drops: {})",
                file.name,
                file.headers.len(),
                file.dropped.join(", ")
            );
        }
    }

    if resolution.common.is_empty() {
        eprintln!("⚠️  No common columns; output would hold only the filename column");
    } else {
        eprintln!(
            "🔗 Common headers ({}): {}",
            resolution.common.len(),
            resolution.common.names().join(", ")
        );
    }
    eprintln!("📄 Output header: {}", resolution.output_header().join(","));
    eprintln!("✅ Dry run completed successfully");
    Ok(())
}
