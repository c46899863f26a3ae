//! ExtSort CLI - sort a directory tree into per-extension folders

use clap::Parser;
use extsort::config::{CliArgs, LogFormat, OutputFormat, SortConfig};
use extsort::core::{SortEngine, SortReport};
use extsort::error::{Result, SortError};
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    init_logging(&args);

    match run(&args) {
        Ok(report) if report.is_success() => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            report_failure(&e, &mut std::io::stdout(), &mut std::io::stderr());
            std::process::exit(1);
        }
    }
}

/// A missing source gets the short message on stdout; anything else goes to stderr
fn report_failure(err: &SortError, out: &mut impl Write, err_out: &mut impl Write) {
    // Nothing sensible to do if the terminal is gone
    let _ = match err {
        SortError::NotFound(_) => writeln!(out, "No such directory."),
        other => writeln!(err_out, "Error: {}", other),
    };
}

/// RUST_LOG wins; otherwise -v/-vv raise the default level
fn init_logging(args: &CliArgs) {
    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match args.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(args: &CliArgs) -> Result<SortReport> {
    let config = SortConfig::from_cli(args)?;

    if args.verbose > 0 {
        print_config(&config);
    }

    let engine = SortEngine::new(config.clone());
    let report = engine.run()?;

    match args.output_format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| SortError::config(format!("Cannot serialize report: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Text if !args.quiet => {
            println!("Files copied into '{}'.", config.target.display());
            report.print_summary();
        }
        OutputFormat::Text => {}
    }

    Ok(report)
}

fn print_config(config: &SortConfig) {
    eprintln!("=== Configuration ===");
    eprintln!("Source:      {:?}", config.source);
    eprintln!("Target:      {:?}", config.target);
    eprintln!("Threads:     {}", config.effective_threads());
    eprintln!("Queue:       {}", config.effective_queue_size());
    eprintln!("Buffer:      {}", humansize::format_size(config.buffer_size as u64, humansize::BINARY));
    eprintln!("Preserve:    {}", config.preserve);
    eprintln!("Xattrs:      {}", config.preserve && config.preserve_xattrs);
    match &config.no_extension_dir {
        Some(name) => eprintln!("No-ext dir:  {:?}", name),
        None => eprintln!("No-ext dir:  (target root)"),
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_source_message_goes_to_stdout() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        report_failure(&SortError::NotFound(PathBuf::from("nope")), &mut out, &mut err);

        assert_eq!(out, b"No such directory.\n");
        assert!(err.is_empty());
    }

    #[test]
    fn test_other_errors_go_to_stderr() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        report_failure(&SortError::config("bad buffer"), &mut out, &mut err);

        assert!(out.is_empty());
        assert!(String::from_utf8(err).unwrap().starts_with("Error: "));
    }
}
