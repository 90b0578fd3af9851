//! Command line tool that merges department reports into one slide deck.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use relay_cli::{generate_report, DirectoryArchive, FileUpload, GeneratedReport, ReportArchive};
use relay_core::ReportConfig;
use std::path::PathBuf;

/// Characters of the first item shown in the category summary.
const PREVIEW_CHARS: usize = 60;

/// Build a categorized PPTX report from .pptx, .xlsx, .pdf and .txt files.
#[derive(Parser, Debug)]
#[command(name = "relay-report")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input report files
    #[arg(required_unless_present = "history")]
    input: Vec<PathBuf>,

    /// Directory the deck is written to (default: current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file overriding the built-in taxonomy and texts
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum items per content slide
    #[arg(long)]
    cap: Option<usize>,

    /// Print the per-file processing log
    #[arg(long)]
    print_log: bool,

    /// List previously generated decks, newest first, and exit
    #[arg(long)]
    history: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let output_dir = args.output.clone().unwrap_or_else(|| PathBuf::from("."));
    let archive = DirectoryArchive::new(&output_dir);

    if args.history {
        return print_history(&archive);
    }

    let config = load_config(&args)?;
    let uploads: Vec<FileUpload> = args.input.iter().map(FileUpload::new).collect();

    let report = generate_report(&uploads, &config, Local::now().naive_local())
        .context("Failed to generate report")?;

    if args.print_log {
        for line in &report.logs {
            println!("{}", line);
        }
        println!();
    }

    let stored = archive
        .store(&report.bytes, &report.file_name)
        .with_context(|| format!("Failed to write report to {}", output_dir.display()))?;

    print_summary(&report, &config);
    println!("Written to: {}", stored.path.display());

    Ok(())
}

/// Load the configuration file if given, then apply command line overrides.
fn load_config(args: &Args) -> Result<ReportConfig> {
    let mut config = match &args.config {
        Some(path) => ReportConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ReportConfig::default(),
    };

    if let Some(cap) = args.cap {
        config = config.with_slide_cap(cap);
    }

    log::debug!(
        "Using {} categories, slide cap {}",
        config.categories.len(),
        config.slide_cap
    );
    Ok(config)
}

/// First characters of `text`, with an ellipsis when it was cut.
fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

fn print_summary(report: &GeneratedReport, config: &ReportConfig) {
    for bucket in report.buckets.non_empty() {
        println!(
            "{}  {} ({} items)",
            config.icon_for(&bucket.name),
            bucket.name,
            bucket.items.len()
        );
        if let Some(first) = bucket.items.first() {
            println!("    {}", preview(&first.text, PREVIEW_CHARS));
        }
    }

    println!(
        "{} slides, {} files read, {} items",
        report.stats.slide_count, report.stats.files_read, report.stats.total_items
    );
}

fn print_history(archive: &DirectoryArchive) -> Result<()> {
    let reports = archive
        .list()
        .with_context(|| format!("Failed to list {}", archive.root().display()))?;

    if reports.is_empty() {
        println!("No reports in {}", archive.root().display());
        return Ok(());
    }

    for report in reports {
        let modified: DateTime<Local> = report.modified.into();
        println!(
            "{}  {}  ({} bytes)",
            modified.format("%Y-%m-%d %H:%M"),
            report.name,
            report.size
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("短い", 60), "短い");
        assert_eq!(preview("あいうえおかきくけこ", 5), "あいうえお…");
        assert_eq!(preview("abcde", 5), "abcde");
    }

    #[test]
    fn test_args_history_needs_no_input() {
        let args = Args::try_parse_from(["relay-report", "--history"]).unwrap();
        assert!(args.history);
        assert!(args.input.is_empty());

        assert!(Args::try_parse_from(["relay-report"]).is_err());
    }

    #[test]
    fn test_cap_override() {
        let args = Args::try_parse_from(["relay-report", "a.txt", "--cap", "0"]).unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.slide_cap, 1);
    }
}
