//! pdfsim - pairwise PDF similarity reporter.
//!
//! Compares every PDF in a directory against each other (or against one
//! target document) and writes a CSV of text similarity percentages,
//! optionally with embedded-image similarity. This crate is CLI glue
//! only; all similarity computation lives in `pdfsim-backend`.

#![allow(
    clippy::cast_possible_truncation, // pair counts fit comfortably in u64
    clippy::needless_pass_by_value    // clap hands us owned values
)]

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pdfsim_backend::{CompareOptions, Comparer, MissingImagePolicy};
use pdfsim_core::{NoopProgress, PdfSimError, ProgressSink, ReportMode, ReportWriter, ResultRow};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "pdfsim",
    version,
    about = "Compare PDF files pairwise and report similarity percentages"
)]
struct Args {
    /// Directory to scan for PDF files
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Compare all PDF files with each other
    #[arg(short, long)]
    all: bool,

    /// Target PDF file to compare with all other PDF files
    #[arg(short, long, value_name = "PDF")]
    target: Option<PathBuf>,

    /// Output CSV file for the comparison results
    #[arg(short, long, default_value = "comparison_results.csv")]
    output: PathBuf,

    /// Also compute embedded-image similarity (SSIM best-match mean)
    #[arg(short, long)]
    images: bool,

    /// Leave the image column empty for pairs where a document has no
    /// embedded images, instead of aborting the run
    #[arg(long, requires = "images")]
    skip_missing_images: bool,

    /// Echo result rows to the console instead of showing a progress bar
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{} {e:#}", "error:".red().bold());
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mode = match (args.all, &args.target) {
        (true, Some(_)) => {
            return Err(PdfSimError::Configuration(
                "pass either --all or --target, not both".to_string(),
            )
            .into())
        }
        (false, None) => {
            return Err(PdfSimError::Configuration(
                "no mode selected: pass --all or --target <PDF>".to_string(),
            )
            .into())
        }
        (true, None) => ReportMode::AllPairs,
        (false, Some(_)) => ReportMode::Target,
    };

    let candidates = scan_directory(&args.directory)?;
    if candidates.is_empty() {
        return Err(PdfSimError::Configuration(format!(
            "no PDF files found in {}",
            args.directory.display()
        ))
        .into());
    }

    let options = CompareOptions {
        with_images: args.images,
        missing_images: if args.skip_missing_images {
            MissingImagePolicy::Skip
        } else {
            MissingImagePolicy::Fail
        },
    };

    let mut report = ReportWriter::create(&args.output, mode, args.images)
        .with_context(|| format!("cannot create report at {}", args.output.display()))?;

    let mut progress: Box<dyn ProgressSink> = if args.verbose {
        print_console_header(mode, args.images);
        Box::new(NoopProgress)
    } else {
        Box::new(BarProgress::default())
    };

    let verbose = args.verbose;
    let sink = |row: ResultRow| {
        report.write_row(&row)?;
        if verbose {
            print_console_row(&row);
        }
        Ok(())
    };

    let mut comparer = Comparer::new(options);
    match (mode, &args.target) {
        (ReportMode::AllPairs, _) => {
            comparer.compare_all(&candidates, progress.as_mut(), sink)?;
        }
        (ReportMode::Target, Some(target)) => {
            comparer.compare_with_target(target, &candidates, progress.as_mut(), sink)?;
        }
        (ReportMode::Target, None) => unreachable!("target mode implies a target argument"),
    }

    report.finish()?;
    println!(
        "{} comparison results exported to {}",
        "done:".green().bold(),
        args.output.display()
    );
    Ok(())
}

/// Candidate discovery: non-recursive scan for `.pdf` files, sorted for
/// a stable enumeration order.
fn scan_directory(directory: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(directory)
        .with_context(|| format!("cannot read directory {}", directory.display()))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            candidates.push(path);
        }
    }
    candidates.sort();
    Ok(candidates)
}

fn print_console_header(mode: ReportMode, with_images: bool) {
    println!("Comparison Results:");
    let headers = mode.headers(with_images);
    let mut line = format!("{:<30} {:<30} {:<20}", headers[0], headers[1], headers[2]);
    if with_images {
        line.push_str(&format!(" {:<20}", headers[3]));
    }
    println!("{line}");
    println!("{}", "-".repeat(if with_images { 100 } else { 80 }));
}

fn print_console_row(row: &ResultRow) {
    let mut line = format!(
        "{:<30} {:<30} {:<20}",
        row.doc_a.display(),
        row.doc_b.display(),
        format!("{:.2}", row.text_score)
    );
    if let Some(score) = row.image_score {
        line.push_str(&format!(" {:<20}", format!("{score:.2}")));
    }
    println!("{line}");
}

/// Progress sink backed by an indicatif bar.
#[derive(Default)]
struct BarProgress {
    bar: Option<ProgressBar>,
}

impl ProgressSink for BarProgress {
    fn start(&mut self, total: u64) {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pairs",
                )
                .expect("template is compile-time constant")
                .progress_chars("█▓▒░  "),
        );
        self.bar = Some(bar);
    }

    fn advance(&mut self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
