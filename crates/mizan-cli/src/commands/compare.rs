//! Compare command - run several OCR backends on one document and rank them.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use mizan_backends::build_registry;
use mizan_core::models::report::{ComparisonReport, ComparisonSummary};
use mizan_core::ComparisonOrchestrator;

use super::load_config;

/// Arguments for the compare command.
#[derive(Args)]
pub struct CompareArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Page indices to process (0-based, default: all pages)
    #[arg(short, long, num_args = 1..)]
    pages: Option<Vec<usize>>,

    /// Backend names to compare (default: all available)
    #[arg(short, long, num_args = 1..)]
    backends: Option<Vec<String>>,

    /// Run backends one after another instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Write the full comparison report JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: CompareArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let registry = build_registry(&config);
    for entry in registry.unavailable() {
        eprintln!(
            "{} Backend {} unavailable: {}",
            style("!").yellow(),
            style(&entry.name).bold(),
            entry.reason
        );
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Comparing backends on {}", args.input.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));

    let orchestrator = ComparisonOrchestrator::new(&config);
    let report = orchestrator.compare(
        &registry,
        &args.input,
        args.pages.as_deref(),
        args.backends.as_deref(),
        !args.sequential,
    )?;

    spinner.finish_and_clear();
    display_report(&report);

    if let Some(output_path) = &args.output {
        fs::write(output_path, serde_json::to_string_pretty(&report)?)?;
        println!(
            "\n{} Full report written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!(
            "\n{} Pass --output to save the full report as JSON",
            style("ℹ").blue()
        );
    }

    debug!(
        "comparison finished in {:.2}s",
        report.comparison_metadata.total_comparison_time
    );

    Ok(())
}

fn display_report(report: &ComparisonReport) {
    println!();
    println!("{}", style("OCR BACKEND COMPARISON").bold());
    println!(
        "  {} backends on {} ({})",
        report.comparison_metadata.backends_compared.len(),
        report.comparison_metadata.pdf_path,
        if report.comparison_metadata.parallel_execution {
            "parallel"
        } else {
            "sequential"
        }
    );

    for (name, outcome) in &report.individual_results {
        if let Some(error) = outcome.error() {
            println!(
                "  {} {} failed: {}",
                style("✗").red(),
                style(name).bold(),
                error
            );
        }
    }

    display_summary(&report.comparison_summary);
}

fn display_summary(summary: &ComparisonSummary) {
    if summary.performance_ranking.is_empty() {
        println!("\n{} No backend produced a usable result", style("!").yellow());
        return;
    }

    println!("\n{}", style("Overall performance:").bold());
    for entry in &summary.performance_ranking {
        println!(
            "  {}. {} - score {:.3} (confidence {:.3}, {:.1} words/s)",
            entry.rank,
            style(&entry.backend).cyan(),
            entry.performance_score,
            entry.confidence,
            entry.speed
        );
    }

    println!("\n{}", style("Accuracy (by confidence):").bold());
    for entry in &summary.accuracy_ranking {
        println!(
            "  {}. {} - {:.3} ({} words)",
            entry.rank,
            style(&entry.backend).cyan(),
            entry.confidence,
            entry.total_words
        );
    }

    println!("\n{}", style("Speed:").bold());
    for entry in &summary.speed_ranking {
        println!(
            "  {}. {} - {:.2} words/s ({:.2}s)",
            entry.rank,
            style(&entry.backend).cyan(),
            entry.words_per_second,
            entry.processing_time
        );
    }

    let stats = &summary.statistics;
    println!("\n{}", style("Statistics:").bold());
    println!(
        "  best overall: {}",
        stats.best_overall.as_deref().unwrap_or("-")
    );
    println!(
        "  most accurate: {}",
        stats.best_accuracy.as_deref().unwrap_or("-")
    );
    println!(
        "  fastest: {}",
        stats.fastest_backend.as_deref().unwrap_or("-")
    );
    println!("  average confidence: {:.3}", stats.avg_confidence);
    println!("  average words extracted: {:.0}", stats.avg_words_extracted);
}
