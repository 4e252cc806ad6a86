//! Extract command - run a single backend over one document.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use mizan_backends::build_registry;
use mizan_core::models::report::DocumentResult;
use mizan_core::{DocumentAggregator, OcrBackend};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Backend to use
    #[arg(short, long, default_value = "smart")]
    backend: String,

    /// Page indices to process (0-based, default: all pages)
    #[arg(short, long, num_args = 1..)]
    pages: Option<Vec<usize>>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON document result
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let registry = build_registry(&config);
    let backend = registry.get(&args.backend).ok_or_else(|| {
        let reason = registry
            .unavailable()
            .iter()
            .find(|entry| entry.name == args.backend)
            .map(|entry| entry.reason.clone())
            .unwrap_or_else(|| {
                format!("unknown backend (available: {})", registry.available_names().join(", "))
            });
        anyhow::anyhow!("Backend '{}' cannot run: {}", args.backend, reason)
    })?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    spinner.set_message(format!(
        "Extracting {} with {}",
        args.input.display(),
        args.backend
    ));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));

    let report = backend.extract(&args.input, args.pages.as_deref(), config.pdf.render_dpi)?;
    let result = DocumentAggregator::new(config.analysis.clone()).aggregate_report(report);

    spinner.finish_and_clear();

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&result)?,
        OutputFormat::Text => format_text(&result),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_text(result: &DocumentResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Backend: {}\n", result.backend_name));
    output.push_str(&format!("Pages: {}\n", result.total_pages));
    output.push_str(&format!("Words: {}\n", result.total_words));
    output.push_str(&format!("Confidence: {:.3}\n", result.overall_confidence));
    output.push_str(&format!(
        "Document type: {} ({:.2})\n",
        result.document_type, result.type_confidence
    ));
    output.push_str(&format!("Article references: {}\n", result.article_count));
    output.push_str(&format!("Contains dates: {}\n", result.contains_dates));

    let failed: Vec<_> = result.pages.iter().filter(|p| p.error.is_some()).collect();
    if !failed.is_empty() {
        output.push_str("\nFailed pages:\n");
        for page in failed {
            output.push_str(&format!(
                "  - page {}: {}\n",
                page.page_index,
                page.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    let preview: String = result.full_text.chars().take(200).collect();
    if !preview.is_empty() {
        output.push_str(&format!("\nText preview:\n{}\n", preview));
    }

    output
}
