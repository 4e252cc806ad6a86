//! Backends command - show the registry and availability reasons.

use clap::Args;
use console::style;

use mizan_backends::build_registry;

use super::load_config;

/// Arguments for the backends command.
#[derive(Args)]
pub struct BackendsArgs {}

pub async fn run(_args: BackendsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registry = build_registry(&config);

    println!("{}", style("Registered backends:").bold());
    for name in registry.available_names() {
        println!("  {} {}", style("✓").green(), name);
    }

    for entry in registry.unavailable() {
        println!(
            "  {} {} - {}",
            style("✗").red(),
            entry.name,
            style(&entry.reason).dim()
        );
    }

    if registry.is_empty() {
        println!("  {} no backends available", style("!").yellow());
    }

    Ok(())
}
