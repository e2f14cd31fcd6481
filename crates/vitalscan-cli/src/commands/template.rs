//! Template command - write a CSV the extractor will accept in full.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use vitalscan_core::csv_template;
use vitalscan_core::models::profile::Domain;

use super::load_config;

/// Arguments for the template command.
#[derive(Args)]
pub struct TemplateArgs {
    /// Predictor whose fields the template lists
    #[arg(short, long)]
    domain: Domain,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: TemplateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let profile = config.profile_for(args.domain)?;
    let template = csv_template(&profile)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &template)?;
            eprintln!(
                "{} Template written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => print!("{}", template),
    }

    Ok(())
}
