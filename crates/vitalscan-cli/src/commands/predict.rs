//! Predict command - fill the form and run a domain's classifier.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use serde_json::json;
use tracing::info;

use vitalscan_core::models::profile::Domain;
use vitalscan_core::predict::{bmi, bmi_category, load_classifier, AdviceLevel};
use vitalscan_core::{advice_for, classify, FormState};

use super::extract::{extract_file, print_summary};
use super::load_config;

/// Arguments for the predict command.
#[derive(Args)]
pub struct PredictArgs {
    /// Predictor to run
    #[arg(short, long)]
    domain: Domain,

    /// Lab report (CSV, PDF or image) to pre-fill the form from
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Set a field by hand, e.g. --set age=52 (repeatable, applied after the report)
    #[arg(short = 's', long = "set", value_name = "FIELD=VALUE")]
    values: Vec<String>,

    /// Skip OCR when reading the report
    #[arg(long)]
    text_only: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: PredictArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let profile = config.profile_for(args.domain)?;
    let mut form = FormState::new(profile);

    if let Some(path) = &args.report {
        let report = extract_file(path, form.profile(), &config, args.text_only)?;
        print_summary(&report);
        form.apply(&report.result);
    }

    for assignment in &args.values {
        let (field, value) = assignment
            .split_once('=')
            .with_context(|| format!("Expected FIELD=VALUE, got '{}'", assignment))?;
        form.set_raw(field.trim(), value)?;
    }

    let model_path = config.model_path(args.domain);
    let classifier = load_classifier(&config.classifier, args.domain)
        .with_context(|| format!("Failed to load classifier from {}", model_path.display()))?;
    info!("Loaded {} classifier", args.domain);

    let prediction = classify(&form, &classifier)?;
    let advice = advice_for(args.domain, &prediction.label);
    let bmi = body_mass_index(&form, args.domain);

    if args.json {
        let values: serde_json::Map<String, serde_json::Value> = form
            .values()
            .into_iter()
            .map(|(name, value)| Ok((name.to_string(), serde_json::to_value(value)?)))
            .collect::<Result<_, serde_json::Error>>()?;
        let output = json!({
            "domain": args.domain,
            "values": values,
            "prediction": prediction,
            "advice": advice,
            "bmi": bmi.map(|b| json!({ "value": b, "category": bmi_category(b) })),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", style(args.domain.title()).bold());
    for (name, value) in form.values() {
        let marker = if form.is_uploaded(name) { "*" } else { " " };
        println!("  {} {:<14} {}", marker, name, value);
    }
    println!();

    println!(
        "Prediction: {} ({:.1}%)",
        style(&prediction.label).bold(),
        prediction.confidence * 100.0
    );
    let headline = match advice.level {
        AdviceLevel::Success => style(advice.headline.as_str()).green(),
        AdviceLevel::Info => style(advice.headline.as_str()).blue(),
        AdviceLevel::Warning => style(advice.headline.as_str()).yellow(),
        AdviceLevel::Error => style(advice.headline.as_str()).red(),
    };
    println!("{}", headline);
    for recommendation in &advice.recommendations {
        println!("  - {}", recommendation);
    }

    if let Some(b) = bmi {
        println!();
        println!("BMI: {:.1} ({})", b, bmi_category(b).label());
    }

    Ok(())
}

/// BMI is only reported for blood pressure, where weight and height are inputs.
fn body_mass_index(form: &FormState, domain: Domain) -> Option<f64> {
    if domain != Domain::BloodPressure {
        return None;
    }
    let weight = form.value("weight")?.as_f64()?;
    let height = form.value("height")?.as_f64()?;
    bmi(weight, height)
}
