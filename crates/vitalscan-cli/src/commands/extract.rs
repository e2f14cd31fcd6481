//! Extract command - pull field values out of a single lab report.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use vitalscan_core::models::profile::{Domain, DomainProfile};
use vitalscan_core::{
    create_engine, DocumentKind, ExtractionReport, FieldOutcome, ReportExtractor, Upload, VitalConfig,
};
use vitalscan_core::extract::RejectReason;

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (CSV, PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Predictor whose fields to extract
    #[arg(short, long)]
    domain: Domain,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Skip OCR and use only CSV cells or the PDF text layer
    #[arg(long)]
    text_only: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Full JSON report
    Json,
    /// Extracted values as a one-row CSV
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let profile = config.profile_for(args.domain)?;

    let report = extract_file(&args.input, &profile, &config, args.text_only)?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Csv => format_csv(&report, &profile)?,
        OutputFormat::Text => format_text(&report, &profile),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    print_summary(&report);

    Ok(())
}

/// Run one file through the extractor. Shared with `predict --report`.
pub fn extract_file(
    input: &Path,
    profile: &DomainProfile,
    config: &VitalConfig,
    text_only: bool,
) -> anyhow::Result<ExtractionReport> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    info!("Processing file: {}", input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);

    pb.set_message("Reading file...");
    let upload = Upload::from_path(input)?;
    debug!("Detected {:?} upload", upload.kind);

    let mut extractor = ReportExtractor::new().with_pdf_config(config.pdf.clone());
    if upload.kind != DocumentKind::Csv && !text_only {
        pb.set_message("Loading OCR models...");
        match create_engine(&config.ocr) {
            Ok(recognizer) => extractor = extractor.with_recognizer(recognizer),
            Err(e) => warn!(
                "OCR unavailable ({}); images and scanned PDFs will yield no values",
                e
            ),
        }
    }

    pb.set_message(format!("Extracting {} fields...", profile.name()));
    let report = extractor.extract(&upload, profile);
    pb.finish_and_clear();

    Ok(report)
}

/// Status line on stderr so stdout stays machine-readable.
pub fn print_summary(report: &ExtractionReport) {
    if report.has_values() {
        eprintln!("{} {}", style("✓").green(), report.message());
    } else {
        eprintln!("{} {}", style("⚠").yellow(), report.message());
    }

    for field in report.rejected() {
        if let FieldOutcome::Rejected { raw, reason } = &field.outcome {
            eprintln!(
                "  {} {} = {} ({})",
                style("-").dim(),
                field.field,
                raw,
                describe(reason)
            );
        }
    }
}

fn describe(reason: &RejectReason) -> String {
    match reason {
        RejectReason::Unparseable => "not a number".to_string(),
        RejectReason::OutOfRange { value, min, max } => {
            format!("{} outside {}-{}", value, min, max)
        }
        RejectReason::UnknownChoice => "unknown option".to_string(),
    }
}

fn format_csv(report: &ExtractionReport, profile: &DomainProfile) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let names: Vec<&str> = profile
        .fields()
        .iter()
        .map(|f| f.name.as_str())
        .filter(|name| report.result.contains(name))
        .collect();
    wtr.write_record(&names)?;

    let values: Vec<String> = names
        .iter()
        .filter_map(|name| report.result.get(name))
        .map(|v| v.to_string())
        .collect();
    wtr.write_record(&values)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &ExtractionReport, profile: &DomainProfile) -> String {
    let mut output = String::new();

    let title = profile.domain().map(|d| d.title()).unwrap_or(profile.name());
    output.push_str(&format!("Profile: {}\n", title));
    if let Some(source) = report.source {
        output.push_str(&format!("Source: {:?}\n", source));
    }
    output.push('\n');

    let width = profile.fields().iter().map(|f| f.name.len()).max().unwrap_or(0);
    for field in &report.fields {
        let shown = match &field.outcome {
            FieldOutcome::Found { value } => value.to_string(),
            FieldOutcome::NotFound => "-".to_string(),
            FieldOutcome::Rejected { raw, reason } => {
                format!("- (rejected {}: {})", raw, describe(reason))
            }
        };
        output.push_str(&format!("  {:<width$}  {}\n", field.field, shown, width = width));
    }

    output
}
