//! Column-name matching over tabular uploads.

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::error::Result;
use crate::models::field::normalize_header;
use crate::models::profile::DomainProfile;

use super::normalize;
use super::report::{ExtractionReport, ExtractionStatus, FieldReport, SourceKind};

/// Match CSV headers against the profile and read the first data row.
///
/// No column is accepted unless at least `min_matched_columns` headers name
/// distinct fields.
pub fn extract_table(bytes: &[u8], profile: &DomainProfile) -> Result<ExtractionReport> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();

    // (column index, field index), first column in file order wins.
    let mut matched: Vec<(usize, usize)> = Vec::new();
    for (column, header) in headers.iter().enumerate() {
        let header = normalize_header(header);
        let Some(field_idx) = profile.fields().iter().position(|f| f.matches_alias(&header)) else {
            continue;
        };
        if matched.iter().any(|&(_, f)| f == field_idx) {
            debug!("Column '{}' duplicates an already matched field, skipping", header);
            continue;
        }
        debug!("Column '{}' -> {}", header, profile.fields()[field_idx].name);
        matched.push((column, field_idx));
    }

    let required = profile.min_matched_columns();
    if matched.len() < required {
        debug!(
            "Only {} of {} required columns recognized",
            matched.len(),
            required
        );
        let fields = profile
            .fields()
            .iter()
            .map(|f| FieldReport::not_found(&f.name))
            .collect();
        let mut report = ExtractionReport::from_fields(fields, SourceKind::Csv);
        report.status = ExtractionStatus::BelowThreshold {
            matched: matched.len(),
            required,
        };
        return Ok(report);
    }

    let first_row = reader.records().next().transpose()?;

    let fields = profile
        .fields()
        .iter()
        .enumerate()
        .map(|(field_idx, spec)| {
            let cell = matched
                .iter()
                .find(|&&(_, f)| f == field_idx)
                .and_then(|&(column, _)| first_row.as_ref().and_then(|row| row.get(column)));
            match cell {
                Some(raw) => normalize::from_cell(spec, raw),
                None => FieldReport::not_found(&spec.name),
            }
        })
        .collect();

    Ok(ExtractionReport::from_fields(fields, SourceKind::Csv))
}
