//! Free-text pattern matching over OCR or PDF text.

use tracing::debug;

use crate::models::profile::DomainProfile;

use super::normalize;
use super::report::FieldReport;

/// Run every field pattern over `text`. The first match per field wins,
/// and a rejected match does not fall through to later matches.
///
/// A match whose `prefix` group participated names a different field
/// (e.g. "Fasting Glucose" for `glucose`) and is skipped.
pub fn match_text(text: &str, profile: &DomainProfile) -> Vec<FieldReport> {
    profile
        .fields()
        .iter()
        .map(|spec| {
            let Some(caps) = spec
                .pattern
                .captures_iter(text)
                .find(|caps| caps.name("prefix").is_none())
            else {
                return FieldReport::not_found(&spec.name);
            };
            let Some(value) = caps.name("value") else {
                return FieldReport::not_found(&spec.name);
            };
            let unit = caps.name("unit").map(|m| m.as_str());
            debug!(
                "{}: matched '{}' (value '{}', unit {:?})",
                spec.name,
                caps.get(0).map(|m| m.as_str()).unwrap_or_default(),
                value.as_str(),
                unit
            );
            normalize::from_text(spec, value.as_str(), unit)
        })
        .collect()
}
