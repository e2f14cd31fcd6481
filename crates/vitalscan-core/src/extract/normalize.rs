//! Typing and domain checks for raw captures.

use crate::models::field::{FieldSpec, FieldValue, ValueDomain};

use super::report::{FieldReport, RejectReason};

/// Normalize a regex capture: parse, convert units, check the domain.
pub(crate) fn from_text(spec: &FieldSpec, raw: &str, unit: Option<&str>) -> FieldReport {
    match &spec.domain {
        ValueDomain::Numeric { .. } => match parse_number(raw) {
            Some(n) => {
                let n = match &spec.unit_conversion {
                    Some(conversion) => conversion.convert(n, unit),
                    None => n,
                };
                check_number(spec, raw, n)
            }
            None => FieldReport::rejected(&spec.name, raw, RejectReason::Unparseable),
        },
        ValueDomain::Choice { .. } => check_choice(spec, raw),
    }
}

/// Normalize a CSV cell. Cells carry no unit, so no conversion applies.
pub(crate) fn from_cell(spec: &FieldSpec, raw: &str) -> FieldReport {
    let raw = raw.trim();
    if raw.is_empty() {
        return FieldReport::not_found(&spec.name);
    }
    match &spec.domain {
        ValueDomain::Numeric { .. } => match parse_number(raw) {
            Some(n) => check_number(spec, raw, n),
            None => FieldReport::rejected(&spec.name, raw, RejectReason::Unparseable),
        },
        ValueDomain::Choice { .. } => {
            // Numeric cells such as "1.0" name options by their encoding.
            let token = match raw.parse::<f64>() {
                Ok(n) if n.fract() == 0.0 && n >= 0.0 => format!("{}", n as i64),
                _ => raw.to_string(),
            };
            check_choice(spec, &token)
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn check_number(spec: &FieldSpec, raw: &str, n: f64) -> FieldReport {
    let value = FieldValue::Number(n);
    if spec.domain.contains(&value) {
        return FieldReport::found(&spec.name, value);
    }
    let (min, max) = match spec.domain {
        ValueDomain::Numeric { min, max } => (min, max),
        ValueDomain::Choice { .. } => (f64::NAN, f64::NAN),
    };
    FieldReport::rejected(&spec.name, raw, RejectReason::OutOfRange { value: n, min, max })
}

fn check_choice(spec: &FieldSpec, raw: &str) -> FieldReport {
    match spec.domain.canonical_choice(raw) {
        Some(option) => FieldReport::found(&spec.name, FieldValue::Choice(option)),
        None => FieldReport::rejected(&spec.name, raw, RejectReason::UnknownChoice),
    }
}
