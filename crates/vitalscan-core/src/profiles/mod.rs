//! Built-in domain profiles.
//!
//! Each predictor is a table of field definitions. Field order is the
//! classifier's feature order.

mod blood_pressure;
mod diabetes;
mod fever;
mod thyroid;

use std::collections::BTreeMap;

use lazy_static::lazy_static;

use crate::models::field::{FieldSpecDef, FieldValue, ValueDomain};
use crate::models::profile::{Domain, DomainProfile, ProfileDef};

/// Numeric capture shared by all numeric patterns.
pub(crate) const NUMBER: &str = r"(?P<value>\d+(?:\.\d+)?)";

lazy_static! {
    static ref BLOOD_PRESSURE: DomainProfile =
        DomainProfile::compile(blood_pressure::definition()).unwrap();
    static ref DIABETES: DomainProfile = DomainProfile::compile(diabetes::definition()).unwrap();
    static ref FEVER: DomainProfile = DomainProfile::compile(fever::definition()).unwrap();
    static ref THYROID: DomainProfile = DomainProfile::compile(thyroid::definition()).unwrap();
}

/// The compiled built-in profile for a domain.
pub fn builtin(domain: Domain) -> &'static DomainProfile {
    match domain {
        Domain::BloodPressure => &BLOOD_PRESSURE,
        Domain::Diabetes => &DIABETES,
        Domain::Fever => &FEVER,
        Domain::Thyroid => &THYROID,
    }
}

/// The serializable definition behind a built-in profile.
pub fn definition(domain: Domain) -> ProfileDef {
    match domain {
        Domain::BloodPressure => blood_pressure::definition(),
        Domain::Diabetes => diabetes::definition(),
        Domain::Fever => fever::definition(),
        Domain::Thyroid => thyroid::definition(),
    }
}

pub(crate) fn numeric(
    name: &str,
    aliases: &[&str],
    pattern: String,
    min: f64,
    max: f64,
    default: f64,
) -> FieldSpecDef {
    FieldSpecDef {
        name: name.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        pattern,
        domain: ValueDomain::Numeric { min, max },
        unit_conversion: None,
        default: FieldValue::Number(default),
    }
}

pub(crate) fn choice(
    name: &str,
    aliases: &[&str],
    pattern: String,
    options: &[&str],
    synonyms: &[(&str, &str)],
    default: &str,
) -> FieldSpecDef {
    FieldSpecDef {
        name: name.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        pattern,
        domain: ValueDomain::Choice {
            options: options.iter().map(|o| o.to_string()).collect(),
            synonyms: synonyms
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect::<BTreeMap<_, _>>(),
        },
        unit_conversion: None,
        default: FieldValue::Choice(default.to_string()),
    }
}

/// Labelled number: `<label> <sep> <number> [<unit>]`.
pub(crate) fn labelled_number(label: &str, unit: Option<&str>) -> String {
    match unit {
        Some(unit) => format!(r"\b(?P<label>{})\W*{}\s*(?P<unit>{})?", label, NUMBER, unit),
        None => format!(r"\b(?P<label>{})\W*{}", label, NUMBER),
    }
}

pub(crate) fn age() -> FieldSpecDef {
    numeric(
        "age",
        &["age", "patient age", "age (years)"],
        labelled_number(r"patient\s+age|age", Some(r"years|yrs|y")),
        0.0,
        120.0,
        30.0,
    )
}

pub(crate) fn gender() -> FieldSpecDef {
    choice(
        "gender",
        &["gender", "sex"],
        r"\b(?P<label>gender|sex)\W*(?P<value>female|male|f|m)\b".to_string(),
        &["Female", "Male"],
        &[
            ("m", "Male"),
            ("f", "Female"),
            ("man", "Male"),
            ("woman", "Female"),
            ("1", "Male"),
            ("0", "Female"),
        ],
        "Male",
    )
}

pub(crate) fn yes_no(name: &str, aliases: &[&str], label: &str) -> FieldSpecDef {
    choice(
        name,
        aliases,
        format!(
            r"\b(?P<label>{})\W*(?P<value>yes|no|positive|negative|present|absent|y|n)\b",
            label
        ),
        &["No", "Yes"],
        &[
            ("y", "Yes"),
            ("positive", "Yes"),
            ("present", "Yes"),
            ("true", "Yes"),
            ("1", "Yes"),
            ("n", "No"),
            ("negative", "No"),
            ("absent", "No"),
            ("false", "No"),
            ("0", "No"),
        ],
        "No",
    )
}

pub(crate) fn level(name: &str, aliases: &[&str], label: &str) -> FieldSpecDef {
    choice(
        name,
        aliases,
        format!(
            r"\b(?P<label>{})\W*(?P<value>none|mild|moderate|severe|low|medium|high)\b",
            label
        ),
        &["None", "Mild", "Moderate", "Severe"],
        &[
            ("low", "Mild"),
            ("medium", "Moderate"),
            ("high", "Severe"),
            ("0", "None"),
            ("1", "Mild"),
            ("2", "Moderate"),
            ("3", "Severe"),
        ],
        "None",
    )
}
