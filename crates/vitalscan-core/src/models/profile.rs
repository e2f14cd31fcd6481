//! Domain profiles: the ordered field set behind one predictor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::field::{FieldSpec, FieldSpecDef};
use crate::error::ExtractionError;

/// The four built-in predictors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    BloodPressure,
    Diabetes,
    Fever,
    Thyroid,
}

impl Domain {
    /// All domains in display order.
    pub const ALL: [Domain; 4] = [
        Domain::BloodPressure,
        Domain::Diabetes,
        Domain::Fever,
        Domain::Thyroid,
    ];

    /// Machine name, as used in config keys and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::BloodPressure => "blood_pressure",
            Domain::Diabetes => "diabetes",
            Domain::Fever => "fever",
            Domain::Thyroid => "thyroid",
        }
    }

    /// Human-readable predictor title.
    pub fn title(&self) -> &'static str {
        match self {
            Domain::BloodPressure => "Blood Pressure Status Prediction",
            Domain::Diabetes => "Diabetes Risk Assessment",
            Domain::Fever => "Fever Type Prediction",
            Domain::Thyroid => "Thyroid Disorder Prediction",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "blood_pressure" | "bp" => Ok(Domain::BloodPressure),
            "diabetes" => Ok(Domain::Diabetes),
            "fever" | "fever_type" => Ok(Domain::Fever),
            "thyroid" => Ok(Domain::Thyroid),
            other => Err(ExtractionError::InvalidProfile(format!("unknown domain: {}", other))),
        }
    }
}

/// A model feature computed from other fields rather than entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedFeature {
    /// Body-mass index from weight (kg) and height (cm).
    Bmi {
        weight: String,
        height: String,
        /// The feature is inserted right after this field.
        after: String,
    },
}

/// Serializable profile definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDef {
    pub name: String,
    /// Recognized CSV columns required before any column is accepted.
    pub min_matched_columns: usize,
    pub fields: Vec<FieldSpecDef>,
    #[serde(default)]
    pub derived: Vec<DerivedFeature>,
}

/// A compiled domain profile.
#[derive(Debug, Clone)]
pub struct DomainProfile {
    name: String,
    domain: Option<Domain>,
    min_matched_columns: usize,
    fields: Vec<FieldSpec>,
    derived: Vec<DerivedFeature>,
}

impl DomainProfile {
    /// Compile a profile definition.
    pub fn compile(def: ProfileDef) -> Result<Self, ExtractionError> {
        if def.fields.is_empty() {
            return Err(ExtractionError::InvalidProfile(format!(
                "profile '{}' has no fields",
                def.name
            )));
        }
        if def.min_matched_columns == 0 || def.min_matched_columns > def.fields.len() {
            return Err(ExtractionError::InvalidProfile(format!(
                "profile '{}' requires {} columns but declares {} fields",
                def.name,
                def.min_matched_columns,
                def.fields.len()
            )));
        }

        let mut fields: Vec<FieldSpec> = Vec::with_capacity(def.fields.len());
        for field_def in def.fields {
            if fields.iter().any(|f| f.name == field_def.name) {
                return Err(ExtractionError::InvalidProfile(format!(
                    "duplicate field '{}'",
                    field_def.name
                )));
            }
            fields.push(FieldSpec::compile(field_def)?);
        }

        for derived in &def.derived {
            let DerivedFeature::Bmi { weight, height, after } = derived;
            for name in [weight, height, after] {
                if !fields.iter().any(|f| &f.name == name) {
                    return Err(ExtractionError::UnknownField(name.clone()));
                }
            }
        }

        let domain = def.name.parse::<Domain>().ok();

        Ok(Self {
            name: def.name,
            domain,
            min_matched_columns: def.min_matched_columns,
            fields,
            derived: def.derived,
        })
    }

    /// Override the CSV column threshold.
    pub fn with_min_matched_columns(mut self, min: usize) -> Result<Self, ExtractionError> {
        if min == 0 || min > self.fields.len() {
            return Err(ExtractionError::InvalidProfile(format!(
                "threshold {} out of range for {} fields",
                min,
                self.fields.len()
            )));
        }
        self.min_matched_columns = min;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The built-in domain this profile belongs to, if any.
    pub fn domain(&self) -> Option<Domain> {
        self.domain
    }

    pub fn min_matched_columns(&self) -> usize {
        self.min_matched_columns
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn derived(&self) -> &[DerivedFeature] {
        &self.derived
    }
}
