//! Ordered numeric feature rows from form state.

use serde::Serialize;
use tracing::debug;

use crate::error::PredictionError;
use crate::models::profile::DerivedFeature;
use crate::session::FormState;

/// One model input row with its feature names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub names: Vec<String>,
    pub values: Vec<f32>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.values.get(idx).copied()
    }

    fn push(&mut self, name: &str, value: f64) {
        self.names.push(name.to_string());
        self.values.push(value as f32);
    }
}

/// Body-mass index from weight in kg and height in cm.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    let metres = height_cm / 100.0;
    (metres > 0.0).then(|| weight_kg / (metres * metres))
}

/// Encode the form in profile order, inserting derived features.
///
/// Choices encode as their option index, so gender is Female=0, Male=1 and
/// severity is None=0 through Severe=3.
pub fn assemble(form: &FormState) -> Result<FeatureVector, PredictionError> {
    let profile = form.profile();
    let mut features = FeatureVector {
        names: Vec::with_capacity(profile.fields().len() + profile.derived().len()),
        values: Vec::with_capacity(profile.fields().len() + profile.derived().len()),
    };

    for spec in profile.fields() {
        let value = form.value(&spec.name).unwrap_or(&spec.default);
        let encoded = spec.domain.encode(value).ok_or_else(|| PredictionError::Encoding {
            field: spec.name.clone(),
            reason: format!("'{}' has no encoding", value),
        })?;
        features.push(&spec.name, encoded);

        for derived in profile.derived() {
            let DerivedFeature::Bmi { weight, height, after } = derived;
            if after != &spec.name {
                continue;
            }
            let w = numeric(form, weight)?;
            let h = numeric(form, height)?;
            let value = bmi(w, h).ok_or_else(|| PredictionError::Encoding {
                field: "bmi".to_string(),
                reason: format!("height {} cm", h),
            })?;
            features.push("bmi", value);
        }
    }

    debug!("Assembled {} features for {}", features.len(), profile.name());
    Ok(features)
}

fn numeric(form: &FormState, field: &str) -> Result<f64, PredictionError> {
    form.value(field)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| PredictionError::Encoding {
            field: field.to_string(),
            reason: "not a number".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::Domain;
    use crate::profiles::builtin;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blood_pressure_inserts_bmi_after_height() {
        let mut form = FormState::new(builtin(Domain::BloodPressure).clone());
        form.set_raw("weight", "81").unwrap();
        form.set_raw("height", "180").unwrap();
        form.set_raw("gender", "F").unwrap();

        let features = assemble(&form).unwrap();
        assert_eq!(
            features.names,
            vec!["age", "gender", "weight", "height", "bmi", "systolic", "diastolic", "cholesterol", "pulse"]
        );
        assert_eq!(features.get("gender"), Some(0.0));
        assert!((features.get("bmi").unwrap() - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_fever_choice_encoding() {
        let mut form = FormState::new(builtin(Domain::Fever).clone());
        form.set_raw("headache", "yes").unwrap();
        form.set_raw("severity", "Severe").unwrap();
        form.set_raw("dehydration", "mild").unwrap();

        let features = assemble(&form).unwrap();
        assert_eq!(features.len(), 11);
        assert_eq!(features.get("gender"), Some(1.0));
        assert_eq!(features.get("headache"), Some(1.0));
        assert_eq!(features.get("chills"), Some(0.0));
        assert_eq!(features.get("severity"), Some(3.0));
        assert_eq!(features.get("dehydration"), Some(1.0));
        assert_eq!(features.get("temperature"), Some(37.0));
    }

    #[test]
    fn test_bmi_helper() {
        assert!((bmi(70.0, 170.0).unwrap() - 24.22).abs() < 0.01);
        assert_eq!(bmi(70.0, 0.0), None);
    }
}
