//! Per-session form state: what the predictor form currently shows.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::ExtractionError;
use crate::extract::ExtractionResult;
use crate::models::field::{FieldSpec, FieldValue};
use crate::models::profile::DomainProfile;

/// Form values for one predictor.
///
/// Stored values come from uploads or manual edits. Reads fall back to the
/// field default when nothing is stored or the stored value is out of range.
#[derive(Debug, Clone)]
pub struct FormState {
    profile: DomainProfile,
    stored: BTreeMap<String, FieldValue>,
    /// Fields whose stored value came from the last upload.
    uploaded: BTreeSet<String>,
}

impl FormState {
    pub fn new(profile: DomainProfile) -> Self {
        Self {
            profile,
            stored: BTreeMap::new(),
            uploaded: BTreeSet::new(),
        }
    }

    pub fn profile(&self) -> &DomainProfile {
        &self.profile
    }

    /// Merge an upload's values. Values from the previous upload are
    /// replaced wholesale; manual edits to fields this upload lacks survive.
    pub fn apply(&mut self, result: &ExtractionResult) {
        if result.is_empty() {
            return;
        }

        for field in std::mem::take(&mut self.uploaded) {
            self.stored.remove(&field);
        }

        for (field, value) in result.iter() {
            if self.profile.field(field).is_none() {
                debug!("Ignoring value for unknown field '{}'", field);
                continue;
            }
            self.stored.insert(field.to_string(), value.clone());
            self.uploaded.insert(field.to_string());
        }

        debug!("Form state now holds {} uploaded values", self.uploaded.len());
    }

    /// Set a value by hand. The value must fit the field's domain.
    pub fn set(&mut self, field: &str, value: FieldValue) -> Result<(), ExtractionError> {
        let spec = self.spec(field)?;
        let value = match (&value, spec.domain.canonical_choice(&value.to_string())) {
            (FieldValue::Choice(_), Some(option)) => FieldValue::Choice(option),
            _ => value,
        };
        if !spec.domain.contains(&value) {
            return Err(ExtractionError::InvalidValue {
                field: field.to_string(),
                reason: format!("{} is outside the field domain", value),
            });
        }
        self.stored.insert(field.to_string(), value);
        self.uploaded.remove(field);
        Ok(())
    }

    /// Parse and set a value from user text, e.g. a `--set age=52` flag.
    pub fn set_raw(&mut self, field: &str, raw: &str) -> Result<(), ExtractionError> {
        let spec = self.spec(field)?;
        let value = match spec.domain.canonical_choice(raw) {
            Some(option) => FieldValue::Choice(option),
            None => match raw.trim().parse::<f64>() {
                Ok(n) => FieldValue::Number(n),
                Err(_) => FieldValue::Choice(raw.trim().to_string()),
            },
        };
        self.set(field, value)
    }

    /// Forget every stored value; all fields read as their defaults.
    pub fn clear(&mut self) {
        self.stored.clear();
        self.uploaded.clear();
    }

    /// Current value of a field: the stored value if valid, else the default.
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        let spec = self.profile.field(field)?;
        Some(self.effective(spec))
    }

    /// All fields in profile order with their current values.
    pub fn values(&self) -> Vec<(&str, &FieldValue)> {
        self.profile
            .fields()
            .iter()
            .map(|spec| (spec.name.as_str(), self.effective(spec)))
            .collect()
    }

    /// The raw stored value, which may be out of range.
    pub fn stored(&self, field: &str) -> Option<&FieldValue> {
        self.stored.get(field)
    }

    /// Whether the field's current value came from an upload.
    pub fn is_uploaded(&self, field: &str) -> bool {
        self.uploaded.contains(field)
    }

    fn effective<'a>(&'a self, spec: &'a FieldSpec) -> &'a FieldValue {
        match self.stored.get(&spec.name) {
            Some(value) if spec.domain.contains(value) => value,
            _ => &spec.default,
        }
    }

    fn spec(&self, field: &str) -> Result<&FieldSpec, ExtractionError> {
        self.profile
            .field(field)
            .ok_or_else(|| ExtractionError::UnknownField(field.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract_table, match_text};
    use crate::models::profile::Domain;
    use crate::profiles::builtin;
    use pretty_assertions::assert_eq;

    fn thyroid() -> FormState {
        FormState::new(builtin(Domain::Thyroid).clone())
    }

    fn from_text(text: &str) -> ExtractionResult {
        ExtractionResult::from_reports(&match_text(text, builtin(Domain::Thyroid)))
    }

    #[test]
    fn test_defaults_when_empty() {
        let form = thyroid();
        assert_eq!(form.value("TSH"), Some(&FieldValue::Number(2.5)));
        assert_eq!(form.value("FTI"), Some(&FieldValue::Number(300.0)));
        assert_eq!(form.value("unknown"), None);
    }

    #[test]
    fn test_second_upload_overwrites() {
        let mut form = thyroid();
        form.apply(&from_text("Age 45, TSH 3.2, T3 2.8"));
        assert_eq!(form.value("T3"), Some(&FieldValue::Number(2.8)));

        form.apply(&from_text("Age 60, TSH 0.4"));
        assert_eq!(form.value("age"), Some(&FieldValue::Number(60.0)));
        assert_eq!(form.value("TSH"), Some(&FieldValue::Number(0.4)));
        // T3 came from the first upload only.
        assert_eq!(form.value("T3"), Some(&FieldValue::Number(3.0)));
        assert!(form.stored("T3").is_none());
    }

    #[test]
    fn test_manual_edit_survives_upload() {
        let mut form = thyroid();
        form.set_raw("FTI", "120").unwrap();
        form.apply(&from_text("TSH 1.1"));
        assert_eq!(form.value("FTI"), Some(&FieldValue::Number(120.0)));
        assert!(!form.is_uploaded("FTI"));
        assert!(form.is_uploaded("TSH"));
    }

    #[test]
    fn test_empty_upload_keeps_state() {
        let mut form = thyroid();
        form.apply(&from_text("TSH 1.1"));
        let csv = extract_table(b"age,tsh\n40,9\n", builtin(Domain::Thyroid)).unwrap();
        form.apply(&csv.result);
        assert_eq!(form.value("TSH"), Some(&FieldValue::Number(1.1)));
    }

    #[test]
    fn test_clear_resets_to_defaults() {
        let mut form = thyroid();
        form.apply(&from_text("Age 45, TSH 3.2, T3 2.8"));
        form.clear();
        let values: Vec<f64> = form.values().iter().map(|(_, v)| v.as_f64().unwrap()).collect();
        assert_eq!(values, vec![30.0, 2.5, 3.0, 7.5, 80.0, 30.0, 300.0]);
    }

    #[test]
    fn test_set_validates_domain() {
        let mut form = FormState::new(builtin(Domain::Fever).clone());
        assert!(form.set_raw("temperature", "50").is_err());
        assert!(form.set_raw("severity", "extreme").is_err());
        form.set_raw("severity", "moderate").unwrap();
        assert_eq!(form.value("severity"), Some(&FieldValue::Choice("Moderate".into())));
        assert!(matches!(
            form.set_raw("weight", "70"),
            Err(ExtractionError::UnknownField(_))
        ));
    }
}
