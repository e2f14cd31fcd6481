//! Field specifications: what one extractable clinical value looks like.

use std::collections::BTreeMap;
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// mmol/L to mg/dL factor for glucose.
pub const GLUCOSE_MMOL_TO_MG_DL: f64 = 18.0182;

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Choice(String),
}

impl FieldValue {
    /// Numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Choice(_) => None,
        }
    }

    /// Choice label, if this is an enumerated value.
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            FieldValue::Number(_) => None,
            FieldValue::Choice(s) => Some(s),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Choice(s) => f.write_str(s),
        }
    }
}

/// The set of values a field accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueDomain {
    /// Closed numeric range.
    Numeric { min: f64, max: f64 },
    /// Fixed enumeration. An option's index is its model encoding.
    Choice {
        options: Vec<String>,
        /// Lowercase synonym -> canonical option.
        #[serde(default)]
        synonyms: BTreeMap<String, String>,
    },
}

impl ValueDomain {
    /// Whether `value` lies inside this domain.
    pub fn contains(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (ValueDomain::Numeric { min, max }, FieldValue::Number(n)) => {
                n.is_finite() && *min <= *n && *n <= *max
            }
            (ValueDomain::Choice { options, .. }, FieldValue::Choice(s)) => options.contains(s),
            _ => false,
        }
    }

    /// Map a raw token onto a canonical option, case-insensitively.
    pub fn canonical_choice(&self, raw: &str) -> Option<String> {
        let ValueDomain::Choice { options, synonyms } = self else {
            return None;
        };
        let needle = raw.trim().to_lowercase();
        if let Some(option) = options.iter().find(|o| o.to_lowercase() == needle) {
            return Some(option.clone());
        }
        synonyms
            .get(&needle)
            .filter(|target| options.contains(target))
            .cloned()
    }

    /// Model encoding of a value: the number itself, or the option index.
    pub fn encode(&self, value: &FieldValue) -> Option<f64> {
        match (self, value) {
            (ValueDomain::Numeric { .. }, FieldValue::Number(n)) => Some(*n),
            (ValueDomain::Choice { options, .. }, FieldValue::Choice(s)) => {
                options.iter().position(|o| o == s).map(|i| i as f64)
            }
            _ => None,
        }
    }
}

/// Multiplicative conversion from an alternate unit system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    /// Unit tokens that trigger the conversion, e.g. `mmol/L`.
    pub from_units: Vec<String>,
    /// Factor applied to values captured in one of `from_units`.
    pub factor: f64,
}

impl UnitConversion {
    /// mmol/L -> mg/dL for glucose-family fields.
    pub fn glucose() -> Self {
        Self {
            from_units: vec!["mmol/l".to_string()],
            factor: GLUCOSE_MMOL_TO_MG_DL,
        }
    }

    /// Whether a captured unit token names the alternate unit.
    pub fn applies_to(&self, unit: &str) -> bool {
        let unit = squash(unit);
        self.from_units.iter().any(|u| squash(u) == unit)
    }

    /// Convert `value` if `unit` names the alternate unit.
    pub fn convert(&self, value: f64, unit: Option<&str>) -> f64 {
        match unit {
            Some(u) if self.applies_to(u) => value * self.factor,
            _ => value,
        }
    }
}

fn squash(unit: &str) -> String {
    unit.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Serializable field definition, as written in profile files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpecDef {
    /// Field name; also the key in extraction results.
    pub name: String,
    /// Column headers recognized for this field (matched trimmed, lowercase).
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Free-text pattern with a `value` group and optional `label`/`unit`
    /// groups. Matches where an optional `prefix` group took part are skipped.
    pub pattern: String,
    pub domain: ValueDomain,
    #[serde(default)]
    pub unit_conversion: Option<UnitConversion>,
    /// Value shown when nothing valid is available.
    pub default: FieldValue,
}

impl FieldSpecDef {
    /// Attach a unit conversion rule.
    pub fn with_conversion(mut self, conversion: UnitConversion) -> Self {
        self.unit_conversion = Some(conversion);
        self
    }
}

/// A compiled field specification.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    /// Normalized aliases, always including the lowercase field name.
    pub aliases: Vec<String>,
    pub pattern: Regex,
    pub domain: ValueDomain,
    pub unit_conversion: Option<UnitConversion>,
    pub default: FieldValue,
}

impl FieldSpec {
    /// Compile a definition. Patterns are matched case-insensitively.
    pub fn compile(def: FieldSpecDef) -> Result<Self, ExtractionError> {
        let pattern = RegexBuilder::new(&def.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ExtractionError::Pattern {
                field: def.name.clone(),
                reason: e.to_string(),
            })?;

        if !pattern.capture_names().any(|n| n == Some("value")) {
            return Err(ExtractionError::Pattern {
                field: def.name,
                reason: "pattern has no `value` group".to_string(),
            });
        }

        if !def.domain.contains(&def.default) {
            return Err(ExtractionError::InvalidValue {
                field: def.name,
                reason: format!("default {} is outside the field domain", def.default),
            });
        }

        let mut aliases: Vec<String> = def
            .aliases
            .iter()
            .map(|a| normalize_header(a))
            .filter(|a| !a.is_empty())
            .collect();
        let own = normalize_header(&def.name);
        if !aliases.contains(&own) {
            aliases.insert(0, own);
        }

        Ok(Self {
            name: def.name,
            aliases,
            pattern,
            domain: def.domain,
            unit_conversion: def.unit_conversion,
            default: def.default,
        })
    }

    /// Whether a normalized column header names this field.
    pub fn matches_alias(&self, header: &str) -> bool {
        self.aliases.iter().any(|a| a == header)
    }
}

/// Normalize a column header for alias matching.
pub fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}
