//! Extraction results and per-field outcomes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::field::FieldValue;

/// Field name -> extracted value. Only fields actually found are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult(BTreeMap<String, FieldValue>);

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn insert(&mut self, field: String, value: FieldValue) {
        self.0.insert(field, value);
    }

    /// Collect the found values out of per-field outcomes.
    pub fn from_reports(reports: &[FieldReport]) -> Self {
        let mut result = Self::new();
        for report in reports {
            if let FieldOutcome::Found { value } = &report.outcome {
                result.insert(report.field.clone(), value.clone());
            }
        }
        result
    }
}

/// Why a matched value was dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// The captured text is not a finite number.
    Unparseable,
    /// The number lies outside the field's range.
    OutOfRange { value: f64, min: f64, max: f64 },
    /// The token names none of the field's options.
    UnknownChoice,
}

/// What happened to one field of the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldOutcome {
    Found { value: FieldValue },
    NotFound,
    Rejected { raw: String, reason: RejectReason },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldReport {
    pub field: String,
    pub outcome: FieldOutcome,
}

impl FieldReport {
    pub fn found(field: &str, value: FieldValue) -> Self {
        Self {
            field: field.to_string(),
            outcome: FieldOutcome::Found { value },
        }
    }

    pub fn not_found(field: &str) -> Self {
        Self {
            field: field.to_string(),
            outcome: FieldOutcome::NotFound,
        }
    }

    pub fn rejected(field: &str, raw: &str, reason: RejectReason) -> Self {
        Self {
            field: field.to_string(),
            outcome: FieldOutcome::Rejected {
                raw: raw.to_string(),
                reason,
            },
        }
    }
}

/// Where the extracted text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Csv,
    Image,
    PdfText,
    /// PDF text layer plus OCR of embedded images.
    PdfOcr,
}

/// Overall outcome of one upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionStatus {
    Extracted { count: usize },
    NoValuesFound,
    /// CSV with too few recognized columns.
    BelowThreshold { matched: usize, required: usize },
    /// Unreadable or unsupported upload.
    Failed { message: String },
}

/// Everything one extraction call produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub result: ExtractionResult,
    pub fields: Vec<FieldReport>,
    pub status: ExtractionStatus,
    pub source: Option<SourceKind>,
    pub elapsed_ms: u64,
}

impl ExtractionReport {
    pub fn failed(message: impl Into<String>, source: Option<SourceKind>) -> Self {
        Self {
            result: ExtractionResult::new(),
            fields: Vec::new(),
            status: ExtractionStatus::Failed {
                message: message.into(),
            },
            source,
            elapsed_ms: 0,
        }
    }

    pub fn from_fields(fields: Vec<FieldReport>, source: SourceKind) -> Self {
        let result = ExtractionResult::from_reports(&fields);
        let status = if result.is_empty() {
            ExtractionStatus::NoValuesFound
        } else {
            ExtractionStatus::Extracted {
                count: result.len(),
            }
        };
        Self {
            result,
            fields,
            status,
            source: Some(source),
            elapsed_ms: 0,
        }
    }

    /// User-facing summary line.
    pub fn message(&self) -> String {
        match &self.status {
            ExtractionStatus::Extracted { count } => format!(
                "Extracted {} value{}. Processed in {:.1}s",
                count,
                if *count == 1 { "" } else { "s" },
                self.elapsed_ms as f64 / 1000.0
            ),
            ExtractionStatus::NoValuesFound
            | ExtractionStatus::BelowThreshold { .. }
            | ExtractionStatus::Failed { .. } => "No values found in document".to_string(),
        }
    }

    /// Whether the upload produced any values.
    pub fn has_values(&self) -> bool {
        !self.result.is_empty()
    }

    pub fn rejected(&self) -> impl Iterator<Item = &FieldReport> {
        self.fields
            .iter()
            .filter(|f| matches!(f.outcome, FieldOutcome::Rejected { .. }))
    }
}
