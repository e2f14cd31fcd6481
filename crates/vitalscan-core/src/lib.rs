//! Core library for lab report field extraction and health-risk prediction.
//!
//! This crate provides:
//! - Declarative domain profiles (blood pressure, diabetes, fever, thyroid)
//! - Field extraction from CSV, image and PDF lab reports
//! - PDF processing (text layer and embedded images)
//! - OCR behind a pluggable recognizer
//! - Form state with upload merge and defaults
//! - Feature assembly, ONNX classifier boundary and clinical advice

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod predict;
pub mod profiles;
pub mod session;
pub mod template;

pub use error::{Result, VitalError};
pub use extract::{
    DocumentKind, ExtractionReport, ExtractionResult, ExtractionStatus, FieldOutcome, ReportExtractor,
    SourceKind, Upload,
};
pub use models::{Domain, DomainProfile, FieldSpec, FieldValue, VitalConfig};
pub use ocr::{OcrResult, TextBox, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::{create_engine, PureOcrEngine};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use predict::{advice_for, classify, Advice, ModelManifest, OnnxRiskClassifier, Prediction, RiskClassifier};
pub use session::FormState;
pub use template::csv_template;

/// Re-export inference types.
pub use vitalscan_inference::{InferenceBackend, InputTensor, OutputTensor};

#[cfg(feature = "native")]
pub use vitalscan_inference::OrtBackend;

#[cfg(feature = "wasm")]
pub use vitalscan_inference::TractBackend;
