//! Error types for the vitalscan-core library.

use thiserror::Error;

/// Main error type for the vitalscan library.
#[derive(Error, Debug)]
pub enum VitalError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Report field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Risk prediction error.
    #[error("prediction error: {0}")]
    Prediction(#[from] PredictionError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// CSV reading or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract the text layer.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract embedded images.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// No recognizer is configured for an image that needs one.
    #[error("no text recognizer configured")]
    Unavailable,
}

/// Errors related to report field extraction and profile definitions.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The upload is not a CSV, image, or PDF.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A field pattern failed to compile or lacks a value group.
    #[error("invalid pattern for {field}: {reason}")]
    Pattern { field: String, reason: String },

    /// A profile definition is inconsistent.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// The field is not part of the domain profile.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A value does not fit the field's domain.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Errors raised at the classifier boundary.
#[derive(Error, Debug)]
pub enum PredictionError {
    /// Feature vector length does not match the model.
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    /// A form field could not be encoded as a feature.
    #[error("cannot encode {field}: {reason}")]
    Encoding { field: String, reason: String },

    /// The model produced neither a label nor probabilities.
    #[error("model output missing: {0}")]
    MissingOutput(String),

    /// The model predicted a class index the manifest does not name.
    #[error("unknown class index: {0}")]
    UnknownClass(i64),

    /// The model manifest is inconsistent.
    #[error("invalid manifest: {0}")]
    Manifest(String),

    /// Inference error from the inference layer.
    #[error("inference error: {0}")]
    Inference(#[from] vitalscan_inference::InferenceError),
}

/// Result type for the vitalscan library.
pub type Result<T> = std::result::Result<T, VitalError>;
