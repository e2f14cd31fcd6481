//! Error types for the inference layer.

use thiserror::Error;

/// Errors raised while loading or scoring a classifier.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("cannot load classifier: {0}")]
    ModelLoad(String),

    #[error("cannot prepare classifier session: {0}")]
    Session(String),

    /// The feature row does not fit the model input.
    #[error("feature row rejected: {0}")]
    FeatureRow(String),

    #[error("classifier run failed: {0}")]
    Run(String),

    /// An output tensor could not be read back.
    #[error("unreadable classifier output: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
