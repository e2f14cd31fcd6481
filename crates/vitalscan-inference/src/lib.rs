//! ONNX inference layer for vitalscan risk classifiers.
//!
//! The trained classifiers are exported to ONNX and scored through one of
//! two backends:
//! - `ort` for native builds
//! - `tract` for WASM/browser builds

mod backend;
mod error;
mod tensor;

pub use backend::InferenceBackend;
pub use error::InferenceError;
pub use tensor::{InputTensor, OutputTensor};

#[cfg(feature = "native")]
pub use backend::ort::OrtBackend;

#[cfg(feature = "wasm")]
pub use backend::tract::TractBackend;

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
