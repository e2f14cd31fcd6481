//! Inference backend implementations.

#[cfg(feature = "native")]
pub mod ort;

#[cfg(feature = "wasm")]
pub mod tract;

use crate::{InputTensor, OutputTensor, Result};

/// Trait for ONNX inference backends.
///
/// A classifier is scored by handing the backend a single named feature
/// tensor; the backend returns every tensor output it can decode. Outputs
/// that are not plain tensors (e.g. sklearn's ZipMap sequences) are skipped.
pub trait InferenceBackend: Send + Sync {
    /// Run inference with the given inputs.
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>>;

    /// Get the input names expected by the model.
    fn input_names(&self) -> &[String];

    /// Get the output names produced by the model.
    fn output_names(&self) -> &[String];
}
