//! Tract backend for WASM classifier scoring.

use std::path::Path;

use tract_onnx::prelude::*;
use tracing::{debug, trace};

use crate::error::InferenceError;
use crate::tensor::{InputTensor, OutputTensor};
use crate::{InferenceBackend, Result};

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Backend using Tract for cross-platform inference.
///
/// Tract needs concrete input shapes, so the model is pinned to a single
/// `[1, feature_count]` row at load time.
pub struct TractBackend {
    model: RunnableModel,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl TractBackend {
    /// Load a classifier from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P, feature_count: usize) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading classifier with Tract from: {}", path.display());

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        Self::finish(model, feature_count)
    }

    /// Load a classifier from bytes.
    pub fn from_bytes(bytes: &[u8], feature_count: usize) -> Result<Self> {
        debug!("Loading classifier with Tract from {} bytes", bytes.len());

        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(bytes))
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        Self::finish(model, feature_count)
    }

    fn finish(mut model: InferenceModel, feature_count: usize) -> Result<Self> {
        if feature_count == 0 {
            return Err(InferenceError::FeatureRow("feature count must be positive".to_string()));
        }

        let input_names = model
            .input_outlets()
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?
            .iter()
            .map(|outlet| model.node(outlet.node).name.clone())
            .collect::<Vec<_>>();
        let output_names = model
            .output_outlets()
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?
            .iter()
            .map(|outlet| model.node(outlet.node).name.clone())
            .collect::<Vec<_>>();

        model
            .set_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), &[1, feature_count][..]))
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to set input shape: {}", e)))?;

        let model = model
            .into_typed()
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to type model: {}", e)))?
            .into_optimized()
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to optimize: {}", e)))?
            .into_runnable()
            .map_err(|e| InferenceError::Session(e.to_string()))?;

        Ok(Self {
            model,
            input_names,
            output_names,
        })
    }

    fn convert_input(tensor: &InputTensor) -> Result<TValue> {
        let data: Vec<f32> = tensor.values().collect();
        tract_ndarray::ArrayD::from_shape_vec(tract_ndarray::IxDyn(tensor.shape()), data)
            .map(|a| a.into_tvalue())
            .map_err(|e| InferenceError::FeatureRow(e.to_string()))
    }
}

impl InferenceBackend for TractBackend {
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>> {
        let tract_inputs: TVec<TValue> = inputs
            .iter()
            .map(|(_, tensor)| Self::convert_input(tensor))
            .collect::<Result<TVec<_>>>()?;

        let outputs = self
            .model
            .run(tract_inputs)
            .map_err(|e| InferenceError::Run(e.to_string()))?;

        let mut results = Vec::with_capacity(outputs.len());

        for (idx, output) in outputs.iter().enumerate() {
            let name = self
                .output_names
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("output_{}", idx));

            let tensor = if let Ok(arr) = output.to_array_view::<f32>() {
                OutputTensor::float32(arr.shape(), arr.iter().copied().collect())?
            } else if let Ok(arr) = output.to_array_view::<i64>() {
                OutputTensor::int64(arr.shape(), arr.iter().copied().collect())?
            } else {
                trace!("Skipping non-tensor output '{}'", name);
                continue;
            };

            results.push((name, tensor));
        }

        Ok(results)
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}
