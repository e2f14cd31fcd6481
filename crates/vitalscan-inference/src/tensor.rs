//! Tensor types crossing the classifier boundary.

use ndarray::{Array2, ArrayD, IxDyn};

use crate::error::InferenceError;
use crate::Result;

/// One `[1, n]` float feature row, the only input a tabular classifier takes.
#[derive(Debug, Clone)]
pub struct InputTensor(Array2<f32>);

impl InputTensor {
    pub fn feature_row(row: &[f32]) -> Result<Self> {
        if row.is_empty() {
            return Err(InferenceError::FeatureRow("empty feature row".to_string()));
        }
        let arr = Array2::from_shape_vec((1, row.len()), row.to_vec())
            .map_err(|e| InferenceError::FeatureRow(e.to_string()))?;
        Ok(Self(arr))
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    /// Feature values in column order.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.0.iter().copied()
    }
}

/// Output tensor from a classifier.
///
/// sklearn exports produce an `Int64` label tensor of shape `[n]` and a
/// `Float32` probability tensor of shape `[n, classes]`.
#[derive(Debug, Clone)]
pub enum OutputTensor {
    Float32(ArrayD<f32>),
    Int64(ArrayD<i64>),
}

impl OutputTensor {
    /// Build an output tensor from raw parts.
    pub fn float32(shape: &[usize], data: Vec<f32>) -> Result<Self> {
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(OutputTensor::Float32)
            .map_err(|e| InferenceError::Output(e.to_string()))
    }

    /// Build an integer output tensor from raw parts.
    pub fn int64(shape: &[usize], data: Vec<i64>) -> Result<Self> {
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(OutputTensor::Int64)
            .map_err(|e| InferenceError::Output(e.to_string()))
    }

    /// Shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        match self {
            OutputTensor::Float32(arr) => arr.shape(),
            OutputTensor::Int64(arr) => arr.shape(),
        }
    }

    /// Try to get the inner Float32 array.
    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            OutputTensor::Float32(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to get the inner Int64 array.
    pub fn as_i64(&self) -> Option<&ArrayD<i64>> {
        match self {
            OutputTensor::Int64(arr) => Some(arr),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_feature_row_shape() {
        let tensor = InputTensor::feature_row(&[30.0, 1.0, 70.5]).unwrap();
        assert_eq!(tensor.shape(), &[1, 3]);
    }

    #[test]
    fn test_empty_feature_row_rejected() {
        assert!(matches!(
            InputTensor::feature_row(&[]),
            Err(InferenceError::FeatureRow(_))
        ));
    }

    #[test]
    fn test_output_shape_mismatch() {
        assert!(OutputTensor::float32(&[1, 4], vec![0.1, 0.2]).is_err());
        let probs = OutputTensor::float32(&[1, 2], vec![0.25, 0.75]).unwrap();
        assert_eq!(probs.shape(), &[1, 2]);
        assert!(probs.as_i64().is_none());
    }
}
