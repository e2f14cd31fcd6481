//! ONNX-exported classifiers with a JSON manifest.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use vitalscan_inference::{InferenceBackend, InputTensor, OutputTensor};

use super::{Prediction, RiskClassifier};
use crate::error::{PredictionError, Result};

/// Per-feature standardization fitted at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl StandardScaler {
    pub fn transform(&self, features: &[f32]) -> Vec<f32> {
        features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                if *scale == 0.0 {
                    x - mean
                } else {
                    (x - mean) / scale
                }
            })
            .collect()
    }
}

/// Sidecar describing a trained classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    /// Feature names in input order.
    pub feature_names: Vec<String>,
    /// Class names indexed by the model's integer labels.
    pub class_names: Vec<String>,
    /// Applied before inference when the model does not scale internally.
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    /// Model input name; the backend's first input when absent.
    #[serde(default)]
    pub input_name: Option<String>,
}

impl ModelManifest {
    /// Load a manifest from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Parse and validate a manifest.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> std::result::Result<(), PredictionError> {
        if self.feature_names.is_empty() {
            return Err(PredictionError::Manifest("no feature names".to_string()));
        }
        if self.class_names.is_empty() {
            return Err(PredictionError::Manifest("no class names".to_string()));
        }
        if let Some(scaler) = &self.scaler {
            let n = self.feature_names.len();
            if scaler.mean.len() != n || scaler.scale.len() != n {
                return Err(PredictionError::Manifest(format!(
                    "scaler has {}/{} entries for {} features",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    n
                )));
            }
        }
        Ok(())
    }
}

/// A classifier run through any inference backend.
pub struct OnnxRiskClassifier<B: InferenceBackend> {
    backend: B,
    manifest: ModelManifest,
}

impl<B: InferenceBackend> OnnxRiskClassifier<B> {
    pub fn new(backend: B, manifest: ModelManifest) -> std::result::Result<Self, PredictionError> {
        manifest.validate()?;
        Ok(Self { backend, manifest })
    }

    pub fn manifest(&self) -> &ModelManifest {
        &self.manifest
    }

    fn input_name(&self) -> &str {
        self.manifest
            .input_name
            .as_deref()
            .or_else(|| self.backend.input_names().first().map(String::as_str))
            .unwrap_or("float_input")
    }

    fn class_name(&self, idx: i64) -> std::result::Result<&str, PredictionError> {
        usize::try_from(idx)
            .ok()
            .and_then(|i| self.manifest.class_names.get(i))
            .map(String::as_str)
            .ok_or(PredictionError::UnknownClass(idx))
    }
}

impl<B: InferenceBackend> RiskClassifier for OnnxRiskClassifier<B> {
    fn predict(&self, features: &[f32]) -> std::result::Result<Prediction, PredictionError> {
        let expected = self.manifest.feature_names.len();
        if features.len() != expected {
            return Err(PredictionError::FeatureCount {
                expected,
                actual: features.len(),
            });
        }

        let row = match &self.manifest.scaler {
            Some(scaler) => scaler.transform(features),
            None => features.to_vec(),
        };
        trace!("Scaled features: {:?}", row);

        let input = InputTensor::feature_row(&row)?;
        let outputs = self.backend.run(&[(self.input_name(), input)])?;

        let mut label: Option<i64> = None;
        let mut probabilities: Option<Vec<f32>> = None;
        for (name, tensor) in &outputs {
            match tensor {
                OutputTensor::Int64(arr) if label.is_none() => {
                    label = arr.iter().next().copied();
                }
                OutputTensor::Float32(arr) if probabilities.is_none() => {
                    let shape = arr.shape();
                    let classes = shape.last().copied().unwrap_or(0);
                    if classes != self.manifest.class_names.len() {
                        debug!("Ignoring output '{}' with shape {:?}", name, shape);
                        continue;
                    }
                    probabilities = Some(arr.iter().take(classes).copied().collect());
                }
                _ => {}
            }
        }

        let (idx, confidence) = match (&probabilities, label) {
            (Some(probs), label) => {
                let argmax = probs
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(i, _)| i as i64)
                    .unwrap_or(0);
                let idx = label.unwrap_or(argmax);
                let confidence = usize::try_from(idx)
                    .ok()
                    .and_then(|i| probs.get(i))
                    .copied()
                    .ok_or(PredictionError::UnknownClass(idx))?;
                (idx, confidence)
            }
            (None, Some(label)) => (label, 1.0),
            (None, None) => {
                return Err(PredictionError::MissingOutput(
                    "neither a label nor probabilities".to_string(),
                ));
            }
        };

        let label = self.class_name(idx)?.to_string();
        let probabilities = probabilities
            .map(|probs| {
                self.manifest
                    .class_names
                    .iter()
                    .cloned()
                    .zip(probs)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Prediction {
            label,
            confidence,
            probabilities,
        })
    }

    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.manifest.feature_names)
    }
}

/// Load a domain's classifier and manifest with ONNX Runtime.
#[cfg(feature = "native")]
pub fn load_classifier(
    config: &crate::models::config::ClassifierConfig,
    domain: crate::models::profile::Domain,
) -> Result<OnnxRiskClassifier<vitalscan_inference::OrtBackend>> {
    let manifest = ModelManifest::from_file(&config.manifest_path(domain))?;
    let backend = vitalscan_inference::OrtBackend::from_file(config.model_path(domain))
        .map_err(PredictionError::from)?;
    Ok(OnnxRiskClassifier::new(backend, manifest)?)
}

/// Build a classifier from model bytes and manifest JSON with Tract.
#[cfg(feature = "wasm")]
pub fn classifier_from_bytes(
    model: &[u8],
    manifest_json: &str,
) -> Result<OnnxRiskClassifier<vitalscan_inference::TractBackend>> {
    let manifest = ModelManifest::from_json(manifest_json)?;
    let backend =
        vitalscan_inference::TractBackend::from_bytes(model, manifest.feature_names.len())
            .map_err(PredictionError::from)?;
    Ok(OnnxRiskClassifier::new(backend, manifest)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Backend that records its input and replays canned outputs.
    struct FakeBackend {
        outputs: Vec<(String, OutputTensor)>,
        inputs: Vec<String>,
        seen: Mutex<Vec<f32>>,
    }

    impl FakeBackend {
        fn new(outputs: Vec<(String, OutputTensor)>) -> Self {
            Self {
                outputs,
                inputs: vec!["float_input".to_string()],
                seen: Mutex::new(vec![]),
            }
        }
    }

    impl InferenceBackend for FakeBackend {
        fn run(
            &self,
            inputs: &[(&str, InputTensor)],
        ) -> vitalscan_inference::Result<Vec<(String, OutputTensor)>> {
            if let Some((_, row)) = inputs.first() {
                *self.seen.lock().unwrap() = row.values().collect();
            }
            Ok(self.outputs.clone())
        }

        fn input_names(&self) -> &[String] {
            &self.inputs
        }

        fn output_names(&self) -> &[String] {
            &[]
        }
    }

    fn manifest(scaler: Option<StandardScaler>) -> ModelManifest {
        ModelManifest {
            feature_names: vec!["age".into(), "TSH".into()],
            class_names: vec!["Hyperthyroidism".into(), "Hypothyroidism".into(), "Normal".into()],
            scaler,
            input_name: None,
        }
    }

    fn sklearn_outputs(label: i64, probs: Vec<f32>) -> Vec<(String, OutputTensor)> {
        vec![
            ("label".to_string(), OutputTensor::int64(&[1], vec![label]).unwrap()),
            (
                "probabilities".to_string(),
                OutputTensor::float32(&[1, probs.len()], probs).unwrap(),
            ),
        ]
    }

    #[test]
    fn test_label_and_confidence() {
        let backend = FakeBackend::new(sklearn_outputs(1, vec![0.1, 0.7, 0.2]));
        let classifier = OnnxRiskClassifier::new(backend, manifest(None)).unwrap();

        let prediction = classifier.predict(&[45.0, 8.0]).unwrap();
        assert_eq!(prediction.label, "Hypothyroidism");
        assert!((prediction.confidence - 0.7).abs() < 1e-6);
        assert_eq!(prediction.probabilities.len(), 3);
        assert_eq!(prediction.probabilities[2].0, "Normal");
    }

    #[test]
    fn test_scaler_applied() {
        let backend = FakeBackend::new(sklearn_outputs(2, vec![0.0, 0.0, 1.0]));
        let scaler = StandardScaler {
            mean: vec![40.0, 2.0],
            scale: vec![10.0, 0.0],
        };
        let classifier = OnnxRiskClassifier::new(backend, manifest(Some(scaler))).unwrap();
        classifier.predict(&[50.0, 3.0]).unwrap();

        assert_eq!(*classifier.backend.seen.lock().unwrap(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_probabilities_only_uses_argmax() {
        let backend = FakeBackend::new(vec![(
            "probabilities".to_string(),
            OutputTensor::float32(&[1, 3], vec![0.2, 0.3, 0.5]).unwrap(),
        )]);
        let classifier = OnnxRiskClassifier::new(backend, manifest(None)).unwrap();
        assert_eq!(classifier.predict(&[30.0, 2.5]).unwrap().label, "Normal");
    }

    #[test]
    fn test_errors_are_typed() {
        let classifier =
            OnnxRiskClassifier::new(FakeBackend::new(sklearn_outputs(7, vec![])), manifest(None)).unwrap();
        assert!(matches!(
            classifier.predict(&[1.0]),
            Err(PredictionError::FeatureCount { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            classifier.predict(&[1.0, 2.0]),
            Err(PredictionError::UnknownClass(7))
        ));

        let empty = OnnxRiskClassifier::new(FakeBackend::new(vec![]), manifest(None)).unwrap();
        assert!(matches!(
            empty.predict(&[1.0, 2.0]),
            Err(PredictionError::MissingOutput(_))
        ));
    }

    #[test]
    fn test_manifest_from_json() {
        let manifest = ModelManifest::from_json(
            r#"{"feature_names": ["age", "TSH"], "class_names": ["Normal", "Hypothyroidism"]}"#,
        )
        .unwrap();
        assert_eq!(manifest.feature_names, vec!["age", "TSH"]);
        assert_eq!(manifest.scaler, None);

        assert!(ModelManifest::from_json(r#"{"feature_names": [], "class_names": ["Normal"]}"#).is_err());
        assert!(ModelManifest::from_json("not json").is_err());
    }

    #[test]
    fn test_manifest_validation() {
        let mut bad = manifest(Some(StandardScaler {
            mean: vec![0.0],
            scale: vec![1.0],
        }));
        assert!(bad.validate().is_err());
        bad.scaler = None;
        bad.class_names.clear();
        assert!(matches!(bad.validate(), Err(PredictionError::Manifest(_))));
    }
}
