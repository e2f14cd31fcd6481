//! Risk classification over assembled form features.

mod advice;
mod features;
mod onnx;

pub use advice::{advice_for, bmi_category, Advice, AdviceLevel, BmiCategory};
pub use features::{assemble, bmi, FeatureVector};
pub use onnx::{ModelManifest, OnnxRiskClassifier, StandardScaler};

#[cfg(feature = "native")]
pub use onnx::load_classifier;

#[cfg(feature = "wasm")]
pub use onnx::classifier_from_bytes;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PredictionError, Result};
use crate::session::FormState;

/// Outcome of one classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Probability of `label` (0.0 - 1.0).
    pub confidence: f32,
    /// Class name -> probability, in class order. Empty if the model
    /// reports labels only.
    pub probabilities: Vec<(String, f32)>,
}

/// A trained classifier behind an opaque predict contract.
pub trait RiskClassifier {
    /// Classify one ordered feature row.
    fn predict(&self, features: &[f32]) -> std::result::Result<Prediction, PredictionError>;

    /// Feature names the model was trained on, if known.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}

/// Assemble the form's features and classify them.
pub fn classify(form: &FormState, classifier: &dyn RiskClassifier) -> Result<Prediction> {
    let features = assemble(form)?;

    if let Some(expected) = classifier.feature_names() {
        let matches = expected.len() == features.names.len()
            && expected
                .iter()
                .zip(&features.names)
                .all(|(model, field)| same_feature(model, field));
        if !matches {
            return Err(PredictionError::Manifest(format!(
                "model expects features {:?}, form provides {:?}",
                expected, features.names
            ))
            .into());
        }
    }

    let prediction = classifier.predict(&features.values)?;
    info!(
        "{}: {} ({:.1}%)",
        form.profile().name(),
        prediction.label,
        prediction.confidence * 100.0
    );
    Ok(prediction)
}

/// Training column names differ from field names in case and separators
/// ("Muscle Pain" vs "muscle_pain").
fn same_feature(model: &str, field: &str) -> bool {
    let fold = |c: char| match c {
        ' ' | '-' => '_',
        c => c.to_ascii_lowercase(),
    };
    model.trim().chars().map(fold).eq(field.chars().map(fold))
}
