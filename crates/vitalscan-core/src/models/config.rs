//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::profile::{Domain, DomainProfile, ProfileDef};
use crate::error::{ExtractionError, Result, VitalError};
use crate::profiles;

/// Main configuration for vitalscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Risk classifier configuration.
    pub classifier: ClassifierConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing the OCR model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep glyphs the dictionary cannot name instead of dropping them.
    pub keep_unknown_glyphs: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models/ocr"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unknown_glyphs: false,
        }
    }
}

impl OcrConfig {
    pub fn detection_path(&self) -> PathBuf {
        self.model_dir.join(&self.detection_model)
    }

    pub fn recognition_path(&self) -> PathBuf {
        self.model_dir.join(&self.recognition_model)
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.model_dir.join(&self.dictionary)
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Text layers shorter than this (trimmed, in characters) trigger OCR.
    pub min_text_length: usize,

    /// Maximum pages to OCR (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            max_pages: 0,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// JSON file holding a list of profile definitions that replace built-ins.
    pub profile_file: Option<PathBuf>,

    /// Per-domain CSV column threshold overrides.
    pub min_matched_columns: BTreeMap<Domain, usize>,
}

/// Risk classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Directory containing `<domain>_model.onnx` and `<domain>_model.json`.
    pub model_dir: PathBuf,

    /// Per-domain model file name overrides.
    pub models: BTreeMap<Domain, String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            models: BTreeMap::new(),
        }
    }
}

impl ClassifierConfig {
    /// Full path to a domain's ONNX model.
    pub fn model_path(&self, domain: Domain) -> PathBuf {
        match self.models.get(&domain) {
            Some(name) => self.model_dir.join(name),
            None => self.model_dir.join(format!("{}_model.onnx", domain.as_str())),
        }
    }

    /// Full path to a domain's model manifest, next to the model.
    pub fn manifest_path(&self, domain: Domain) -> PathBuf {
        self.model_path(domain).with_extension("json")
    }
}

impl VitalConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get full path to a domain's classifier model.
    pub fn model_path(&self, domain: Domain) -> PathBuf {
        self.classifier.model_path(domain)
    }

    /// Resolve the profile for a domain: custom file first, then built-in,
    /// then any threshold override.
    pub fn profile_for(&self, domain: Domain) -> Result<DomainProfile> {
        let mut profile = match &self.extraction.profile_file {
            Some(path) => load_custom_profile(path, domain)?
                .unwrap_or_else(|| profiles::builtin(domain).clone()),
            None => profiles::builtin(domain).clone(),
        };

        if let Some(&min) = self.extraction.min_matched_columns.get(&domain) {
            profile = profile.with_min_matched_columns(min)?;
        }

        Ok(profile)
    }
}

fn load_custom_profile(path: &Path, domain: Domain) -> Result<Option<DomainProfile>> {
    let content = std::fs::read_to_string(path)?;
    let defs: Vec<ProfileDef> = serde_json::from_str(&content)?;

    for def in defs {
        let Ok(def_domain) = def.name.parse::<Domain>() else {
            return Err(VitalError::Config(format!(
                "profile '{}' in {} names no known domain",
                def.name,
                path.display()
            )));
        };
        if def_domain == domain {
            return Ok(Some(DomainProfile::compile(def).map_err(|e: ExtractionError| {
                VitalError::Config(format!("{}: {}", path.display(), e))
            })?));
        }
    }

    Ok(None)
}
