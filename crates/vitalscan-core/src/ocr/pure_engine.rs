//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{OcrResult, TextBox, TextRecognizer};

const UNKNOWN_GLYPH: &str = "[UNK]";

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unknown_glyphs: bool,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in `config`.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let engine = build(
            &config.detection_path(),
            &config.recognition_path(),
            &config.dictionary_path(),
        )?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self {
            engine,
            keep_unknown_glyphs: config.keep_unknown_glyphs,
        })
    }

    /// Process an image and extract text with bounding boxes.
    pub fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage("empty image".to_string()));
        }

        debug!("Processing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: if self.keep_unknown_glyphs {
                    r.text.clone()
                } else {
                    r.text.replace(UNKNOWN_GLYPH, " ")
                },
                confidence: r.confidence,
            })
            .collect();

        debug!("OCR found {} text regions", boxes.len());

        Ok(OcrResult::new(boxes, (width, height)))
    }
}

impl TextRecognizer for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.process(image)?.text)
    }
}

/// Build the default recognizer for `config`.
pub fn create_engine(config: &OcrConfig) -> Result<Box<dyn TextRecognizer>, OcrError> {
    Ok(Box::new(PureOcrEngine::from_config(config)?))
}

fn build(det: &Path, rec: &Path, dict: &Path) -> Result<pure_onnx_ocr::engine::OcrEngine, OcrError> {
    for path in [det, rec, dict] {
        if !path.exists() {
            return Err(OcrError::ModelLoad(format!("missing model file {}", path.display())));
        }
    }

    pure_onnx_ocr::engine::OcrEngineBuilder::new()
        .det_model_path(det)
        .rec_model_path(rec)
        .dictionary_path(dict)
        .build()
        .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))
}

/// First four exterior points of a polygon as `[x1, y1, ..., x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
