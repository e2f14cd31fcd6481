//! Optical text recognition over report images.
//!
//! The extractor only needs a flat text blob per image, so OCR sits behind
//! the [`TextRecognizer`] trait. Native builds get a `pure-onnx-ocr` engine;
//! anything else (tests, WASM hosts) can plug in its own recognizer.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::{create_engine, PureOcrEngine};

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Anything that turns an image into text.
pub trait TextRecognizer {
    /// Recognize all text in the image, lines in reading order.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

impl<F> TextRecognizer for F
where
    F: Fn(&DynamicImage) -> Result<String, OcrError>,
{
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        self(image)
    }
}

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    pub boxes: Vec<TextBox>,

    /// Full text, one line per row.
    pub text: String,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    pub fn new(boxes: Vec<TextBox>, image_size: (u32, u32)) -> Self {
        let mut result = Self {
            boxes,
            text: String::new(),
            image_size,
        };
        result.sort_by_reading_order();
        result
    }

    /// Sort boxes by reading order (top-to-bottom, left-to-right) and
    /// rebuild the text. Boxes whose tops are within 20px share a row.
    pub fn sort_by_reading_order(&mut self) {
        self.boxes.sort_by(|a, b| {
            let (ax, ay, _, _) = a.rect();
            let (bx, by, _, _) = b.rect();

            let row_a = (ay / 20.0) as i32;
            let row_b = (by / 20.0) as i32;

            if row_a != row_b {
                row_a.cmp(&row_b)
            } else {
                ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
            }
        });

        // Same-row boxes join with a space, rows with a newline.
        let mut text = String::new();
        let mut last_row: Option<i32> = None;
        for b in &self.boxes {
            let row = (b.rect().1 / 20.0) as i32;
            match last_row {
                Some(r) if r == row => text.push(' '),
                Some(_) => text.push('\n'),
                None => {}
            }
            text.push_str(&b.text);
            last_row = Some(row);
        }
        self.text = text;
    }
}
