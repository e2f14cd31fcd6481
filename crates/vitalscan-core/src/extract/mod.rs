//! Report field extraction: one upload in, one report out.
//!
//! Extraction is fail-soft. Unreadable files, missing text and per-field
//! failures never surface as errors; they end up in the report's status and
//! per-field outcomes instead.

mod normalize;
mod report;
mod table;
mod text;
mod upload;

pub use report::{
    ExtractionReport, ExtractionResult, ExtractionStatus, FieldOutcome, FieldReport, RejectReason,
    SourceKind,
};
pub use table::extract_table;
pub use text::match_text;
pub use upload::{DocumentKind, Upload};

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{OcrError, Result};
use crate::models::config::PdfConfig;
use crate::models::profile::DomainProfile;
use crate::ocr::TextRecognizer;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Extracts profile fields from uploaded lab reports.
pub struct ReportExtractor {
    recognizer: Option<Box<dyn TextRecognizer>>,
    pdf: PdfConfig,
}

impl ReportExtractor {
    /// Create an extractor without OCR. Images and scanned PDFs yield no text.
    pub fn new() -> Self {
        Self {
            recognizer: None,
            pdf: PdfConfig::default(),
        }
    }

    /// Set the text recognizer used for images and scanned PDFs.
    pub fn with_recognizer(mut self, recognizer: Box<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Set PDF processing options.
    pub fn with_pdf_config(mut self, config: PdfConfig) -> Self {
        self.pdf = config;
        self
    }

    pub fn has_recognizer(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Extract the profile's fields from one upload.
    pub fn extract(&self, upload: &Upload, profile: &DomainProfile) -> ExtractionReport {
        let start = Instant::now();

        let mut report = match self.try_extract(upload, profile) {
            Ok(report) => report,
            Err(e) => {
                warn!("Failed to process {}: {}", upload.name, e);
                ExtractionReport::failed(e.to_string(), None)
            }
        };
        report.elapsed_ms = start.elapsed().as_millis() as u64;

        match &report.status {
            ExtractionStatus::Extracted { count } => info!(
                "Extracted {} of {} {} fields from {} in {}ms",
                count,
                profile.fields().len(),
                profile.name(),
                upload.name,
                report.elapsed_ms
            ),
            status => warn!("No values found in {}: {:?}", upload.name, status),
        }

        report
    }

    fn try_extract(&self, upload: &Upload, profile: &DomainProfile) -> Result<ExtractionReport> {
        match upload.kind {
            DocumentKind::Csv => extract_table(&upload.bytes, profile),
            DocumentKind::Image => {
                let image = image::load_from_memory(&upload.bytes)?;
                let text = self.recognize(&image)?;
                Ok(ExtractionReport::from_fields(
                    match_text(&text, profile),
                    SourceKind::Image,
                ))
            }
            DocumentKind::Pdf => {
                let (text, source) = self.pdf_text(&upload.bytes)?;
                Ok(ExtractionReport::from_fields(match_text(&text, profile), source))
            }
        }
    }

    fn recognize(&self, image: &image::DynamicImage) -> std::result::Result<String, OcrError> {
        self.recognizer
            .as_ref()
            .ok_or(OcrError::Unavailable)?
            .recognize(image)
    }

    /// Text layer first; OCR of embedded images when it is too short.
    fn pdf_text(&self, bytes: &[u8]) -> Result<(String, SourceKind)> {
        let pdf = PdfExtractor::from_bytes(bytes)?;

        let mut text = pdf.extract_text().unwrap_or_else(|e| {
            warn!("PDF text layer unreadable: {}", e);
            String::new()
        });

        let length = text.trim().chars().count();
        if length >= self.pdf.min_text_length {
            debug!("PDF text layer has {} chars", length);
            return Ok((text, SourceKind::PdfText));
        }

        if self.recognizer.is_none() {
            warn!("PDF text layer has {} chars and no recognizer is configured", length);
            return Ok((text, SourceKind::PdfText));
        }

        debug!("PDF text layer has {} chars, running OCR on embedded images", length);

        let page_count = pdf.page_count();
        let last_page = match self.pdf.max_pages {
            0 => page_count,
            max => page_count.min(max as u32),
        };

        let mut images = Vec::new();
        for page in 1..=last_page {
            match pdf.extract_images(page) {
                Ok(page_images) => images.extend(page_images),
                Err(e) => warn!("Skipping images on page {}: {}", page, e),
            }
        }
        // Loose images carry no page number, so `max_pages` caps their count.
        if images.is_empty() {
            debug!("No page images found, scanning all objects");
            images = pdf.extract_all_images();
            if self.pdf.max_pages > 0 {
                images.truncate(self.pdf.max_pages);
            }
        }
        if images.is_empty() {
            debug!("PDF has no images to OCR");
            return Ok((text, SourceKind::PdfText));
        }

        for (idx, image) in images.iter().enumerate() {
            match self.recognize(image) {
                Ok(ocr_text) => {
                    if !text.is_empty() && !text.ends_with('\n') {
                        text.push('\n');
                    }
                    text.push_str(&ocr_text);
                }
                Err(e) => warn!("OCR failed on image {}: {}", idx + 1, e),
            }
        }

        Ok((text, SourceKind::PdfOcr))
    }
}

impl Default for ReportExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field::FieldValue;
    use crate::models::profile::Domain;
    use crate::pdf::{loose_images_pdf, scanned_pdf, test_pdf, text_pdf, TestPage};
    use crate::profiles::builtin;
    use image::{DynamicImage, ImageFormat};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn png_upload() -> Upload {
        let mut png = Vec::new();
        DynamicImage::new_rgb8(16, 16)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        Upload::new("report.png", DocumentKind::Image, png)
    }

    fn reading(text: &'static str) -> Box<dyn TextRecognizer> {
        Box::new(move |_: &DynamicImage| Ok::<_, OcrError>(text.to_string()))
    }

    #[test]
    fn test_image_upload() {
        let extractor =
            ReportExtractor::new().with_recognizer(reading("Age: 45 years, TSH 3.2 mIU/L, T3 2.8 pg/mL"));
        let report = extractor.extract(&png_upload(), builtin(Domain::Thyroid));

        assert_eq!(report.source, Some(SourceKind::Image));
        assert_eq!(report.result.len(), 3);
        assert_eq!(report.result.get("age"), Some(&FieldValue::Number(45.0)));
        assert_eq!(report.result.get("TSH"), Some(&FieldValue::Number(3.2)));
        assert_eq!(report.result.get("T3"), Some(&FieldValue::Number(2.8)));
        assert!(report.message().starts_with("Extracted 3 values. Processed in "));
    }

    #[test]
    fn test_scanned_pdf_falls_back_to_ocr() {
        let extractor =
            ReportExtractor::new().with_recognizer(reading("Systolic 150 mmHg Diastolic 95 mmHg"));
        let upload = Upload::new("scan.pdf", DocumentKind::Pdf, scanned_pdf(40, 20));
        let report = extractor.extract(&upload, builtin(Domain::BloodPressure));

        assert_eq!(report.source, Some(SourceKind::PdfOcr));
        assert_eq!(report.result.len(), 2);
        assert_eq!(report.result.get("systolic"), Some(&FieldValue::Number(150.0)));
        assert_eq!(report.result.get("diastolic"), Some(&FieldValue::Number(95.0)));
    }

    /// Recognizer that counts its calls.
    fn counting(text: &'static str) -> (Box<dyn TextRecognizer>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let recognizer = move |_: &DynamicImage| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok::<_, OcrError>(text.to_string())
        };
        (Box::new(recognizer), calls)
    }

    fn never_called() -> Box<dyn TextRecognizer> {
        Box::new(|_: &DynamicImage| -> std::result::Result<String, OcrError> {
            panic!("text layer should have been used")
        })
    }

    fn two_page_scan() -> Upload {
        let page = TestPage {
            text: None,
            scan: Some((8, 8)),
        };
        Upload::new("scan.pdf", DocumentKind::Pdf, test_pdf(&[page, page]))
    }

    fn pages(max_pages: usize) -> PdfConfig {
        PdfConfig {
            min_text_length: 50,
            max_pages,
        }
    }

    #[test]
    fn test_pdf_text_layer_skips_ocr() {
        // 50 characters
        let line = "Report: Systolic 150 mmHg Diastolic 95 Pulse 88 ok";
        assert_eq!(line.len(), 50);

        let extractor = ReportExtractor::new().with_recognizer(never_called());
        let upload = Upload::new("report.pdf", DocumentKind::Pdf, text_pdf(line));
        let report = extractor.extract(&upload, builtin(Domain::BloodPressure));

        assert_eq!(report.source, Some(SourceKind::PdfText));
        assert_eq!(report.result.get("systolic"), Some(&FieldValue::Number(150.0)));
        assert_eq!(report.result.get("diastolic"), Some(&FieldValue::Number(95.0)));
        assert_eq!(report.result.get("pulse"), Some(&FieldValue::Number(88.0)));
    }

    #[test]
    fn test_short_text_layer_runs_ocr() {
        // 49 characters
        let line = "Report: Systolic 150 mmHg Diastolic 95 Pulse 88 o";
        assert_eq!(line.len(), 49);

        let (recognizer, calls) = counting("Weight 82 kg");
        let extractor = ReportExtractor::new().with_recognizer(recognizer);
        let bytes = test_pdf(&[TestPage {
            text: Some(line),
            scan: Some((16, 16)),
        }]);
        let report = extractor.extract(
            &Upload::new("report.pdf", DocumentKind::Pdf, bytes),
            builtin(Domain::BloodPressure),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.source, Some(SourceKind::PdfOcr));
        assert_eq!(report.result.get("systolic"), Some(&FieldValue::Number(150.0)));
        assert_eq!(report.result.get("weight"), Some(&FieldValue::Number(82.0)));
    }

    #[test]
    fn test_max_pages_limits_ocr() {
        let (recognizer, calls) = counting("TSH 4.4");
        let extractor = ReportExtractor::new()
            .with_recognizer(recognizer)
            .with_pdf_config(pages(1));
        let report = extractor.extract(&two_page_scan(), builtin(Domain::Thyroid));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.result.get("TSH"), Some(&FieldValue::Number(4.4)));
    }

    #[test]
    fn test_max_pages_zero_is_unlimited() {
        let (recognizer, calls) = counting("TSH 4.4");
        let extractor = ReportExtractor::new()
            .with_recognizer(recognizer)
            .with_pdf_config(pages(0));
        let report = extractor.extract(&two_page_scan(), builtin(Domain::Thyroid));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.result.get("TSH"), Some(&FieldValue::Number(4.4)));
    }

    #[test]
    fn test_loose_images_capped_by_max_pages() {
        let (recognizer, calls) = counting("TSH 4.4");
        let extractor = ReportExtractor::new()
            .with_recognizer(recognizer)
            .with_pdf_config(pages(2));
        let upload = Upload::new("scan.pdf", DocumentKind::Pdf, loose_images_pdf(5));
        let report = extractor.extract(&upload, builtin(Domain::Thyroid));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.source, Some(SourceKind::PdfOcr));
    }

    #[test]
    fn test_short_text_without_images_stays_text() {
        let extractor = ReportExtractor::new().with_recognizer(never_called());
        let upload = Upload::new("short.pdf", DocumentKind::Pdf, text_pdf("TSH 4.4 mIU/L"));
        let report = extractor.extract(&upload, builtin(Domain::Thyroid));

        assert_eq!(report.source, Some(SourceKind::PdfText));
        assert_eq!(report.result.get("TSH"), Some(&FieldValue::Number(4.4)));
    }

    #[test]
    fn test_corrupt_upload_is_soft_failure() {
        let extractor = ReportExtractor::new();
        let upload = Upload::new("broken.pdf", DocumentKind::Pdf, b"%PDF-garbage".to_vec());
        let report = extractor.extract(&upload, builtin(Domain::Thyroid));

        assert!(report.result.is_empty());
        assert!(matches!(report.status, ExtractionStatus::Failed { .. }));
        assert_eq!(report.message(), "No values found in document");
    }

    #[test]
    fn test_image_without_recognizer() {
        let report = ReportExtractor::new().extract(&png_upload(), builtin(Domain::Thyroid));
        assert!(report.result.is_empty());
        assert!(matches!(report.status, ExtractionStatus::Failed { .. }));
    }

    #[test]
    fn test_csv_upload() {
        let upload = Upload::new(
            "labs.csv",
            DocumentKind::Csv,
            b"age,gender,weight,height,systolic\n61,Female,82,165,142\n".to_vec(),
        );
        let report = ReportExtractor::new().extract(&upload, builtin(Domain::BloodPressure));
        assert_eq!(report.status, ExtractionStatus::Extracted { count: 5 });
        assert_eq!(report.result.get("gender"), Some(&FieldValue::Choice("Female".into())));
    }
}
