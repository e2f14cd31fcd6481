//! WASM bindings for lab report extraction.
//!
//! The browser runs OCR and PDF text extraction itself and hands over text,
//! or passes CSV bytes straight through. Classifiers run through Tract from
//! model bytes the page fetches alongside their manifest.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use vitalscan_core::extract::{extract_table, match_text, ExtractionReport, ExtractionResult, SourceKind};
use vitalscan_core::models::profile::{Domain, DomainProfile};
use vitalscan_core::ocr::{OcrResult, TextBox};
use vitalscan_core::predict::{bmi, bmi_category, classifier_from_bytes};
use vitalscan_core::profiles;
use vitalscan_core::{advice_for, classify, FormState, OnnxRiskClassifier, TractBackend};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Machine names of the built-in predictors.
#[wasm_bindgen]
pub fn domains() -> js_sys::Array {
    Domain::ALL.iter().map(|d| JsValue::from_str(d.as_str())).collect()
}

/// Extract a domain's fields from report text: a PDF text layer when
/// `from_pdf` is set, otherwise OCR output of an image.
#[wasm_bindgen]
pub fn extract_from_text(domain: &str, text: &str, from_pdf: bool) -> Result<JsValue, JsValue> {
    let profile = builtin(domain)?;
    to_js(&report_from_text(text, profile, text_source(from_pdf)))
}

/// Extract a domain's fields from an uploaded CSV file.
#[wasm_bindgen]
pub fn extract_from_csv(domain: &str, bytes: &[u8]) -> Result<JsValue, JsValue> {
    let profile = builtin(domain)?;
    to_js(&report_from_csv(bytes, profile))
}

/// A pre-filled CSV the extractor accepts in full.
#[wasm_bindgen]
pub fn csv_template(domain: &str) -> Result<String, JsValue> {
    vitalscan_core::csv_template(builtin(domain)?).map_err(js_error)
}

/// Canned interpretation for a predicted label.
#[wasm_bindgen]
pub fn advice(domain: &str, label: &str) -> Result<JsValue, JsValue> {
    to_js(&advice_for(parse_domain(domain)?, label))
}

/// "Healthy" or "Check BMI" for weight in kg and height in cm.
#[wasm_bindgen]
pub fn bmi_label(weight_kg: f64, height_cm: f64) -> Option<String> {
    bmi(weight_kg, height_cm).map(|b| bmi_category(b).label().to_string())
}

/// Predictor form for one browser session.
#[wasm_bindgen]
pub struct FormSession {
    form: FormState,
}

#[wasm_bindgen]
impl FormSession {
    #[wasm_bindgen(constructor)]
    pub fn new(domain: &str) -> Result<FormSession, JsValue> {
        Ok(Self {
            form: FormState::new(builtin(domain)?.clone()),
        })
    }

    /// Extract from text and merge the values into the form.
    #[wasm_bindgen]
    pub fn upload_text(&mut self, text: &str, from_pdf: bool) -> Result<JsValue, JsValue> {
        let report = report_from_text(text, self.form.profile(), text_source(from_pdf));
        self.form.apply(&report.result);
        to_js(&report)
    }

    /// Extract from CSV bytes and merge the values into the form.
    #[wasm_bindgen]
    pub fn upload_csv(&mut self, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let report = report_from_csv(bytes, self.form.profile());
        self.form.apply(&report.result);
        to_js(&report)
    }

    /// Set a field from user input; rejects values outside the field's domain.
    #[wasm_bindgen]
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), JsValue> {
        self.form.set_raw(field, value).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.form.clear();
    }

    /// Current values in form order, with defaults filled in.
    #[wasm_bindgen]
    pub fn values(&self) -> Result<JsValue, JsValue> {
        to_js(&form_rows(&self.form))
    }

    /// Current values as a JSON string.
    #[wasm_bindgen]
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&form_rows(&self.form)).map_err(js_error)
    }
}

/// A trained risk classifier loaded from ONNX bytes and its JSON manifest.
#[wasm_bindgen]
pub struct Classifier {
    inner: OnnxRiskClassifier<TractBackend>,
}

#[wasm_bindgen]
impl Classifier {
    #[wasm_bindgen(constructor)]
    pub fn new(model_bytes: &[u8], manifest_json: &str) -> Result<Classifier, JsValue> {
        let inner = classifier_from_bytes(model_bytes, manifest_json).map_err(js_error)?;
        Ok(Self { inner })
    }

    /// Feature names in model input order.
    #[wasm_bindgen(js_name = featureNames)]
    pub fn feature_names(&self) -> js_sys::Array {
        self.inner
            .manifest()
            .feature_names
            .iter()
            .map(|name| JsValue::from_str(name))
            .collect()
    }

    /// Classify the session's current form values.
    #[wasm_bindgen]
    pub fn predict(&self, session: &FormSession) -> Result<JsValue, JsValue> {
        to_js(&classify(&session.form, &self.inner).map_err(js_error)?)
    }
}

/// Boxes reported by browser-side OCR.
#[wasm_bindgen]
pub struct OcrBoxes {
    boxes: Vec<TextBox>,
    width: u32,
    height: u32,
}

#[wasm_bindgen]
impl OcrBoxes {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            boxes: Vec::new(),
            width,
            height,
        }
    }

    /// Add one axis-aligned text box.
    #[wasm_bindgen]
    pub fn add_box(&mut self, text: &str, x: f32, y: f32, w: f32, h: f32, confidence: f32) {
        self.boxes.push(TextBox {
            bbox: [x, y, x + w, y, x + w, y + h, x, y + h],
            text: text.to_string(),
            confidence,
        });
    }

    /// Boxes joined in reading order, one line per row.
    #[wasm_bindgen]
    pub fn text(&self) -> String {
        OcrResult::new(self.boxes.clone(), (self.width, self.height)).text
    }

    /// Extract a domain's fields from the recognized text.
    #[wasm_bindgen]
    pub fn extract(&self, domain: &str) -> Result<JsValue, JsValue> {
        let profile = builtin(domain)?;
        let fields = match_text(&self.text(), profile);
        let result = ExtractionResult::from_reports(&fields);
        to_js(&serde_json::json!({ "result": result, "fields": fields }))
    }
}

#[derive(Serialize)]
struct FormRow<'a> {
    field: &'a str,
    value: &'a vitalscan_core::FieldValue,
    uploaded: bool,
}

fn form_rows(form: &FormState) -> Vec<FormRow<'_>> {
    form.values()
        .into_iter()
        .map(|(field, value)| FormRow {
            field,
            value,
            uploaded: form.is_uploaded(field),
        })
        .collect()
}

fn report_from_text(text: &str, profile: &DomainProfile, source: SourceKind) -> ExtractionReport {
    let report = ExtractionReport::from_fields(match_text(text, profile), source);
    log_outcome(&report);
    report
}

fn report_from_csv(bytes: &[u8], profile: &DomainProfile) -> ExtractionReport {
    let report = extract_table(bytes, profile)
        .unwrap_or_else(|e| ExtractionReport::failed(e.to_string(), Some(SourceKind::Csv)));
    log_outcome(&report);
    report
}

fn text_source(from_pdf: bool) -> SourceKind {
    if from_pdf {
        SourceKind::PdfText
    } else {
        SourceKind::Image
    }
}

fn log_outcome(report: &ExtractionReport) {
    if !report.has_values() {
        web_sys::console::warn_1(&JsValue::from_str(&report.message()));
    }
}

fn parse_domain(domain: &str) -> Result<Domain, JsValue> {
    domain.parse().map_err(js_error)
}

fn builtin(domain: &str) -> Result<&'static DomainProfile, JsValue> {
    Ok(profiles::builtin(parse_domain(domain)?))
}

/// Plain objects rather than ES maps, so results survive `JSON.stringify`.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_error)
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_text_report() {
        let profile = builtin("thyroid").unwrap();
        let report = report_from_text("Age: 45, TSH: 3.2 mIU/L, FTI: 110", profile, SourceKind::PdfText);
        assert_eq!(report.result.len(), 3);
        assert_eq!(report.source, Some(SourceKind::PdfText));
    }

    #[wasm_bindgen_test]
    fn test_form_session_upload_and_edit() {
        let mut session = FormSession::new("thyroid").unwrap();
        session.upload_csv(b"age,TSH,T3,T4,TT4\n45,3.2,2.8,8.1,95\n").unwrap();
        session.set("FTI", "110").unwrap();
        assert!(session.set("FTI", "5000").is_err());

        let rows = form_rows(&session.form);
        assert_eq!(rows.len(), 7);
        assert!(rows[0].uploaded);
        assert!(!rows[6].uploaded);
    }

    #[wasm_bindgen_test]
    fn test_ocr_boxes_reading_order() {
        let mut boxes = OcrBoxes::new(200, 100);
        boxes.add_box("3.2", 60.0, 10.0, 30.0, 12.0, 0.9);
        boxes.add_box("TSH", 10.0, 10.0, 30.0, 12.0, 0.9);
        boxes.add_box("Age 45", 10.0, 50.0, 50.0, 12.0, 0.9);
        assert_eq!(boxes.text(), "TSH 3.2\nAge 45");
    }

    #[wasm_bindgen_test]
    fn test_classifier_rejects_bad_inputs() {
        assert!(Classifier::new(b"", "{}").is_err());

        let manifest = r#"{"feature_names": ["age", "TSH"], "class_names": ["Normal"]}"#;
        assert!(Classifier::new(b"not an onnx model", manifest).is_err());
    }

    #[wasm_bindgen_test]
    fn test_bmi_label() {
        assert_eq!(bmi_label(70.0, 170.0).as_deref(), Some("Healthy"));
        assert_eq!(bmi_label(70.0, 0.0), None);
    }
}
