//! PDF text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, ImageBuffer, Rgb};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Create an extractor and load `data` into it.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    fn try_extract_image_from_object(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
        let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
        trace!("Found image object: {}x{}", width, height);

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.last().and_then(|o| o.as_name().ok()),
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    trace!("Decoding JPEG image");
                    return image::load_from_memory_with_format(
                        &stream.content,
                        image::ImageFormat::Jpeg,
                    )
                    .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Unsupported image filter {:?}", filter_name.map(String::from_utf8_lossy));
                    return None;
                }
                _ => {}
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);

        if bits != 8 {
            trace!("Unsupported bits per component: {}", bits);
            return None;
        }

        decode_raw(&data, width, height, color_space)
    }

    /// Resources dictionary for a page, walking up the page tree.
    fn get_page_resources(&self, doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
        let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                return Some(res_dict.clone());
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.get_page_resources(doc, *parent_id),
            _ => None,
        }
    }
}

fn decode_raw(data: &[u8], width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;

    match color_space {
        b"DeviceRGB" | b"RGB" => {
            let expected = pixels.checked_mul(3)?;
            if data.len() < expected {
                return None;
            }
            ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, data[..expected].to_vec())
                .map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" => {
            if data.len() < pixels {
                return None;
            }
            image::GrayImage::from_raw(width, height, data[..pixels].to_vec())
                .map(DynamicImage::ImageLuma8)
        }
        other => {
            trace!("Unsupported color space: {}", String::from_utf8_lossy(other));
            None
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Empty user password is the common case for "protected" reports.
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        self.document()?;
        // pdf-extract panics on some malformed content streams.
        catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(&self.raw_data)
        }))
        .map_err(|_| PdfError::TextExtraction("text extractor panicked".to_string()))?
        .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;

        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();

        if let Some(resources) = self.get_page_resources(doc, *page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, obj)) = doc.dereference(obj_ref) {
                            if let Some(img) = self.try_extract_image_from_object(doc, obj) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }

    fn extract_all_images(&self) -> Vec<DynamicImage> {
        let Some(doc) = self.document.as_ref() else {
            return vec![];
        };

        let images: Vec<DynamicImage> = doc
            .objects
            .values()
            .filter_map(|object| self.try_extract_image_from_object(doc, object))
            .collect();

        debug!("Found {} images in document", images.len());
        images
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use lopdf::{dictionary, Stream};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    /// One page of a test PDF: a line of Helvetica text, a JPEG scan, or both.
    #[derive(Clone, Copy, Default)]
    pub(crate) struct TestPage<'a> {
        pub text: Option<&'a str>,
        pub scan: Option<(u32, u32)>,
    }

    /// One-page PDF whose only content is a JPEG image.
    pub(crate) fn scanned_pdf(width: u32, height: u32) -> Vec<u8> {
        test_pdf(&[TestPage {
            text: None,
            scan: Some((width, height)),
        }])
    }

    /// One-page PDF with a single line of text and no images.
    pub(crate) fn text_pdf(text: &str) -> Vec<u8> {
        test_pdf(&[TestPage {
            text: Some(text),
            scan: None,
        }])
    }

    pub(crate) fn test_pdf(pages: &[TestPage]) -> Vec<u8> {
        build_pdf(pages, 0)
    }

    /// `count` images that no page references, on a single empty page.
    pub(crate) fn loose_images_pdf(count: usize) -> Vec<u8> {
        build_pdf(&[TestPage::default()], count)
    }

    fn jpeg_stream(width: u32, height: u32) -> Stream {
        let mut jpeg = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([250, 250, 250])))
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        let mut image = Stream::new(
            dictionary! {
                "Type" => Object::Name(b"XObject".to_vec()),
                "Subtype" => Object::Name(b"Image".to_vec()),
                "Width" => Object::Integer(width as i64),
                "Height" => Object::Integer(height as i64),
                "ColorSpace" => Object::Name(b"DeviceRGB".to_vec()),
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => Object::Name(b"DCTDecode".to_vec()),
                "Length" => Object::Integer(jpeg.len() as i64),
            },
            jpeg,
        );
        image.allows_compression = false;
        image
    }

    fn build_pdf(pages: &[TestPage], loose_images: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");

        let font_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Font".to_vec()),
            "Subtype" => Object::Name(b"Type1".to_vec()),
            "BaseFont" => Object::Name(b"Helvetica".to_vec()),
        });

        let mut page_ids = Vec::new();
        for page in pages {
            let mut content = String::new();
            let mut resources = Dictionary::new();

            if let Some((width, height)) = page.scan {
                let image_id = doc.add_object(Object::Stream(jpeg_stream(width, height)));
                content.push_str(&format!("q {} 0 0 {} 0 0 cm /Im1 Do Q\n", width, height));
                resources.set("XObject", dictionary! { "Im1" => Object::Reference(image_id) });
            }
            if let Some(text) = page.text {
                let escaped = text
                    .replace('\\', "\\\\")
                    .replace('(', "\\(")
                    .replace(')', "\\)");
                content.push_str(&format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET\n", escaped));
                resources.set("Font", dictionary! { "F1" => Object::Reference(font_id) });
            }

            let content_id =
                doc.add_object(Object::Stream(Stream::new(dictionary! {}, content.into_bytes())));
            page_ids.push(doc.add_object(dictionary! {
                "Type" => Object::Name(b"Page".to_vec()),
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => Object::Reference(content_id),
                "Resources" => resources,
            }));
        }

        for i in 0..loose_images {
            doc.add_object(Object::Stream(jpeg_stream(8 + i as u32, 8)));
        }

        let pages_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Pages".to_vec()),
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => Object::Integer(page_ids.len() as i64),
        });

        for page_id in &page_ids {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(*page_id) {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.extract_text().is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            PdfExtractor::from_bytes(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_page_images_extracted() {
        let extractor = PdfExtractor::from_bytes(&scanned_pdf(64, 32)).unwrap();
        assert_eq!(extractor.page_count(), 1);

        let images = extractor.extract_images(1).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].width(), images[0].height()), (64, 32));

        assert!(matches!(
            extractor.extract_images(2),
            Err(PdfError::InvalidPage(2))
        ));
    }

    #[test]
    fn test_text_layer_and_page_images() {
        let bytes = test_pdf(&[
            TestPage {
                text: Some("Systolic 150 mmHg"),
                scan: None,
            },
            TestPage {
                text: None,
                scan: Some((16, 16)),
            },
        ]);
        let extractor = PdfExtractor::from_bytes(&bytes).unwrap();
        assert_eq!(extractor.page_count(), 2);
        assert!(extractor.extract_text().unwrap().contains("Systolic 150 mmHg"));
        assert!(extractor.extract_images(1).unwrap().is_empty());
        assert_eq!(extractor.extract_images(2).unwrap().len(), 1);
    }

    #[test]
    fn test_loose_images_found_outside_page_tree() {
        let extractor = PdfExtractor::from_bytes(&loose_images_pdf(3)).unwrap();
        assert!(extractor.extract_images(1).unwrap().is_empty());
        assert_eq!(extractor.extract_all_images().len(), 3);
    }

    #[test]
    fn test_raw_gray_decoding() {
        let img = decode_raw(&[0, 128, 255, 64], 2, 2, b"DeviceGray").unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert!(decode_raw(&[0, 1], 2, 2, b"DeviceGray").is_none());
        assert!(decode_raw(&[0; 12], 2, 2, b"DeviceCMYK").is_none());
    }
}
