//! Uploaded documents and their type detection.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractionError, Result};

/// Supported upload kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Csv,
    Image,
    Pdf,
}

impl DocumentKind {
    /// Kind from a declared MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.split(';').next().unwrap_or_default().trim().to_lowercase();
        match mime.as_str() {
            "text/csv" | "application/csv" => Some(Self::Csv),
            "application/pdf" => Some(Self::Pdf),
            m if m.starts_with("image/") => Some(Self::Image),
            _ => None,
        }
    }

    /// Kind from a file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            _ => None,
        }
    }

    /// Kind from magic bytes. CSV has no signature and is never sniffed.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            Some(Self::Pdf)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) || bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// One uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, kind: DocumentKind, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind,
            bytes,
        }
    }

    /// Build an upload, resolving its kind from the declared MIME type,
    /// then the name's extension, then the content.
    pub fn detect(name: impl Into<String>, mime: Option<&str>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let kind = mime
            .and_then(DocumentKind::from_mime)
            .or_else(|| DocumentKind::from_extension(Path::new(&name)))
            .or_else(|| DocumentKind::sniff(&bytes))
            .ok_or_else(|| ExtractionError::UnsupportedFormat(name.clone()))?;
        Ok(Self { name, kind, bytes })
    }

    /// Read a file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::detect(name, None, bytes)
    }
}
