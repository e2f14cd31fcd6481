//! Data models for field specifications, profiles and configuration.

pub mod config;
pub mod field;
pub mod profile;

pub use config::{ClassifierConfig, ExtractionConfig, OcrConfig, PdfConfig, VitalConfig};
pub use field::{FieldSpec, FieldSpecDef, FieldValue, UnitConversion, ValueDomain};
pub use profile::{DerivedFeature, Domain, DomainProfile, ProfileDef};
