//! # C-CDA conversion core
//!
//! Converts a FHIR document `Bundle` into the entry tree of a Consolidated CDA document.
//!
//! This crate contains the pure transform only:
//! - OID constants and the code system and template registries
//! - temporal, identifier and CodeableConcept mapping helpers
//! - the bundle resolver (an index over the bundle's resources)
//! - one entry builder per supported clinical construct
//! - the converter that walks the Composition's sections
//!
//! **No I/O**: loading bundles and emitting XML belong to the caller. The output tree serialises
//! with `@_`-prefixed keys that an XML emitter reads as attributes.

pub mod code_systems;
pub mod config;
pub mod convert;
pub mod datetime;
pub mod entries;
pub mod identifiers;
pub mod narrative;
pub mod oids;
pub mod resolver;
pub mod status;
pub mod templates;
pub mod types;

pub use config::{ConverterConfig, UnknownSectionPolicy, DEFAULT_NARRATIVE_REFERENCE_URL};
pub use convert::{convert_fhir_to_ccda, FhirToCcdaConverter};
pub use resolver::ResourceIndex;
pub use types::{CcdaEntry, CcdaEntryRelationship, CcdaSection};

#[derive(Debug, thiserror::Error)]
pub enum CcdaError {
    #[error("bundle does not contain a Composition")]
    MissingComposition,
    #[error("composition section has no code: {0}")]
    MissingSectionCode(String),
    #[error("unknown section code: {0}")]
    UnknownSectionCode(String),
    #[error("invalid converter configuration: {0}")]
    InvalidConfig(String),
}

pub type CcdaResult<T> = std::result::Result<T, CcdaError>;
