//! FHIR input model for the C-CDA converter.
//!
//! This crate provides the **read side** of the FHIR boundary: plain-data structs for the
//! datatypes and resources the converter consumes, and parsing of a document `Bundle` from
//! JSON or YAML.
//!
//! This crate focuses on:
//! - FHIR R4 semantic alignment for the subset of fields the converter reads
//! - deserialisation with precise error paths
//! - typed dispatch on `resourceType`
//!
//! Unlike an on-disk wire format, FHIR resources are open content: fields this crate does
//! not model are ignored rather than rejected.

pub mod bundle;
pub mod datatypes;
pub mod resources;

pub use bundle::{Bundle, BundleEntry};
pub use datatypes::{
    CodeableConcept, Coding, Extension, Identifier, Narrative, Period, Quantity, Reference,
};
pub use resources::{
    AllergyIntolerance, AllergyReaction, Composition, CompositionSection, Condition,
    DispenseRequest, DoseAndRate, Dosage, Encounter, EncounterDiagnosis, EncounterParticipant,
    Goal, GoalTarget, Immunization, Location, Medication, MedicationRequest, Observation,
    OtherResource, Patient, Procedure, Resource, Timing, TimingRepeat,
};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
