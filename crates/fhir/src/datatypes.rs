//! FHIR R4 general-purpose datatypes.
//!
//! Only the elements the converter reads are modelled. Every element is optional because FHIR
//! allows any of them to be missing, and the converter treats absence as a normal path rather
//! than an error.

use serde::Deserialize;

/// A reference to a code defined by a terminology system.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    pub system: Option<String>,
    pub version: Option<String>,
    pub code: Option<String>,
    pub display: Option<String>,
}

impl Coding {
    /// Build a coding from a system URL, a code and a display string.
    pub fn new(system: &str, code: &str, display: &str) -> Self {
        Self {
            system: Some(system.to_string()),
            version: None,
            code: Some(code.to_string()),
            display: Some(display.to_string()),
        }
    }
}

/// A concept that may be defined by one or more codings, plus optional free text.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeableConcept {
    pub extension: Option<Vec<Extension>>,
    pub coding: Option<Vec<Coding>>,
    pub text: Option<String>,
}

impl CodeableConcept {
    /// Build a concept from a list of codings.
    pub fn from_codings(coding: Vec<Coding>) -> Self {
        Self {
            extension: None,
            coding: Some(coding),
            text: None,
        }
    }

    /// The codings of this concept, or an empty slice when none are present.
    pub fn codings(&self) -> &[Coding] {
        self.coding.as_deref().unwrap_or_default()
    }

    /// The primary (first) coding.
    pub fn first_coding(&self) -> Option<&Coding> {
        self.codings().first()
    }

    /// The code of the primary coding.
    pub fn first_code(&self) -> Option<&str> {
        self.first_coding().and_then(|c| c.code.as_deref())
    }
}

/// A business identifier: a value that is unique within a system.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    pub system: Option<String>,
    pub value: Option<String>,
}

impl Identifier {
    pub fn new(system: &str, value: &str) -> Self {
        Self {
            system: Some(system.to_string()),
            value: Some(value.to_string()),
        }
    }
}

/// A time range defined by start and/or end dateTimes.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl Period {
    /// True when neither bound is set.
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// A reference from one resource to another.
///
/// `reference` is a literal reference (`ResourceType/id`, `urn:uuid:...`, or an absolute URL);
/// `identifier` is a logical reference used when no literal reference is available. `id` is the
/// element id of the reference itself, not the id of its target.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub id: Option<String>,
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub identifier: Option<Identifier>,
    pub display: Option<String>,
}

impl Reference {
    /// Build a literal reference.
    pub fn to(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }
}

/// An extension with a string value.
///
/// Other `value[x]` types are ignored; the converter only reads string-valued extensions.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub url: String,
    pub value_string: Option<String>,
}

impl Extension {
    pub fn string(url: &str, value: &str) -> Self {
        Self {
            url: url.to_string(),
            value_string: Some(value.to_string()),
        }
    }
}

/// Human-readable XHTML summary of a resource or section.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub status: Option<String>,
    pub div: Option<String>,
}

/// A measured amount.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quantity {
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub system: Option<String>,
    pub code: Option<String>,
}
