//! FHIR document Bundle parsing.
//!
//! Responsibilities:
//! - Parse a `Bundle` from JSON or YAML text
//! - Report schema mismatches with the path of the failing field
//! - Reject documents whose `resourceType` is not `Bundle`
//!
//! Notes:
//! - Entries without a `resource` are kept; they simply contribute nothing to resolution
//! - Resource types outside the modelled set are kept as [`crate::OtherResource`]

use crate::{Composition, FhirError, FhirResult, Resource};
use serde::Deserialize;

// ============================================================================
// Public types
// ============================================================================

/// A FHIR Bundle, typically of type `document`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bundle {
    pub id: Option<String>,
    pub type_: Option<String>,
    pub entry: Vec<BundleEntry>,
}

/// One entry of a [`Bundle`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    pub full_url: Option<String>,
    pub resource: Option<Resource>,
}

// ============================================================================
// Internal wire type
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleWire {
    resource_type: String,
    id: Option<String>,
    #[serde(rename = "type")]
    type_: Option<String>,
    #[serde(default)]
    entry: Vec<BundleEntry>,
}

// ============================================================================
// Public Bundle operations
// ============================================================================

impl Bundle {
    /// Build a bundle directly from resources, with no `fullUrl` on any entry.
    pub fn from_resources(resources: impl IntoIterator<Item = Resource>) -> Self {
        Self {
            id: None,
            type_: Some("document".to_string()),
            entry: resources
                .into_iter()
                .map(|resource| BundleEntry {
                    full_url: None,
                    resource: Some(resource),
                })
                .collect(),
        }
    }

    /// Parse a bundle from JSON text.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort "path" (e.g. `entry[2].resource`)
    /// to the failing field when the JSON does not match the expected shape.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the text is not well-formed JSON,
    /// - any modelled field has an unexpected type,
    /// - `resourceType` is not "Bundle".
    pub fn from_json(json_text: &str) -> FhirResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);
        let wire = match serde_path_to_error::deserialize::<_, BundleWire>(&mut deserializer) {
            Ok(parsed) => parsed,
            Err(err) => return Err(schema_mismatch(err)),
        };
        deserializer.end()?;

        Self::from_wire(wire)
    }

    /// Parse a bundle from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] under the same conditions as [`Bundle::from_json`].
    pub fn from_yaml(yaml_text: &str) -> FhirResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let wire = match serde_path_to_error::deserialize::<_, BundleWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => return Err(schema_mismatch(err)),
        };

        Self::from_wire(wire)
    }

    /// Iterate over the resources carried by this bundle, skipping empty entries.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().filter_map(|entry| entry.resource.as_ref())
    }

    /// The first Composition in the bundle.
    pub fn composition(&self) -> Option<&Composition> {
        self.resources().find_map(|resource| match resource {
            Resource::Composition(composition) => Some(composition),
            _ => None,
        })
    }

    fn from_wire(wire: BundleWire) -> FhirResult<Self> {
        if wire.resource_type != "Bundle" {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Bundle', got '{}'",
                wire.resource_type
            )));
        }

        Ok(Self {
            id: wire.id,
            type_: wire.type_,
            entry: wire.entry,
        })
    }
}

fn schema_mismatch<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> FhirError {
    let path = err.path().to_string();
    let source = err.into_inner();
    let path = if path.is_empty() || path == "." {
        "<root>"
    } else {
        path.as_str()
    };
    FhirError::Translation(format!("Bundle schema mismatch at {path}: {source}"))
}
