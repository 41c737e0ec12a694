//! Converter configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the converter. Conversion itself never reads environment variables, so two
//! conversions with the same bundle and configuration always agree.

use crate::{CcdaError, CcdaResult};
use std::str::FromStr;

/// Extension URL carrying an entry's link into the section narrative.
pub const DEFAULT_NARRATIVE_REFERENCE_URL: &str =
    "https://medplum.com/fhir/StructureDefinition/ccda-narrative-reference";

/// What to do with a Composition section whose LOINC code has no registered template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownSectionPolicy {
    /// Fail the conversion.
    #[default]
    Reject,
    /// Drop the section and log a warning.
    Skip,
}

impl FromStr for UnknownSectionPolicy {
    type Err = CcdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(UnknownSectionPolicy::Reject),
            "skip" => Ok(UnknownSectionPolicy::Skip),
            other => Err(CcdaError::InvalidConfig(format!(
                "unknown section policy '{other}' (expected 'reject' or 'skip')"
            ))),
        }
    }
}

/// Converter configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterConfig {
    narrative_reference_url: String,
    unknown_sections: UnknownSectionPolicy,
}

impl ConverterConfig {
    /// Create a new `ConverterConfig`.
    pub fn new(
        narrative_reference_url: String,
        unknown_sections: UnknownSectionPolicy,
    ) -> CcdaResult<Self> {
        if narrative_reference_url.trim().is_empty() {
            return Err(CcdaError::InvalidConfig(
                "narrative_reference_url cannot be empty".into(),
            ));
        }

        Ok(Self {
            narrative_reference_url,
            unknown_sections,
        })
    }

    pub fn narrative_reference_url(&self) -> &str {
        &self.narrative_reference_url
    }

    pub fn unknown_sections(&self) -> UnknownSectionPolicy {
        self.unknown_sections
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            narrative_reference_url: DEFAULT_NARRATIVE_REFERENCE_URL.to_string(),
            unknown_sections: UnknownSectionPolicy::default(),
        }
    }
}

/// Parse the unknown-section policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`UnknownSectionPolicy::Reject`].
pub fn unknown_section_policy_from_env_value(
    value: Option<String>,
) -> CcdaResult<UnknownSectionPolicy> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<UnknownSectionPolicy>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}

/// Resolve the narrative reference URL from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_NARRATIVE_REFERENCE_URL`].
pub fn narrative_reference_url_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_NARRATIVE_REFERENCE_URL.to_string())
}
