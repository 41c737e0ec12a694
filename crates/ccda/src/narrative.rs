//! Links from entries into the section narrative.
//!
//! A resource points at its row in the human-readable section text through a string extension
//! holding the narrative element id.

use crate::types::{CcdaReference, CcdaText};
use fhir::Extension;

/// Find the narrative reference carried by `extensions` under `url`.
pub fn narrative_reference(extensions: Option<&[Extension]>, url: &str) -> Option<CcdaReference> {
    let value = extensions?
        .iter()
        .find(|extension| extension.url == url)?
        .value_string
        .as_deref()
        .filter(|value| !value.is_empty())?;

    let value = if value.starts_with('#') {
        value.to_string()
    } else {
        format!("#{value}")
    };
    Some(CcdaReference { value })
}

/// Build an entry `text` element from the narrative reference extension, if present.
pub fn text_from_extensions(extensions: Option<&[Extension]>, url: &str) -> Option<CcdaText> {
    narrative_reference(extensions, url).map(|reference| CcdaText { reference })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_NARRATIVE_REFERENCE_URL;

    #[test]
    fn prefixes_hash_when_missing() {
        let extensions = vec![Extension::string(DEFAULT_NARRATIVE_REFERENCE_URL, "encounter-1")];
        let text =
            text_from_extensions(Some(extensions.as_slice()), DEFAULT_NARRATIVE_REFERENCE_URL)
                .expect("text");
        assert_eq!(text.reference.value, "#encounter-1");
    }

    #[test]
    fn keeps_existing_hash() {
        let extensions = vec![Extension::string(DEFAULT_NARRATIVE_REFERENCE_URL, "#row-2")];
        let reference =
            narrative_reference(Some(extensions.as_slice()), DEFAULT_NARRATIVE_REFERENCE_URL)
                .expect("reference");
        assert_eq!(reference.value, "#row-2");
    }

    #[test]
    fn hash_is_never_doubled() {
        for value in ["row-3", "#row-3"] {
            let extensions = vec![Extension::string(DEFAULT_NARRATIVE_REFERENCE_URL, value)];
            let reference =
                narrative_reference(Some(extensions.as_slice()), DEFAULT_NARRATIVE_REFERENCE_URL)
                    .expect("reference");
            assert_eq!(reference.value, "#row-3", "extension value {value:?}");
        }
    }

    #[test]
    fn empty_value_is_no_reference() {
        let extensions = vec![Extension::string(DEFAULT_NARRATIVE_REFERENCE_URL, "")];
        assert!(
            narrative_reference(Some(extensions.as_slice()), DEFAULT_NARRATIVE_REFERENCE_URL)
                .is_none()
        );
    }

    #[test]
    fn ignores_other_extensions() {
        let extensions = vec![Extension::string("http://example.org/other", "x")];
        assert!(
            text_from_extensions(Some(extensions.as_slice()), DEFAULT_NARRATIVE_REFERENCE_URL)
                .is_none()
        );
        assert!(text_from_extensions(None, DEFAULT_NARRATIVE_REFERENCE_URL).is_none());
    }
}
