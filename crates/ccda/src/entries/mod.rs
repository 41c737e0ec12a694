//! Entry builders.
//!
//! One builder per clinical construct. Each takes the resource plus the shared
//! [`ConversionContext`] and returns the CDA fragment for it. Builders never fail: optional
//! source data that is missing leaves the corresponding output element out, and references that
//! do not resolve drop the dependent fragment.

pub mod allergy;
pub mod condition;
pub mod encounter;
pub mod goal;
pub mod immunization;
pub mod medication;
pub mod observation;
pub mod participant;
pub mod procedure;

pub use allergy::create_allergy_entry;
pub use condition::{create_condition_entry, create_health_concern_entry, create_problem_entry};
pub use encounter::{create_encounter_diagnosis, create_encounter_entry};
pub use goal::create_goal_entry;
pub use immunization::create_immunization_entry;
pub use medication::create_medication_entry;
pub use observation::create_observation_entry;
pub use participant::{map_encounter_participant, map_location_participant};
pub use procedure::create_procedure_entry;

use crate::config::ConverterConfig;
use crate::narrative::text_from_extensions;
use crate::resolver::ResourceIndex;
use crate::types::CcdaText;
use fhir::{Bundle, Extension};

/// Read-only state shared by every builder during one conversion.
#[derive(Clone, Debug)]
pub struct ConversionContext<'b> {
    index: ResourceIndex<'b>,
    config: ConverterConfig,
}

impl<'b> ConversionContext<'b> {
    pub fn new(bundle: &'b Bundle, config: ConverterConfig) -> Self {
        Self {
            index: ResourceIndex::new(bundle),
            config,
        }
    }

    pub fn index(&self) -> &ResourceIndex<'b> {
        &self.index
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Entry `text` from the configured narrative reference extension.
    pub fn text(&self, extensions: Option<&[Extension]>) -> Option<CcdaText> {
        text_from_extensions(extensions, self.config.narrative_reference_url())
    }
}

/// First element of an optional repeating FHIR element.
pub(crate) fn first<T>(items: Option<&[T]>) -> Option<&T> {
    items.and_then(<[T]>::first)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ConversionContext;
    use crate::config::{ConverterConfig, DEFAULT_NARRATIVE_REFERENCE_URL};
    use fhir::{Bundle, Extension, Resource};

    pub fn context(bundle: &Bundle) -> ConversionContext<'_> {
        ConversionContext::new(bundle, ConverterConfig::default())
    }

    pub fn bundle_of(resources: Vec<Resource>) -> Bundle {
        Bundle::from_resources(resources)
    }

    pub fn narrative(value: &str) -> Option<Vec<Extension>> {
        Some(vec![Extension::string(DEFAULT_NARRATIVE_REFERENCE_URL, value)])
    }
}
