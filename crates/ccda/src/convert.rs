//! Converter orchestrator.
//!
//! Responsibilities:
//! - Find the document's `Composition` and build the resource index once.
//! - Walk `Composition.section` in order and build one [`CcdaSection`] per section.
//! - Dispatch each referenced resource to its entry builder.
//!
//! Notes:
//! - Conversion is a pure function of the bundle and the configuration; converting the same
//!   bundle twice yields equal trees.
//! - Structural problems with the document (no Composition, a section without a code, an
//!   unregistered section code under [`UnknownSectionPolicy::Reject`]) are the only errors.

use crate::code_systems::map_codeable_concept_to_code;
use crate::config::{ConverterConfig, UnknownSectionPolicy};
use crate::entries::{
    create_allergy_entry, create_condition_entry, create_encounter_entry, create_goal_entry, create_immunization_entry,
    create_medication_entry, create_observation_entry, create_procedure_entry, ConversionContext,
};
use crate::templates::section_template_ids;
use crate::types::{CcdaEntry, CcdaSection};
use crate::{CcdaError, CcdaResult};
use fhir::{Bundle, Composition, CompositionSection, Resource};

/// Converts one FHIR document bundle into C-CDA sections.
#[derive(Clone, Debug)]
pub struct FhirToCcdaConverter<'b> {
    composition: &'b Composition,
    context: ConversionContext<'b>,
}

impl<'b> FhirToCcdaConverter<'b> {
    /// Prepare a conversion of `bundle`.
    ///
    /// # Errors
    ///
    /// Returns [`CcdaError::MissingComposition`] when the bundle has no Composition.
    pub fn new(bundle: &'b Bundle, config: ConverterConfig) -> CcdaResult<Self> {
        let composition = bundle.composition().ok_or(CcdaError::MissingComposition)?;
        let context = ConversionContext::new(bundle, config);

        tracing::debug!(
            composition = ?composition.id,
            indexed = context.index().len(),
            "prepared FHIR to C-CDA conversion"
        );

        Ok(Self {
            composition,
            context,
        })
    }

    pub fn composition(&self) -> &'b Composition {
        self.composition
    }

    /// Convert every Composition section, in order.
    ///
    /// # Errors
    ///
    /// - [`CcdaError::MissingSectionCode`] when a section carries no code.
    /// - [`CcdaError::UnknownSectionCode`] when a section code has no registered template and
    ///   the configured policy is [`UnknownSectionPolicy::Reject`].
    pub fn convert(&self) -> CcdaResult<Vec<CcdaSection>> {
        let mut sections = Vec::new();

        for (position, section) in self
            .composition
            .section
            .as_deref()
            .unwrap_or_default()
            .iter()
            .enumerate()
        {
            if let Some(converted) = self.convert_section(position, section)? {
                sections.push(converted);
            }
        }

        Ok(sections)
    }

    fn convert_section(
        &self,
        position: usize,
        section: &CompositionSection,
    ) -> CcdaResult<Option<CcdaSection>> {
        let Some(code) = section.section_code() else {
            let label = section
                .title
                .clone()
                .unwrap_or_else(|| format!("section[{position}]"));
            return Err(CcdaError::MissingSectionCode(label));
        };

        let Some(template_id) = section_template_ids(code) else {
            return match self.context.config().unknown_sections() {
                UnknownSectionPolicy::Reject => Err(CcdaError::UnknownSectionCode(code.to_string())),
                UnknownSectionPolicy::Skip => {
                    tracing::warn!(code, title = ?section.title, "skipping unknown section");
                    Ok(None)
                }
            };
        };

        let resources = self
            .context
            .index()
            .resolve_all(section.entry.as_deref());
        let entry: Vec<CcdaEntry> = resources
            .iter()
            .filter_map(|resource| self.create_entry(section, resource))
            .collect();

        Ok(Some(CcdaSection {
            template_id,
            code: map_codeable_concept_to_code(section.code.as_ref()),
            title: section.title.clone(),
            entry,
            null_flavor: resources.is_empty().then(|| "NI".to_string()),
        }))
    }

    /// Build the entry for one resource listed in `section`.
    ///
    /// Returns `None` for resource types without an entry builder, and for resources the section
    /// does not take.
    pub fn create_entry(
        &self,
        section: &CompositionSection,
        resource: &Resource,
    ) -> Option<CcdaEntry> {
        let ctx = &self.context;
        let section_code = section.section_code();

        match resource {
            Resource::AllergyIntolerance(allergy) => Some(create_allergy_entry(ctx, allergy)),
            Resource::Encounter(encounter) => Some(create_encounter_entry(ctx, encounter)),
            Resource::Condition(condition) => create_condition_entry(ctx, section_code, condition),
            Resource::Goal(goal) => create_goal_entry(ctx, section_code, goal),
            Resource::Immunization(immunization) => {
                Some(create_immunization_entry(ctx, immunization))
            }
            Resource::MedicationRequest(request) => Some(create_medication_entry(ctx, request)),
            Resource::Procedure(procedure) => Some(create_procedure_entry(ctx, procedure)),
            Resource::Observation(observation) => Some(create_observation_entry(ctx, observation)),
            other => {
                tracing::debug!(
                    resource_type = other.resource_type(),
                    id = ?other.id(),
                    section = ?section_code,
                    "no entry builder for resource"
                );
                None
            }
        }
    }
}

/// Convert `bundle` to C-CDA sections in one call.
pub fn convert_fhir_to_ccda(bundle: &Bundle, config: ConverterConfig) -> CcdaResult<Vec<CcdaSection>> {
    FhirToCcdaConverter::new(bundle, config)?.convert()
}
