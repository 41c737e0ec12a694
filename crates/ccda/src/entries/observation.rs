//! Observation entries.
//!
//! Responsibilities:
//! - Pick the observation template from the observation code, then from its first category.
//! - Render the observation value as `PQ`, `CD` or `ST`.
//!
//! Notes:
//! - Organizers (vital-sign and result panels) are not built here; each Observation is a
//!   standalone entry.

use super::ConversionContext;
use crate::code_systems::{map_codeable_concept_to_code, map_codeable_concept_to_value};
use crate::datetime::map_effective_time;
use crate::identifiers::map_identifiers;
use crate::templates::Template;
use crate::types::{
    CcdaEntry, CcdaObservation, CcdaStatusCode, CcdaTemplateId, CcdaValue, MoodCode,
    ObservationClassCode,
};
use fhir::{CodeableConcept, Observation};

const LOINC_SMOKING_STATUS: &str = "72166-2";
const LOINC_TOBACCO_USE: &str = "11367-0";
const LOINC_ADMINISTRATIVE_SEX: &str = "46098-0";
const LOINC_BIRTH_SEX: &str = "76689-9";

const CATEGORY_EXAM: &str = "exam";
const CATEGORY_LABORATORY: &str = "laboratory";

const SEX_OBSERVATION_EXTENSION: &str = "2023-06-28";

fn observation_templates(observation: &Observation) -> Vec<CcdaTemplateId> {
    let code = observation
        .code
        .as_ref()
        .and_then(CodeableConcept::first_code);

    match code {
        Some(LOINC_SMOKING_STATUS) => return Template::SmokingStatusObservation.undated_then_dated(),
        Some(LOINC_TOBACCO_USE) => return Template::TobaccoUseObservation.undated_then_dated(),
        Some(LOINC_ADMINISTRATIVE_SEX) => {
            return vec![Template::SexObservation.dated_as(SEX_OBSERVATION_EXTENSION)]
        }
        Some(LOINC_BIRTH_SEX) => return Template::BirthSexObservation.undated_then_dated(),
        _ => {}
    }

    match observation.first_category_code() {
        Some(CATEGORY_EXAM) => Template::ProcedureActivityObservation.undated_then_dated(),
        Some(CATEGORY_LABORATORY) => Template::ResultObservation.undated_then_dated(),
        _ => Template::VitalSignObservation.undated_then_dated(),
    }
}

fn observation_value(observation: &Observation) -> Option<CcdaValue> {
    if let Some(quantity) = &observation.value_quantity {
        return Some(CcdaValue::Quantity {
            value: quantity.value.map(|value| value.to_string()),
            unit: quantity.unit.clone(),
        });
    }

    if let Some(value) = map_codeable_concept_to_value(observation.value_codeable_concept.as_ref()) {
        return Some(value);
    }

    observation
        .value_string
        .clone()
        .map(|text| CcdaValue::Text { text })
}

/// Build the observation entry for an Observation.
pub fn create_observation_entry(
    ctx: &ConversionContext<'_>,
    observation: &Observation,
) -> CcdaEntry {
    CcdaEntry::Observation(CcdaObservation {
        class_code: ObservationClassCode::Observation,
        mood_code: MoodCode::Event,
        template_id: observation_templates(observation),
        id: map_identifiers(
            observation.id.as_deref(),
            observation.identifier.as_deref(),
            observation,
        ),
        code: map_codeable_concept_to_code(observation.code.as_ref()),
        text: ctx.text(observation.extension.as_deref()),
        status_code: Some(CcdaStatusCode::completed()),
        effective_time: map_effective_time(
            observation.effective_date_time.as_deref(),
            observation.effective_period.as_ref(),
        ),
        value: observation_value(observation),
        participant: None,
        entry_relationship: None,
    })
}
