//! Problem Concern and Health Concern entries.
//!
//! A Condition is rendered differently depending on the section that lists it: as a problem
//! concern wrapping a Problem Observation in the Problems section, and as a Health Concern Act
//! in the Health Concerns section. Any other section takes no Condition entry.

use super::ConversionContext;
use crate::code_systems::map_codeable_concept_to_value;
use crate::datetime::map_effective_period;
use crate::identifiers::map_identifiers;
use crate::oids::{OID_ACT_CLASS_CODE_SYSTEM, OID_LOINC_CODE_SYSTEM, OID_SNOMED_CT_CODE_SYSTEM};
use crate::status::map_problem_status;
use crate::templates::{Template, LOINC_HEALTH_CONCERNS_SECTION, LOINC_PROBLEMS_SECTION};
use crate::types::{
    ActClassCode, CcdaAct, CcdaCode, CcdaEntry, CcdaEntryRelationship, CcdaObservation,
    CcdaStatusCode, MoodCode, ObservationClassCode, RelationshipTypeCode,
};
use fhir::{CodeableConcept, Condition};

const LOINC_CONDITION: &str = "75323-6";
const SNOMED_PROBLEM: &str = "55607006";

/// Build the entry for a Condition listed in the section with code `section_code`.
pub fn create_condition_entry(
    ctx: &ConversionContext<'_>,
    section_code: Option<&str>,
    condition: &Condition,
) -> Option<CcdaEntry> {
    match section_code {
        Some(LOINC_PROBLEMS_SECTION) => Some(create_problem_entry(ctx, condition)),
        Some(LOINC_HEALTH_CONCERNS_SECTION) => Some(create_health_concern_entry(condition)),
        _ => {
            tracing::debug!(
                section = ?section_code,
                condition = ?condition.id,
                "section does not take Condition entries"
            );
            None
        }
    }
}

fn concern_status(condition: &Condition) -> CcdaStatusCode {
    let clinical_status = condition
        .clinical_status
        .as_ref()
        .and_then(CodeableConcept::first_code);
    CcdaStatusCode::new(map_problem_status(clinical_status))
}

/// Problem Concern Act with a nested Problem Observation.
pub fn create_problem_entry(ctx: &ConversionContext<'_>, condition: &Condition) -> CcdaEntry {
    let observation = CcdaObservation {
        class_code: ObservationClassCode::Observation,
        mood_code: MoodCode::Event,
        template_id: Template::ProblemObservation.undated_then_dated(),
        id: map_identifiers(
            None,
            condition.identifier.as_deref(),
            &("ProblemObservation", condition),
        ),
        code: Some(
            CcdaCode::fixed(SNOMED_PROBLEM, "Problem", OID_SNOMED_CT_CODE_SYSTEM, "SNOMED CT")
                .with_translation(CcdaCode::fixed(
                    LOINC_CONDITION,
                    "Condition",
                    OID_LOINC_CODE_SYSTEM,
                    "LOINC",
                )),
        ),
        text: ctx.text(condition.extension.as_deref()),
        status_code: Some(CcdaStatusCode::completed()),
        effective_time: map_effective_period(
            condition.onset_date_time.as_deref(),
            condition.abatement_date_time.as_deref(),
            false,
        ),
        value: map_codeable_concept_to_value(condition.code.as_ref()),
        participant: None,
        entry_relationship: None,
    };

    CcdaEntry::Act(CcdaAct {
        class_code: ActClassCode::Act,
        mood_code: MoodCode::Event,
        template_id: Template::ProblemConcernAct.undated_then_dated(),
        id: map_identifiers(condition.id.as_deref(), None, condition),
        code: Some(CcdaCode {
            code: Some("CONC".to_string()),
            code_system: Some(OID_ACT_CLASS_CODE_SYSTEM.to_string()),
            ..Default::default()
        }),
        text: None,
        status_code: Some(concern_status(condition)),
        effective_time: map_effective_period(condition.recorded_date.as_deref(), None, false),
        entry_relationship: Some(vec![CcdaEntryRelationship::new(
            RelationshipTypeCode::Subject,
            CcdaEntry::Observation(observation),
        )]),
    })
}

/// Health Concern Act.
pub fn create_health_concern_entry(condition: &Condition) -> CcdaEntry {
    CcdaEntry::Act(CcdaAct {
        class_code: ActClassCode::Act,
        mood_code: MoodCode::Event,
        template_id: vec![
            Template::HealthConcernAct.dated_as("2015-08-01"),
            Template::HealthConcernAct.dated_as("2022-06-01"),
        ],
        id: map_identifiers(condition.id.as_deref(), None, condition),
        code: Some(CcdaCode::fixed(
            LOINC_HEALTH_CONCERNS_SECTION,
            "Health Concern",
            OID_LOINC_CODE_SYSTEM,
            "LOINC",
        )),
        text: None,
        status_code: Some(concern_status(condition)),
        effective_time: map_effective_period(condition.recorded_date.as_deref(), None, false),
        entry_relationship: None,
    })
}
