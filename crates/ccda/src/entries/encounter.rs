//! Encounter Activity entries and their diagnoses.

use super::participant::map_encounter_participant;
use super::{first, ConversionContext};
use crate::code_systems::{map_codeable_concept_to_code, map_codeable_concept_to_value};
use crate::datetime::{map_effective_period, map_effective_time};
use crate::identifiers::map_identifiers;
use crate::oids::{OID_LOINC_CODE_SYSTEM, OID_SNOMED_CT_CODE_SYSTEM};
use crate::templates::Template;
use crate::types::{
    ActClassCode, CcdaAct, CcdaCode, CcdaEncounter, CcdaEntry, CcdaEntryRelationship,
    CcdaObservation, CcdaStatusCode, EncounterClassCode, MoodCode, ObservationClassCode,
    RelationshipTypeCode,
};
use fhir::{Encounter, EncounterDiagnosis, Resource};

const LOINC_DIAGNOSIS: &str = "29308-4";
const SNOMED_DIAGNOSIS_INTERPRETATION: &str = "282291009";

fn diagnosis_code() -> CcdaCode {
    CcdaCode::fixed(LOINC_DIAGNOSIS, "Diagnosis", OID_LOINC_CODE_SYSTEM, "LOINC")
}

/// Build the Encounter Activity entry for an encounter.
pub fn create_encounter_entry(ctx: &ConversionContext<'_>, encounter: &Encounter) -> CcdaEntry {
    let participant: Option<Vec<_>> = encounter
        .participant
        .as_ref()
        .map(|participants| participants.iter().map(map_encounter_participant).collect());

    let entry_relationship: Option<Vec<_>> = encounter.diagnosis.as_ref().map(|diagnoses| {
        diagnoses
            .iter()
            .filter_map(|diagnosis| create_encounter_diagnosis(ctx, diagnosis))
            .collect()
    });

    CcdaEntry::Encounter(CcdaEncounter {
        class_code: EncounterClassCode::Encounter,
        mood_code: MoodCode::Event,
        template_id: Template::EncounterActivity.undated_then_dated(),
        id: map_identifiers(
            encounter.id.as_deref(),
            encounter.identifier.as_deref(),
            encounter,
        ),
        code: map_codeable_concept_to_code(first(encounter.type_.as_deref())),
        text: ctx.text(encounter.extension.as_deref()),
        effective_time: map_effective_time(None, encounter.period.as_ref()),
        participant,
        entry_relationship,
    })
}

/// Build the `REFR` encounter diagnosis act for one `Encounter.diagnosis`.
///
/// Returns `None` when the diagnosis does not reference a `Condition` in the bundle.
pub fn create_encounter_diagnosis(
    ctx: &ConversionContext<'_>,
    diagnosis: &EncounterDiagnosis,
) -> Option<CcdaEntryRelationship> {
    let reference = diagnosis.condition.as_ref();
    let Some(Resource::Condition(condition)) = ctx.index().resolve(reference) else {
        tracing::debug!(
            reference = ?reference.and_then(|r| r.reference.as_deref()),
            "dropping encounter diagnosis: no Condition in bundle"
        );
        return None;
    };

    let problem_observation = CcdaObservation {
        class_code: ObservationClassCode::Observation,
        mood_code: MoodCode::Event,
        template_id: Template::ProblemObservation.dated_then_undated(),
        id: map_identifiers(
            condition.id.as_deref(),
            condition.identifier.as_deref(),
            condition,
        ),
        code: Some(
            CcdaCode::fixed(
                SNOMED_DIAGNOSIS_INTERPRETATION,
                "Diagnosis interpretation",
                OID_SNOMED_CT_CODE_SYSTEM,
                "SNOMED CT",
            )
            .with_translation(diagnosis_code()),
        ),
        text: None,
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

    let act = CcdaAct {
        class_code: ActClassCode::Act,
        mood_code: MoodCode::Event,
        template_id: Template::EncounterActivity.dated_then_undated(),
        id: Vec::new(),
        code: Some(diagnosis_code()),
        text: None,
        status_code: None,
        effective_time: None,
        entry_relationship: Some(vec![CcdaEntryRelationship::new(
            RelationshipTypeCode::Subject,
            CcdaEntry::Observation(problem_observation),
        )]),
    };

    Some(CcdaEntryRelationship::new(
        RelationshipTypeCode::Refers,
        CcdaEntry::Act(act),
    ))
}
