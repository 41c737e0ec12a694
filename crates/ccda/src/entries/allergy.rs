//! Allergy Concern entries.
//!
//! An AllergyIntolerance becomes an Allergy Concern Act wrapping one Allergy Observation. The
//! observation names the allergen through a consumable participant and, when the resource lists
//! a reaction, carries a Reaction Observation with its severity.
//!
//! Only the first reaction is rendered. A reaction severity outside mild/moderate/severe leaves
//! the Severity Observation out.

use super::{first, ConversionContext};
use crate::code_systems::{map_codeable_concept_to_code, map_codeable_concept_to_value};
use crate::datetime::{map_effective_period, map_effective_time};
use crate::identifiers::map_identifiers;
use crate::oids::{OID_ACT_CLASS_CODE_SYSTEM, OID_ACT_CODE_CODE_SYSTEM, OID_SNOMED_CT_CODE_SYSTEM};
use crate::status::map_allergy_status;
use crate::templates::Template;
use crate::types::{
    ActClassCode, CcdaAct, CcdaCode, CcdaEntry, CcdaEntryRelationship, CcdaObservation,
    CcdaParticipant, CcdaParticipantRole, CcdaPlayingEntity, CcdaStatusCode, CcdaValue,
    EntityClassCode, MoodCode, ObservationClassCode, ParticipationTypeCode, RelationshipTypeCode,
    RoleClassCode,
};
use fhir::{AllergyIntolerance, AllergyReaction, CodeableConcept};

const SNOMED_NO_KNOWN_ALLERGY: &str = "716186003";

/// Build the Allergy Concern Act for an allergy or intolerance.
pub fn create_allergy_entry(ctx: &ConversionContext<'_>, allergy: &AllergyIntolerance) -> CcdaEntry {
    let clinical_status = allergy
        .clinical_status
        .as_ref()
        .and_then(CodeableConcept::first_code);

    CcdaEntry::Act(CcdaAct {
        class_code: ActClassCode::Act,
        mood_code: MoodCode::Event,
        template_id: Template::AllergyConcernAct.undated_then_dated(),
        id: map_identifiers(allergy.id.as_deref(), allergy.identifier.as_deref(), allergy),
        code: Some(CcdaCode {
            code: Some("CONC".to_string()),
            code_system: Some(OID_ACT_CLASS_CODE_SYSTEM.to_string()),
            ..Default::default()
        }),
        text: ctx.text(allergy.extension.as_deref()),
        status_code: Some(CcdaStatusCode::new(map_allergy_status(clinical_status))),
        effective_time: map_effective_period(allergy.recorded_date.as_deref(), None, false),
        entry_relationship: Some(vec![CcdaEntryRelationship::new(
            RelationshipTypeCode::Subject,
            CcdaEntry::Observation(allergy_observation(ctx, allergy)),
        )]),
    })
}

fn assertion_code() -> CcdaCode {
    CcdaCode {
        code: Some("ASSERTION".to_string()),
        code_system: Some(OID_ACT_CODE_CODE_SYSTEM.to_string()),
        ..Default::default()
    }
}

fn allergy_observation(ctx: &ConversionContext<'_>, allergy: &AllergyIntolerance) -> CcdaObservation {
    let onset_start = allergy
        .onset_period
        .as_ref()
        .and_then(|period| period.start.as_deref())
        .or(allergy.onset_date_time.as_deref());
    let onset_end = allergy
        .onset_period
        .as_ref()
        .and_then(|period| period.end.as_deref());

    CcdaObservation {
        class_code: ObservationClassCode::Observation,
        mood_code: MoodCode::Event,
        template_id: Template::AllergyObservation.undated_then_dated(),
        id: map_identifiers(
            allergy.id.as_deref(),
            allergy.identifier.as_deref(),
            &("AllergyObservation", allergy),
        ),
        code: Some(assertion_code()),
        text: ctx.text(allergy.extension.as_deref()),
        status_code: Some(CcdaStatusCode::completed()),
        effective_time: map_effective_period(onset_start, onset_end, true),
        value: Some(allergy_category(allergy.category.as_deref())),
        participant: Some(vec![allergen_participant(ctx, allergy.code.as_ref())]),
        entry_relationship: first(allergy.reaction.as_deref()).map(|reaction| {
            vec![CcdaEntryRelationship {
                type_code: RelationshipTypeCode::Manifestation,
                inversion_ind: Some(true),
                entry: CcdaEntry::Observation(reaction_observation(ctx, allergy, reaction)),
            }]
        }),
    }
}

/// The allergy type value, from the first category.
fn allergy_category(category: Option<&[String]>) -> CcdaValue {
    let (code, display_name) = match first(category).map(String::as_str) {
        Some("food") => ("414285001", "Allergy to food (finding)"),
        Some("medication") => ("419511003", "Propensity to adverse reactions to drug (finding)"),
        Some("environment") => ("426232007", "Environmental allergy (finding)"),
        Some("biologic") => (
            "418038007",
            "Propensity to adverse reactions to substance (finding)",
        ),
        _ => ("419199007", "Allergy to substance (disorder)"),
    };
    CcdaValue::Coded(CcdaCode::fixed(
        code,
        display_name,
        OID_SNOMED_CT_CODE_SYSTEM,
        "SNOMED CT",
    ))
}

/// The allergen as a consumable participant. "No known allergy" renders as `nullFlavor="NA"`.
fn allergen_participant(
    ctx: &ConversionContext<'_>,
    allergen: Option<&CodeableConcept>,
) -> CcdaParticipant {
    let code = if allergen.and_then(CodeableConcept::first_code) == Some(SNOMED_NO_KNOWN_ALLERGY) {
        Some(CcdaCode::null_flavor("NA"))
    } else {
        let original_text = ctx.text(allergen.and_then(|c| c.extension.as_deref()));
        match (map_codeable_concept_to_code(allergen), original_text) {
            (Some(code), original_text) => Some(CcdaCode {
                original_text,
                ..code
            }),
            (None, Some(original_text)) => Some(CcdaCode {
                original_text: Some(original_text),
                ..Default::default()
            }),
            (None, None) => None,
        }
    };

    CcdaParticipant {
        type_code: ParticipationTypeCode::Consumable,
        participant_role: CcdaParticipantRole {
            class_code: RoleClassCode::ManufacturedProduct,
            template_id: Vec::new(),
            id: Vec::new(),
            code: None,
            playing_entity: Some(CcdaPlayingEntity {
                class_code: EntityClassCode::ManufacturedMaterial,
                code,
                name: None,
            }),
        },
    }
}

fn reaction_observation(
    ctx: &ConversionContext<'_>,
    allergy: &AllergyIntolerance,
    reaction: &AllergyReaction,
) -> CcdaObservation {
    let manifestation = first(reaction.manifestation.as_deref());

    CcdaObservation {
        class_code: ObservationClassCode::Observation,
        mood_code: MoodCode::Event,
        template_id: Template::ReactionObservation.undated_then_dated(),
        id: map_identifiers(reaction.id.as_deref(), None, &("ReactionObservation", reaction)),
        code: Some(assertion_code()),
        text: ctx.text(manifestation.and_then(|m| m.extension.as_deref())),
        status_code: Some(CcdaStatusCode::completed()),
        effective_time: map_effective_time(
            allergy.onset_date_time.as_deref(),
            allergy.onset_period.as_ref(),
        ),
        value: map_codeable_concept_to_value(manifestation),
        participant: None,
        entry_relationship: severity_observation(ctx, reaction).map(|severity| {
            vec![CcdaEntryRelationship {
                type_code: RelationshipTypeCode::Subject,
                inversion_ind: Some(true),
                entry: CcdaEntry::Observation(severity),
            }]
        }),
    }
}

fn severity_observation(
    ctx: &ConversionContext<'_>,
    reaction: &AllergyReaction,
) -> Option<CcdaObservation> {
    let (code, display_name) = match reaction.severity.as_deref()? {
        "mild" => ("255604002", "Mild"),
        "moderate" => ("6736007", "Moderate"),
        "severe" => ("24484000", "Severe"),
        other => {
            tracing::debug!(severity = other, "unrecognised reaction severity");
            return None;
        }
    };

    Some(CcdaObservation {
        class_code: ObservationClassCode::Observation,
        mood_code: MoodCode::Event,
        template_id: Template::SeverityObservation.undated_then_dated(),
        id: Vec::new(),
        code: Some(CcdaCode {
            code: Some("SEV".to_string()),
            code_system: Some(OID_ACT_CODE_CODE_SYSTEM.to_string()),
            code_system_name: Some("ActCode".to_string()),
            ..Default::default()
        }),
        text: ctx.text(reaction.extension.as_deref()),
        status_code: Some(CcdaStatusCode::completed()),
        effective_time: None,
        value: Some(CcdaValue::Coded(CcdaCode::fixed(
            code,
            display_name,
            OID_SNOMED_CT_CODE_SYSTEM,
            "SNOMED CT",
        ))),
        participant: None,
        entry_relationship: None,
    })
}
