//! Procedure Activity entries.
//!
//! A FHIR Procedure whose primary code is a non-interventional service (education, counselling,
//! referral and the like) becomes a Procedure Activity Act. Anything else becomes a Procedure
//! Activity Procedure carrying the body site and the performing location.

use super::participant::map_location_participant;
use super::{first, ConversionContext};
use crate::code_systems::map_codeable_concept_to_code;
use crate::datetime::map_effective_time;
use crate::identifiers::map_identifiers;
use crate::templates::Template;
use crate::types::{
    ActClassCode, CcdaAct, CcdaEntry, CcdaProcedure, CcdaStatusCode, MoodCode,
    ProcedureClassCode,
};
use fhir::Procedure;

/// SNOMED CT codes rendered as `act` rather than `procedure`.
const ACT_PROCEDURE_CODES: &[&str] = &[
    "183948003", // patient education
    "409063005", // counseling
    "311331002", // patient counseling
    "61310001",  // nutrition education
    "183945009", // referral to specialist
    "309814009", // discharge planning
    "278373008", // home visit
    "410606002", // social service procedure
    "183933003", // social work assessment
    "24642003",  // psychiatry procedure
    "225338006", // physiotherapy
    "128939004", // first aid
];

fn is_act_procedure(procedure: &Procedure) -> bool {
    procedure
        .code
        .as_ref()
        .and_then(|code| code.first_code())
        .is_some_and(|code| ACT_PROCEDURE_CODES.contains(&code))
}

/// Build the Procedure Activity entry for a procedure.
pub fn create_procedure_entry(ctx: &ConversionContext<'_>, procedure: &Procedure) -> CcdaEntry {
    let id = map_identifiers(
        procedure.id.as_deref(),
        procedure.identifier.as_deref(),
        procedure,
    );
    let code = map_codeable_concept_to_code(procedure.code.as_ref());
    let text = ctx.text(procedure.extension.as_deref());
    let effective_time = map_effective_time(
        procedure.performed_date_time.as_deref(),
        procedure.performed_period.as_ref(),
    );

    if is_act_procedure(procedure) {
        return CcdaEntry::Act(CcdaAct {
            class_code: ActClassCode::Act,
            mood_code: MoodCode::Event,
            template_id: Template::ProcedureActivityAct.undated_then_dated(),
            id,
            code,
            text,
            status_code: Some(CcdaStatusCode::completed()),
            effective_time,
            entry_relationship: None,
        });
    }

    CcdaEntry::Procedure(CcdaProcedure {
        class_code: ProcedureClassCode::Procedure,
        mood_code: MoodCode::Event,
        template_id: Template::ProcedureActivityProcedure.undated_then_dated(),
        id,
        code,
        text,
        status_code: Some(CcdaStatusCode::completed()),
        effective_time,
        target_site_code: map_codeable_concept_to_code(first(procedure.body_site.as_deref())),
        participant: map_location_participant(ctx, procedure.location.as_ref())
            .into_iter()
            .collect(),
    })
}
