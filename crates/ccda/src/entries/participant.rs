//! Location participants.

use super::{first, ConversionContext};
use crate::code_systems::map_codeable_concept_to_code;
use crate::identifiers::map_identifiers;
use crate::templates::Template;
use crate::types::{
    CcdaParticipant, CcdaParticipantRole, CcdaPlayingEntity, EntityClassCode,
    ParticipationTypeCode, RoleClassCode,
};
use fhir::{EncounterParticipant, Reference, Resource};

/// Map one `Encounter.participant` to a CDA participant.
///
/// Every participant is rendered as a service delivery location (`typeCode="LOC"`); the FHIR
/// participant type only feeds the role `code`.
// TODO: confirm the fixed LOC typeCode against the C-CDA IG participant bindings.
pub fn map_encounter_participant(participant: &EncounterParticipant) -> CcdaParticipant {
    CcdaParticipant {
        type_code: ParticipationTypeCode::Location,
        participant_role: CcdaParticipantRole {
            class_code: RoleClassCode::ServiceDeliveryLocation,
            template_id: vec![Template::ServiceDeliveryLocation.undated()],
            id: Vec::new(),
            code: map_codeable_concept_to_code(first(participant.type_.as_deref())),
            playing_entity: None,
        },
    }
}

/// Resolve a reference to an in-bundle `Location` and map it to a CDA participant.
pub fn map_location_participant(
    ctx: &ConversionContext<'_>,
    reference: Option<&Reference>,
) -> Option<CcdaParticipant> {
    let Resource::Location(location) = ctx.index().resolve(reference)? else {
        tracing::debug!(
            reference = ?reference.and_then(|r| r.reference.as_deref()),
            "location reference does not point at a Location"
        );
        return None;
    };

    Some(CcdaParticipant {
        type_code: ParticipationTypeCode::Location,
        participant_role: CcdaParticipantRole {
            class_code: RoleClassCode::ServiceDeliveryLocation,
            template_id: vec![Template::ServiceDeliveryLocation.undated()],
            id: map_identifiers(
                location.id.as_deref(),
                location.identifier.as_deref(),
                location,
            ),
            code: map_codeable_concept_to_code(first(location.type_.as_deref())),
            playing_entity: Some(CcdaPlayingEntity {
                class_code: EntityClassCode::Place,
                code: None,
                name: location.name.clone().map(|name| vec![name]),
            }),
        },
    })
}
