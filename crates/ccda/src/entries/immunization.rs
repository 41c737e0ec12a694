//! Immunization Activity entries.

use super::ConversionContext;
use crate::code_systems::map_codeable_concept_to_code;
use crate::datetime::map_effective_date;
use crate::identifiers::{collect_identifiers, map_identifiers};
use crate::status::map_immunization_status;
use crate::templates::Template;
use crate::types::{
    CcdaConsumable, CcdaEntry, CcdaManufacturedMaterial, CcdaManufacturedProduct,
    CcdaOrganization, CcdaStatusCode, CcdaSubstanceAdministration, ManufacturedProductClassCode,
    MoodCode, SubstanceAdministrationClassCode,
};
use fhir::{Immunization, Reference};

/// Build the Immunization Activity entry for an immunization.
pub fn create_immunization_entry(
    ctx: &ConversionContext<'_>,
    immunization: &Immunization,
) -> CcdaEntry {
    let material = CcdaManufacturedMaterial {
        code: map_codeable_concept_to_code(immunization.vaccine_code.as_ref())
            .into_iter()
            .collect(),
        lot_number_text: immunization.lot_number.clone().map(|lot| vec![lot]),
    };

    let product = CcdaManufacturedProduct {
        class_code: Some(ManufacturedProductClassCode::ManufacturedProduct),
        template_id: Template::ImmunizationMedicationInformation.undated_then_dated(),
        manufactured_material: vec![material],
        manufacturer_organization: immunization
            .manufacturer
            .as_ref()
            .map(|manufacturer| vec![manufacturer_organization(manufacturer)]),
        manufactured_labeled_drug: None,
    };

    CcdaEntry::SubstanceAdministration(CcdaSubstanceAdministration {
        class_code: SubstanceAdministrationClassCode::SubstanceAdministration,
        mood_code: MoodCode::Event,
        negation_ind: Some(false),
        template_id: Template::ImmunizationActivity.undated_then_dated(),
        id: map_identifiers(
            immunization.id.as_deref(),
            immunization.identifier.as_deref(),
            immunization,
        ),
        code: None,
        text: ctx.text(immunization.extension.as_deref()),
        status_code: Some(CcdaStatusCode::new(map_immunization_status(
            immunization.status.as_deref(),
        ))),
        effective_time: map_effective_date(immunization.occurrence_date_time.as_deref()),
        route_code: None,
        dose_quantity: None,
        consumable: CcdaConsumable {
            type_code: None,
            manufactured_product: vec![product],
        },
        entry_relationship: None,
    })
}

// The manufacturer is taken from the reference itself (element id, logical identifier and
// display), not from a resolved Organization.
pub(crate) fn manufacturer_organization(manufacturer: &Reference) -> CcdaOrganization {
    CcdaOrganization {
        id: collect_identifiers(
            manufacturer.id.as_deref(),
            manufacturer.identifier.as_ref().map(std::slice::from_ref),
        ),
        name: manufacturer.display.clone().map(|name| vec![name]),
    }
}
