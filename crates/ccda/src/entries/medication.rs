//! Medication Activity entries.
//!
//! Responsibilities:
//! - Render a MedicationRequest as a Medication Activity `substanceAdministration`.
//! - Take the drug from a contained Medication, then a referenced in-bundle Medication, then
//!   `medicationCodeableConcept`.
//! - Attach one free-text sig component per dosage instruction that links into the narrative.
//!
//! Notes:
//! - Only the first dosage instruction supplies timing, route and dose.
//! - The requester is not rendered; author participations are out of scope.

use super::immunization::manufacturer_organization;
use super::{first, ConversionContext};
use crate::code_systems::map_codeable_concept_to_code;
use crate::datetime::map_effective_time;
use crate::identifiers::map_identifiers;
use crate::oids::OID_LOINC_CODE_SYSTEM;
use crate::status::map_medication_status;
use crate::templates::Template;
use crate::types::{
    CcdaCode, CcdaConsumable, CcdaEffectiveTime, CcdaEntry, CcdaEntryRelationship,
    CcdaLabeledDrug, CcdaManufacturedMaterial, CcdaManufacturedProduct, CcdaQuantity,
    CcdaStatusCode, CcdaSubstanceAdministration, ConsumableTypeCode,
    ManufacturedProductClassCode, MoodCode, RelationshipTypeCode,
    SubstanceAdministrationClassCode,
};
use fhir::{Dosage, Medication, MedicationRequest, Quantity, Resource};

const LOINC_MEDICATION_INSTRUCTIONS: &str = "76662-6";

/// Build the Medication Activity entry for a medication request.
pub fn create_medication_entry(
    ctx: &ConversionContext<'_>,
    request: &MedicationRequest,
) -> CcdaEntry {
    let medication = request_medication(ctx, request);
    let dosage = first(request.dosage_instruction.as_deref());

    CcdaEntry::SubstanceAdministration(CcdaSubstanceAdministration {
        class_code: SubstanceAdministrationClassCode::SubstanceAdministration,
        mood_code: MoodCode::Event,
        negation_ind: None,
        template_id: Template::MedicationActivity.dated_then_undated(),
        id: map_identifiers(request.id.as_deref(), request.identifier.as_deref(), request),
        code: None,
        text: ctx.text(request.extension.as_deref()),
        status_code: Some(CcdaStatusCode::new(map_medication_status(
            request.status.as_deref(),
        ))),
        effective_time: medication_effective_time(request, dosage),
        route_code: map_codeable_concept_to_code(dosage.and_then(|d| d.route.as_ref())),
        dose_quantity: dosage.and_then(dose_quantity),
        consumable: CcdaConsumable {
            type_code: Some(ConsumableTypeCode::Consumable),
            manufactured_product: vec![medication_information(ctx, request, medication)],
        },
        entry_relationship: free_text_sigs(ctx, request.dosage_instruction.as_deref()),
    })
}

fn request_medication<'a>(
    ctx: &ConversionContext<'a>,
    request: &'a MedicationRequest,
) -> Option<&'a Medication> {
    if let Some(medication) = request.contained_medication() {
        return Some(medication);
    }

    match ctx.index().resolve(request.medication_reference.as_ref())? {
        Resource::Medication(medication) => Some(medication),
        other => {
            tracing::debug!(
                request = ?request.id,
                resource_type = other.resource_type(),
                "medication reference does not point at a Medication"
            );
            None
        }
    }
}

fn medication_effective_time(
    request: &MedicationRequest,
    dosage: Option<&Dosage>,
) -> Option<Vec<CcdaEffectiveTime>> {
    let mut effective_time = request
        .dispense_request
        .as_ref()
        .and_then(|dispense| map_effective_time(None, dispense.validity_period.as_ref()))
        .unwrap_or_default();

    let repeat = dosage
        .and_then(|d| d.timing.as_ref())
        .and_then(|timing| timing.repeat.as_ref());
    if let Some(period) = repeat.and_then(|repeat| repeat.period) {
        effective_time.push(CcdaEffectiveTime::periodic(CcdaQuantity {
            value: Some(period.to_string()),
            unit: repeat.and_then(|repeat| repeat.period_unit.clone()),
        }));
    }

    (!effective_time.is_empty()).then_some(effective_time)
}

fn dose_quantity(dosage: &Dosage) -> Option<CcdaQuantity> {
    let quantity: &Quantity = first(dosage.dose_and_rate.as_deref())?
        .dose_quantity
        .as_ref()?;
    Some(CcdaQuantity {
        value: quantity.value.map(|value| value.to_string()),
        unit: quantity.unit.clone(),
    })
}

fn medication_information(
    ctx: &ConversionContext<'_>,
    request: &MedicationRequest,
    medication: Option<&Medication>,
) -> CcdaManufacturedProduct {
    let concept = medication
        .and_then(|m| m.code.as_ref())
        .or(request.medication_codeable_concept.as_ref());
    let original_text = ctx.text(medication.and_then(|m| m.extension.as_deref()));

    let code = match (map_codeable_concept_to_code(concept), original_text) {
        (Some(code), original_text) => Some(CcdaCode {
            original_text,
            ..code
        }),
        (None, Some(original_text)) => Some(CcdaCode {
            original_text: Some(original_text),
            ..Default::default()
        }),
        (None, None) => None,
    };

    CcdaManufacturedProduct {
        class_code: Some(ManufacturedProductClassCode::ManufacturedProduct),
        template_id: Template::MedicationInformation.dated_then_undated(),
        manufactured_material: vec![CcdaManufacturedMaterial {
            code: code.into_iter().collect(),
            lot_number_text: None,
        }],
        manufacturer_organization: medication
            .and_then(|m| m.manufacturer.as_ref())
            .map(|manufacturer| vec![manufacturer_organization(manufacturer)]),
        manufactured_labeled_drug: None,
    }
}

fn free_text_sigs(
    ctx: &ConversionContext<'_>,
    dosage_instruction: Option<&[Dosage]>,
) -> Option<Vec<CcdaEntryRelationship>> {
    let sigs: Vec<CcdaEntryRelationship> = dosage_instruction
        .unwrap_or_default()
        .iter()
        .filter(|dosage| dosage.extension.is_some())
        .map(|dosage| {
            CcdaEntryRelationship::new(
                RelationshipTypeCode::Component,
                CcdaEntry::SubstanceAdministration(free_text_sig(ctx, dosage)),
            )
        })
        .collect();

    (!sigs.is_empty()).then_some(sigs)
}

fn free_text_sig(ctx: &ConversionContext<'_>, dosage: &Dosage) -> CcdaSubstanceAdministration {
    CcdaSubstanceAdministration {
        class_code: SubstanceAdministrationClassCode::SubstanceAdministration,
        mood_code: MoodCode::Event,
        negation_ind: None,
        template_id: vec![Template::MedicationFreeTextSig.undated()],
        id: Vec::new(),
        code: Some(CcdaCode::fixed(
            LOINC_MEDICATION_INSTRUCTIONS,
            "Medication Instructions",
            OID_LOINC_CODE_SYSTEM,
            "LOINC",
        )),
        text: ctx.text(dosage.extension.as_deref()),
        status_code: None,
        effective_time: None,
        route_code: None,
        dose_quantity: None,
        consumable: CcdaConsumable {
            type_code: None,
            manufactured_product: vec![CcdaManufacturedProduct {
                manufactured_labeled_drug: Some(vec![CcdaLabeledDrug {
                    null_flavor: "NA".to_string(),
                }]),
                ..Default::default()
            }],
        },
        entry_relationship: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_systems::SNOMED_URL;
    use crate::entries::test_support::{bundle_of, context, narrative};
    use crate::oids::{
        OID_MEDICATION_ACTIVITY, OID_MEDICATION_FREE_TEXT_SIG, OID_MEDICATION_INFORMATION,
    };
    use crate::types::{CcdaId, CcdaTemplateId};
    use fhir::{
        Bundle, CodeableConcept, Coding, DispenseRequest, DoseAndRate, Period, Reference, Timing,
        TimingRepeat,
    };
    use serde_json::json;

    const RXNORM_URL: &str = "http://www.nlm.nih.gov/research/umls/rxnorm";

    fn aspirin() -> Option<CodeableConcept> {
        Some(CodeableConcept::from_codings(vec![Coding::new(
            RXNORM_URL,
            "197696",
            "Aspirin 325 mg oral tablet",
        )]))
    }

    fn request() -> MedicationRequest {
        MedicationRequest {
            id: Some("medication-request-1".into()),
            status: Some("active".into()),
            intent: Some("order".into()),
            medication_codeable_concept: aspirin(),
            authored_on: Some("2024-01-01T10:00:00Z".into()),
            ..Default::default()
        }
    }

    fn administration(bundle: &Bundle, source: &MedicationRequest) -> CcdaSubstanceAdministration {
        let ctx = context(bundle);
        create_medication_entry(&ctx, source)
            .as_substance_administration()
            .cloned()
            .expect("substance administration")
    }

    fn material_code(entry: &CcdaSubstanceAdministration) -> Option<&CcdaCode> {
        entry.consumable.manufactured_product[0].manufactured_material[0]
            .code
            .first()
    }

    #[test]
    fn builds_medication_activity() {
        let entry = administration(&Bundle::default(), &request());

        assert_eq!(
            entry.template_id,
            vec![
                CcdaTemplateId {
                    root: OID_MEDICATION_ACTIVITY.to_string(),
                    extension: Some("2014-06-09".to_string()),
                },
                CcdaTemplateId {
                    root: OID_MEDICATION_ACTIVITY.to_string(),
                    extension: None,
                },
            ]
        );
        assert_eq!(entry.id, vec![CcdaId::root("medication-request-1")]);
        assert_eq!(entry.status_code, Some(CcdaStatusCode::new("active")));
        assert!(entry.negation_ind.is_none());
        assert!(entry.effective_time.is_none());
        assert!(entry.route_code.is_none());
        assert!(entry.dose_quantity.is_none());
        assert!(entry.entry_relationship.is_none());

        assert_eq!(entry.consumable.type_code, Some(ConsumableTypeCode::Consumable));
        let product = &entry.consumable.manufactured_product[0];
        assert_eq!(product.template_id[1].root, OID_MEDICATION_INFORMATION);
        assert!(product.manufacturer_organization.is_none());
        assert_eq!(
            material_code(&entry).and_then(|c| c.code.as_deref()),
            Some("197696")
        );
    }

    #[test]
    fn contained_medication_supplies_code_text_and_manufacturer() {
        let source = MedicationRequest {
            medication_codeable_concept: None,
            contained: Some(vec![Resource::Medication(Medication {
                id: Some("med-1".into()),
                extension: narrative("medication-text"),
                code: aspirin(),
                manufacturer: Some(Reference {
                    display: Some("Acme Pharmaceuticals".into()),
                    ..Default::default()
                }),
                ..Default::default()
            })]),
            ..request()
        };

        let entry = administration(&Bundle::default(), &source);
        let code = material_code(&entry).expect("material code");
        assert_eq!(code.code.as_deref(), Some("197696"));
        assert_eq!(
            code.original_text.as_ref().map(|t| t.reference.value.as_str()),
            Some("#medication-text")
        );

        let organization = &entry.consumable.manufactured_product[0]
            .manufacturer_organization
            .as_ref()
            .expect("manufacturer")[0];
        assert_eq!(organization.name, Some(vec!["Acme Pharmaceuticals".to_string()]));
    }

    #[test]
    fn referenced_medication_resolves_from_bundle() {
        let bundle = bundle_of(vec![Resource::Medication(Medication {
            id: Some("med-2".into()),
            code: aspirin(),
            ..Default::default()
        })]);
        let source = MedicationRequest {
            medication_codeable_concept: None,
            medication_reference: Some(Reference::to("Medication/med-2")),
            ..request()
        };

        let entry = administration(&bundle, &source);
        assert_eq!(
            material_code(&entry).and_then(|c| c.code.as_deref()),
            Some("197696")
        );
    }

    #[test]
    fn dosage_supplies_timing_route_and_dose() {
        let source = MedicationRequest {
            dispense_request: Some(DispenseRequest {
                validity_period: Some(Period {
                    start: Some("2024-01-01".into()),
                    end: Some("2024-12-31".into()),
                }),
            }),
            dosage_instruction: Some(vec![Dosage {
                timing: Some(Timing {
                    repeat: Some(TimingRepeat {
                        frequency: Some(1),
                        period: Some(24.0),
                        period_unit: Some("h".into()),
                    }),
                }),
                route: Some(CodeableConcept::from_codings(vec![Coding::new(
                    SNOMED_URL,
                    "26643006",
                    "Oral route",
                )])),
                dose_and_rate: Some(vec![DoseAndRate {
                    dose_quantity: Some(Quantity {
                        value: Some(325.0),
                        unit: Some("mg".into()),
                        ..Default::default()
                    }),
                }]),
                ..Default::default()
            }]),
            ..request()
        };

        let entry = administration(&Bundle::default(), &source);
        let effective = entry.effective_time.as_ref().expect("effective time");
        assert_eq!(effective.len(), 2);
        assert_eq!(
            effective[0].low.as_ref().and_then(|t| t.value.as_deref()),
            Some("20240101")
        );
        assert_eq!(effective[1].xsi_type.as_deref(), Some("PIVL_TS"));
        assert_eq!(
            effective[1].period,
            Some(CcdaQuantity {
                value: Some("24".into()),
                unit: Some("h".into()),
            })
        );
        assert_eq!(
            entry.route_code.as_ref().and_then(|c| c.code.as_deref()),
            Some("26643006")
        );
        assert_eq!(
            entry.dose_quantity,
            Some(CcdaQuantity {
                value: Some("325".into()),
                unit: Some("mg".into()),
            })
        );
    }

    #[test]
    fn dosage_without_dose_and_rate_has_no_dose() {
        let source = MedicationRequest {
            dosage_instruction: Some(vec![Dosage {
                text: Some("Take one tablet daily".into()),
                ..Default::default()
            }]),
            ..request()
        };

        let entry = administration(&Bundle::default(), &source);
        assert!(entry.dose_quantity.is_none());
        assert!(entry.route_code.is_none());
        assert!(entry.effective_time.is_none());
    }

    #[test]
    fn narrated_dosage_instructions_become_free_text_sigs() {
        let source = MedicationRequest {
            extension: narrative("medication-narrative"),
            dosage_instruction: Some(vec![
                Dosage {
                    extension: narrative("sig-1"),
                    ..Default::default()
                },
                Dosage::default(),
                Dosage {
                    extension: narrative("sig-2"),
                    ..Default::default()
                },
            ]),
            ..request()
        };

        let entry = administration(&Bundle::default(), &source);
        assert_eq!(
            entry.text.as_ref().map(|t| t.reference.value.as_str()),
            Some("#medication-narrative")
        );

        let sigs = entry.entry_relationship.as_ref().expect("sigs");
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0].type_code, RelationshipTypeCode::Component);
        let sig = sigs[0].entry.as_substance_administration().expect("sig");
        assert_eq!(sig.template_id[0].root, OID_MEDICATION_FREE_TEXT_SIG);
        assert_eq!(sig.code.as_ref().and_then(|c| c.code.as_deref()), Some("76662-6"));
        assert_eq!(
            sig.text.as_ref().map(|t| t.reference.value.as_str()),
            Some("#sig-1")
        );
    }

    #[test]
    fn free_text_sig_serialises_labeled_drug_placeholder() {
        let source = MedicationRequest {
            dosage_instruction: Some(vec![Dosage {
                extension: narrative("sig-1"),
                ..Default::default()
            }]),
            ..request()
        };
        let bundle = Bundle::default();
        let ctx = context(&bundle);
        let value = serde_json::to_value(create_medication_entry(&ctx, &source)).expect("json");

        let sig = &value["substanceAdministration"][0]["entryRelationship"][0];
        assert_eq!(sig["@_typeCode"], "COMP");
        let product = &sig["substanceAdministration"][0]["consumable"]["manufacturedProduct"][0];
        assert_eq!(product, &json!({ "manufacturedLabeledDrug": [{ "@_nullFlavor": "NA" }] }));
        assert!(sig["substanceAdministration"][0].get("statusCode").is_none());
        assert_eq!(
            value["substanceAdministration"][0]["consumable"]["@_typeCode"],
            "CSM"
        );
    }

    #[test]
    fn request_without_id_gets_stable_id() {
        let source = MedicationRequest {
            id: None,
            ..request()
        };

        let first_run = administration(&Bundle::default(), &source);
        let second_run = administration(&Bundle::default(), &source);
        assert_eq!(first_run.id.len(), 1);
        assert_eq!(first_run.id, second_run.id);
    }

    #[test]
    fn stopped_request_is_aborted() {
        let source = MedicationRequest {
            status: Some("stopped".into()),
            ..request()
        };
        let entry = administration(&Bundle::default(), &source);
        assert_eq!(entry.status_code, Some(CcdaStatusCode::new("aborted")));
    }
}
