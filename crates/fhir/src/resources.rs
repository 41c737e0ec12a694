//! FHIR R4 resources read by the converter.
//!
//! Each struct carries the elements the C-CDA entry builders read. [`Resource`] is the closed
//! set of resource kinds a document Bundle may hold; any `resourceType` outside that set is
//! kept as [`OtherResource`] so that references to it still resolve (and are then rejected by
//! type at the call site rather than silently disappearing from the index).

use crate::datatypes::{
    CodeableConcept, Coding, Extension, Identifier, Narrative, Period, Quantity, Reference,
};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Option<String>,
    pub identifier: Option<Vec<Identifier>>,
    pub extension: Option<Vec<Extension>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub id: Option<String>,
    pub identifier: Option<Identifier>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<CodeableConcept>,
    pub subject: Option<Reference>,
    pub date: Option<String>,
    pub title: Option<String>,
    pub section: Option<Vec<CompositionSection>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompositionSection {
    pub title: Option<String>,
    pub code: Option<CodeableConcept>,
    pub text: Option<Narrative>,
    pub entry: Option<Vec<Reference>>,
}

impl CompositionSection {
    /// The LOINC code identifying the kind of section.
    pub fn section_code(&self) -> Option<&str> {
        self.code.as_ref().and_then(CodeableConcept::first_code)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub id: Option<String>,
    pub identifier: Option<Vec<Identifier>>,
    pub extension: Option<Vec<Extension>>,
    pub status: Option<String>,
    pub class: Option<Coding>,
    #[serde(rename = "type")]
    pub type_: Option<Vec<CodeableConcept>>,
    pub subject: Option<Reference>,
    pub participant: Option<Vec<EncounterParticipant>>,
    pub period: Option<Period>,
    pub diagnosis: Option<Vec<EncounterDiagnosis>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EncounterParticipant {
    #[serde(rename = "type")]
    pub type_: Option<Vec<CodeableConcept>>,
    pub period: Option<Period>,
    pub individual: Option<Reference>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EncounterDiagnosis {
    pub condition: Option<Reference>,
    #[serde(rename = "use")]
    pub use_: Option<CodeableConcept>,
    pub rank: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AllergyIntolerance {
    pub id: Option<String>,
    pub identifier: Option<Vec<Identifier>>,
    pub extension: Option<Vec<Extension>>,
    pub clinical_status: Option<CodeableConcept>,
    pub verification_status: Option<CodeableConcept>,
    /// `food`, `medication`, `environment` or `biologic`.
    pub category: Option<Vec<String>>,
    pub code: Option<CodeableConcept>,
    pub patient: Option<Reference>,
    pub onset_date_time: Option<String>,
    pub onset_period: Option<Period>,
    pub recorded_date: Option<String>,
    pub reaction: Option<Vec<AllergyReaction>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AllergyReaction {
    pub id: Option<String>,
    pub extension: Option<Vec<Extension>>,
    pub manifestation: Option<Vec<CodeableConcept>>,
    /// `mild`, `moderate` or `severe`.
    pub severity: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: Option<String>,
    pub identifier: Option<Vec<Identifier>>,
    pub extension: Option<Vec<Extension>>,
    pub clinical_status: Option<CodeableConcept>,
    pub verification_status: Option<CodeableConcept>,
    pub category: Option<Vec<CodeableConcept>>,
    pub code: Option<CodeableConcept>,
    pub subject: Option<Reference>,
    pub onset_date_time: Option<String>,
    pub abatement_date_time: Option<String>,
    pub recorded_date: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Option<String>,
    pub identifier: Option<Vec<Identifier>>,
    pub extension: Option<Vec<Extension>>,
    pub lifecycle_status: Option<String>,
    pub description: Option<CodeableConcept>,
    pub subject: Option<Reference>,
    pub start_date: Option<String>,
    pub target: Option<Vec<GoalTarget>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoalTarget {
    pub measure: Option<CodeableConcept>,
    pub due_date: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Immunization {
    pub id: Option<String>,
    pub identifier: Option<Vec<Identifier>>,
    pub extension: Option<Vec<Extension>>,
    pub status: Option<String>,
    pub vaccine_code: Option<CodeableConcept>,
    pub patient: Option<Reference>,
    pub occurrence_date_time: Option<String>,
    pub lot_number: Option<String>,
    pub manufacturer: Option<Reference>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub id: Option<String>,
    pub identifier: Option<Vec<Identifier>>,
    pub extension: Option<Vec<Extension>>,
    pub status: Option<String>,
    pub code: Option<CodeableConcept>,
    pub subject: Option<Reference>,
    pub performed_date_time: Option<String>,
    pub performed_period: Option<Period>,
    pub location: Option<Reference>,
    pub body_site: Option<Vec<CodeableConcept>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: Option<String>,
    pub identifier: Option<Vec<Identifier>>,
    pub extension: Option<Vec<Extension>>,
    pub status: Option<String>,
    pub category: Option<Vec<CodeableConcept>>,
    pub code: Option<CodeableConcept>,
    pub subject: Option<Reference>,
    pub effective_date_time: Option<String>,
    pub effective_period: Option<Period>,
    pub value_quantity: Option<Quantity>,
    pub value_codeable_concept: Option<CodeableConcept>,
    pub value_string: Option<String>,
}

impl Observation {
    /// The code of the first coding of the first category.
    pub fn first_category_code(&self) -> Option<&str> {
        self.category
            .as_deref()
            .and_then(<[CodeableConcept]>::first)
            .and_then(CodeableConcept::first_code)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: Option<String>,
    pub identifier: Option<Vec<Identifier>>,
    pub extension: Option<Vec<Extension>>,
    pub code: Option<CodeableConcept>,
    pub manufacturer: Option<Reference>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    pub id: Option<String>,
    pub identifier: Option<Vec<Identifier>>,
    pub extension: Option<Vec<Extension>>,
    pub contained: Option<Vec<Resource>>,
    pub status: Option<String>,
    pub intent: Option<String>,
    pub medication_codeable_concept: Option<CodeableConcept>,
    pub medication_reference: Option<Reference>,
    pub subject: Option<Reference>,
    pub authored_on: Option<String>,
    pub requester: Option<Reference>,
    pub dosage_instruction: Option<Vec<Dosage>>,
    pub dispense_request: Option<DispenseRequest>,
}

impl MedicationRequest {
    /// The first contained Medication.
    pub fn contained_medication(&self) -> Option<&Medication> {
        self.contained
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find_map(|resource| match resource {
                Resource::Medication(medication) => Some(medication),
                _ => None,
            })
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dosage {
    pub extension: Option<Vec<Extension>>,
    pub text: Option<String>,
    pub timing: Option<Timing>,
    pub route: Option<CodeableConcept>,
    pub dose_and_rate: Option<Vec<DoseAndRate>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub repeat: Option<TimingRepeat>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimingRepeat {
    pub frequency: Option<u32>,
    pub period: Option<f64>,
    pub period_unit: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoseAndRate {
    pub dose_quantity: Option<Quantity>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DispenseRequest {
    pub validity_period: Option<Period>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Option<String>,
    pub identifier: Option<Vec<Identifier>>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<Vec<CodeableConcept>>,
}

/// A resource of a type the converter does not model.
#[derive(Clone, Debug, PartialEq)]
pub struct OtherResource {
    pub resource_type: String,
    pub id: Option<String>,
    pub content: Value,
}

/// A FHIR resource, dispatched on its `resourceType`.
#[derive(Clone, Debug, PartialEq)]
pub enum Resource {
    Patient(Patient),
    Composition(Composition),
    Encounter(Encounter),
    AllergyIntolerance(AllergyIntolerance),
    Condition(Condition),
    Goal(Goal),
    Immunization(Immunization),
    Procedure(Procedure),
    Observation(Observation),
    Medication(Medication),
    MedicationRequest(MedicationRequest),
    Location(Location),
    Other(OtherResource),
}

impl Resource {
    /// The FHIR `resourceType` of this resource.
    pub fn resource_type(&self) -> &str {
        match self {
            Resource::Patient(_) => "Patient",
            Resource::Composition(_) => "Composition",
            Resource::Encounter(_) => "Encounter",
            Resource::AllergyIntolerance(_) => "AllergyIntolerance",
            Resource::Condition(_) => "Condition",
            Resource::Goal(_) => "Goal",
            Resource::Immunization(_) => "Immunization",
            Resource::Procedure(_) => "Procedure",
            Resource::Observation(_) => "Observation",
            Resource::Medication(_) => "Medication",
            Resource::MedicationRequest(_) => "MedicationRequest",
            Resource::Location(_) => "Location",
            Resource::Other(other) => &other.resource_type,
        }
    }

    /// The logical id of this resource, if it has one.
    pub fn id(&self) -> Option<&str> {
        let id = match self {
            Resource::Patient(r) => &r.id,
            Resource::Composition(r) => &r.id,
            Resource::Encounter(r) => &r.id,
            Resource::AllergyIntolerance(r) => &r.id,
            Resource::Condition(r) => &r.id,
            Resource::Goal(r) => &r.id,
            Resource::Immunization(r) => &r.id,
            Resource::Procedure(r) => &r.id,
            Resource::Observation(r) => &r.id,
            Resource::Medication(r) => &r.id,
            Resource::MedicationRequest(r) => &r.id,
            Resource::Location(r) => &r.id,
            Resource::Other(r) => &r.id,
        };
        id.as_deref()
    }

    /// The `"{resourceType}/{id}"` reference key, if the resource has an id.
    pub fn reference_key(&self) -> Option<String> {
        self.id()
            .map(|id| format!("{}/{}", self.resource_type(), id))
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let resource_type = value
            .get("resourceType")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("resourceType"))?
            .to_string();

        fn typed<T, E>(value: Value) -> Result<T, E>
        where
            T: serde::de::DeserializeOwned,
            E: serde::de::Error,
        {
            serde_json::from_value(value).map_err(E::custom)
        }

        let resource = match resource_type.as_str() {
            "Patient" => Resource::Patient(typed(value)?),
            "Composition" => Resource::Composition(typed(value)?),
            "Encounter" => Resource::Encounter(typed(value)?),
            "AllergyIntolerance" => Resource::AllergyIntolerance(typed(value)?),
            "Condition" => Resource::Condition(typed(value)?),
            "Goal" => Resource::Goal(typed(value)?),
            "Immunization" => Resource::Immunization(typed(value)?),
            "Procedure" => Resource::Procedure(typed(value)?),
            "Observation" => Resource::Observation(typed(value)?),
            "Medication" => Resource::Medication(typed(value)?),
            "MedicationRequest" => Resource::MedicationRequest(typed(value)?),
            "Location" => Resource::Location(typed(value)?),
            _ => {
                let id = value.get("id").and_then(Value::as_str).map(str::to_string);
                Resource::Other(OtherResource {
                    resource_type,
                    id,
                    content: value,
                })
            }
        };

        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dispatches_on_resource_type() {
        let resource: Resource = serde_json::from_value(json!({
            "resourceType": "Condition",
            "id": "condition-1",
            "onsetDateTime": "2023-12-25",
            "code": { "coding": [{ "system": "http://snomed.info/sct", "code": "233604007" }] }
        }))
        .expect("parse condition");

        match &resource {
            Resource::Condition(condition) => {
                assert_eq!(condition.onset_date_time.as_deref(), Some("2023-12-25"));
            }
            other => panic!("expected Condition, got {other:?}"),
        }
        assert_eq!(resource.reference_key().as_deref(), Some("Condition/condition-1"));
    }

    #[test]
    fn keeps_unmodelled_resource_types() {
        let resource: Resource = serde_json::from_value(json!({
            "resourceType": "Practitioner",
            "id": "pract-1",
            "name": [{ "family": "Smith" }]
        }))
        .expect("parse practitioner");

        assert_eq!(resource.resource_type(), "Practitioner");
        assert_eq!(resource.id(), Some("pract-1"));
        assert!(matches!(resource, Resource::Other(_)));
    }

    #[test]
    fn rejects_missing_resource_type() {
        let err = serde_json::from_value::<Resource>(json!({ "id": "x" }))
            .expect_err("should reject missing resourceType");
        assert!(err.to_string().contains("resourceType"));
    }

    #[test]
    fn reports_field_errors_inside_known_resources() {
        let err = serde_json::from_value::<Resource>(json!({
            "resourceType": "Encounter",
            "period": "not-a-period"
        }))
        .expect_err("should reject malformed period");
        assert!(err.to_string().contains("Period") || err.to_string().contains("struct"));
    }

    #[test]
    fn medication_request_reads_contained_medication() {
        let resource: Resource = serde_json::from_value(json!({
            "resourceType": "MedicationRequest",
            "id": "med-req-1",
            "status": "active",
            "contained": [
                { "resourceType": "Practitioner", "id": "p" },
                {
                    "resourceType": "Medication",
                    "id": "med-1",
                    "code": { "coding": [{ "system": "http://www.nlm.nih.gov/research/umls/rxnorm", "code": "197696" }] },
                    "manufacturer": { "display": "Acme Pharma" }
                }
            ],
            "dosageInstruction": [{
                "timing": { "repeat": { "period": 24, "periodUnit": "h" } },
                "doseAndRate": [{ "doseQuantity": { "value": 325, "unit": "mg" } }]
            }]
        }))
        .expect("parse medication request");

        let Resource::MedicationRequest(request) = &resource else {
            panic!("expected MedicationRequest, got {resource:?}");
        };
        let medication = request.contained_medication().expect("contained medication");
        assert_eq!(medication.id.as_deref(), Some("med-1"));
        assert_eq!(
            medication.manufacturer.as_ref().and_then(|m| m.display.as_deref()),
            Some("Acme Pharma")
        );

        let dosage = &request.dosage_instruction.as_deref().expect("dosage")[0];
        let repeat = dosage.timing.as_ref().and_then(|t| t.repeat.as_ref()).expect("repeat");
        assert_eq!(repeat.period, Some(24.0));
        assert_eq!(repeat.period_unit.as_deref(), Some("h"));
    }

    #[test]
    fn allergy_reads_reaction_and_code_extension() {
        let resource: Resource = serde_json::from_value(json!({
            "resourceType": "AllergyIntolerance",
            "id": "allergy-1",
            "category": ["food"],
            "code": {
                "extension": [{ "url": "https://example.org/narrative", "valueString": "allergen-1" }],
                "coding": [{ "system": "http://snomed.info/sct", "code": "91935009", "display": "Peanut" }]
            },
            "onsetPeriod": { "start": "2020-05-01" },
            "reaction": [{
                "manifestation": [{ "coding": [{ "system": "http://snomed.info/sct", "code": "247472004" }] }],
                "severity": "severe"
            }]
        }))
        .expect("parse allergy");

        let Resource::AllergyIntolerance(allergy) = &resource else {
            panic!("expected AllergyIntolerance, got {resource:?}");
        };
        assert_eq!(allergy.category.as_deref(), Some(&["food".to_string()][..]));
        let code = allergy.code.as_ref().expect("code");
        assert_eq!(code.first_code(), Some("91935009"));
        assert_eq!(code.extension.as_ref().map(Vec::len), Some(1));
        assert_eq!(
            allergy.onset_period.as_ref().and_then(|p| p.start.as_deref()),
            Some("2020-05-01")
        );
        let reaction = &allergy.reaction.as_deref().expect("reaction")[0];
        assert_eq!(reaction.severity.as_deref(), Some("severe"));
        assert_eq!(resource.reference_key().as_deref(), Some("AllergyIntolerance/allergy-1"));
    }

    #[test]
    fn resource_without_id_has_no_reference_key() {
        let resource = Resource::Encounter(Encounter::default());
        assert!(resource.reference_key().is_none());
    }

    #[test]
    fn section_code_reads_first_coding() {
        let section = CompositionSection {
            code: Some(CodeableConcept::from_codings(vec![Coding::new(
                "http://loinc.org",
                "46240-8",
                "Encounters",
            )])),
            ..Default::default()
        };
        assert_eq!(section.section_code(), Some("46240-8"));
    }
}
