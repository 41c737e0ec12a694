//! C-CDA output tree.
//!
//! Responsibilities:
//! - Model the clinical statements the converter emits as a closed sum type
//! - Fix `classCode`/`moodCode` per construct at the type level
//! - Serialise to the `@_`-keyed shape consumed by an XML emitter
//!
//! Notes:
//! - Repeating XML elements serialise as arrays, even when only one is ever emitted
//! - Optional elements are skipped entirely rather than emitted as `null`

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

// ============================================================================
// Leaf elements
// ============================================================================

/// A `templateId` element asserting conformance to a C-CDA template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CcdaTemplateId {
    #[serde(rename = "@_root")]
    pub root: String,
    #[serde(rename = "@_extension", skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

/// An instance identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CcdaId {
    #[serde(rename = "@_root")]
    pub root: String,
    #[serde(rename = "@_extension", skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl CcdaId {
    pub fn root(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: None,
        }
    }
}

/// A coded element (`code`, `translation`, `targetSiteCode`, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CcdaCode {
    #[serde(rename = "@_code", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
    #[serde(rename = "@_displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "@_codeSystem", skip_serializing_if = "Option::is_none")]
    pub code_system: Option<String>,
    #[serde(rename = "@_codeSystemName", skip_serializing_if = "Option::is_none")]
    pub code_system_name: Option<String>,
    #[serde(rename = "originalText", skip_serializing_if = "Option::is_none")]
    pub original_text: Option<CcdaText>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub translation: Vec<CcdaCode>,
}

impl CcdaCode {
    /// A fixed code from a known code system.
    pub fn fixed(code: &str, display_name: &str, code_system: &str, code_system_name: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            null_flavor: None,
            display_name: Some(display_name.to_string()),
            code_system: Some(code_system.to_string()),
            code_system_name: Some(code_system_name.to_string()),
            original_text: None,
            translation: Vec::new(),
        }
    }

    /// A code that deliberately carries no value.
    pub fn null_flavor(null_flavor: &str) -> Self {
        Self {
            null_flavor: Some(null_flavor.to_string()),
            ..Default::default()
        }
    }

    pub fn with_translation(mut self, translation: CcdaCode) -> Self {
        self.translation.push(translation);
        self
    }
}

/// The `value` slot of an observation, discriminated by `xsi:type`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "@_xsi:type")]
pub enum CcdaValue {
    #[serde(rename = "CD")]
    Coded(CcdaCode),
    #[serde(rename = "PQ")]
    Quantity {
        #[serde(rename = "@_value", skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(rename = "@_unit", skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    #[serde(rename = "ST")]
    Text {
        #[serde(rename = "#text")]
        text: String,
    },
}

/// A single point in time, or a `nullFlavor` standing in for one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CcdaTimeStamp {
    #[serde(rename = "@_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
}

impl CcdaTimeStamp {
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            null_flavor: None,
        }
    }

    pub fn no_information() -> Self {
        Self {
            value: None,
            null_flavor: Some("NI".to_string()),
        }
    }
}

/// An `effectiveTime`: a point (`@_value`), an interval (`low`/`high`), or a periodic
/// interval (`PIVL_TS` with a `period`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CcdaEffectiveTime {
    #[serde(rename = "@_xsi:type", skip_serializing_if = "Option::is_none")]
    pub xsi_type: Option<String>,
    #[serde(rename = "@_institutionSpecified", skip_serializing_if = "Option::is_none")]
    pub institution_specified: Option<bool>,
    #[serde(rename = "@_operator", skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(rename = "@_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<CcdaTimeStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<CcdaTimeStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<CcdaQuantity>,
}

impl CcdaEffectiveTime {
    /// A point in time.
    pub fn at(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// A `low`/`high` interval.
    pub fn interval(low: Option<CcdaTimeStamp>, high: Option<CcdaTimeStamp>) -> Self {
        Self {
            low,
            high,
            ..Default::default()
        }
    }

    /// An institution-specified periodic interval (`PIVL_TS`, operator `A`).
    pub fn periodic(period: CcdaQuantity) -> Self {
        Self {
            xsi_type: Some("PIVL_TS".to_string()),
            institution_specified: Some(true),
            operator: Some("A".to_string()),
            period: Some(period),
            ..Default::default()
        }
    }
}

/// A physical quantity (`doseQuantity`, `period`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CcdaQuantity {
    #[serde(rename = "@_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "@_unit", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CcdaReference {
    #[serde(rename = "@_value")]
    pub value: String,
}

/// Entry `text` pointing into the section narrative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CcdaText {
    pub reference: CcdaReference,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CcdaStatusCode {
    #[serde(rename = "@_code")]
    pub code: String,
}

impl CcdaStatusCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    pub fn completed() -> Self {
        Self::new("completed")
    }
}

// ============================================================================
// Structural vocabulary
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MoodCode {
    #[serde(rename = "EVN")]
    Event,
    #[serde(rename = "GOL")]
    Goal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ActClassCode {
    #[serde(rename = "ACT")]
    Act,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EncounterClassCode {
    #[serde(rename = "ENC")]
    Encounter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ObservationClassCode {
    #[serde(rename = "OBS")]
    Observation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ProcedureClassCode {
    #[serde(rename = "PROC")]
    Procedure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SubstanceAdministrationClassCode {
    #[serde(rename = "SBADM")]
    SubstanceAdministration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ManufacturedProductClassCode {
    #[serde(rename = "MANU")]
    ManufacturedProduct,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ConsumableTypeCode {
    /// Consumable.
    #[serde(rename = "CSM")]
    Consumable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ParticipationTypeCode {
    #[serde(rename = "LOC")]
    Location,
    #[serde(rename = "CSM")]
    Consumable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RoleClassCode {
    #[serde(rename = "SDLOC")]
    ServiceDeliveryLocation,
    #[serde(rename = "MANU")]
    ManufacturedProduct,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EntityClassCode {
    #[serde(rename = "PLC")]
    Place,
    #[serde(rename = "MMAT")]
    ManufacturedMaterial,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RelationshipTypeCode {
    /// Refers to.
    #[serde(rename = "REFR")]
    Refers,
    /// Has subject.
    #[serde(rename = "SUBJ")]
    Subject,
    /// Has reason.
    #[serde(rename = "RSON")]
    Reason,
    /// Has component.
    #[serde(rename = "COMP")]
    Component,
    /// Is manifestation of.
    #[serde(rename = "MFST")]
    Manifestation,
}

// ============================================================================
// Participants
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CcdaParticipant {
    #[serde(rename = "@_typeCode")]
    pub type_code: ParticipationTypeCode,
    #[serde(rename = "participantRole")]
    pub participant_role: CcdaParticipantRole,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CcdaParticipantRole {
    #[serde(rename = "@_classCode")]
    pub class_code: RoleClassCode,
    #[serde(rename = "templateId", skip_serializing_if = "Vec::is_empty")]
    pub template_id: Vec<CcdaTemplateId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub id: Vec<CcdaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CcdaCode>,
    #[serde(rename = "playingEntity", skip_serializing_if = "Option::is_none")]
    pub playing_entity: Option<CcdaPlayingEntity>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CcdaPlayingEntity {
    #[serde(rename = "@_classCode")]
    pub class_code: EntityClassCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CcdaCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<String>>,
}

// ============================================================================
// Clinical statements
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CcdaEncounter {
    #[serde(rename = "@_classCode")]
    pub class_code: EncounterClassCode,
    #[serde(rename = "@_moodCode")]
    pub mood_code: MoodCode,
    #[serde(rename = "templateId")]
    pub template_id: Vec<CcdaTemplateId>,
    pub id: Vec<CcdaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CcdaCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<CcdaText>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<CcdaEffectiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<CcdaParticipant>>,
    #[serde(rename = "entryRelationship", skip_serializing_if = "Option::is_none")]
    pub entry_relationship: Option<Vec<CcdaEntryRelationship>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CcdaAct {
    #[serde(rename = "@_classCode")]
    pub class_code: ActClassCode,
    #[serde(rename = "@_moodCode")]
    pub mood_code: MoodCode,
    #[serde(rename = "templateId")]
    pub template_id: Vec<CcdaTemplateId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub id: Vec<CcdaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CcdaCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<CcdaText>,
    #[serde(rename = "statusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<CcdaStatusCode>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<CcdaEffectiveTime>>,
    #[serde(rename = "entryRelationship", skip_serializing_if = "Option::is_none")]
    pub entry_relationship: Option<Vec<CcdaEntryRelationship>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CcdaObservation {
    #[serde(rename = "@_classCode")]
    pub class_code: ObservationClassCode,
    #[serde(rename = "@_moodCode")]
    pub mood_code: MoodCode,
    #[serde(rename = "templateId")]
    pub template_id: Vec<CcdaTemplateId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub id: Vec<CcdaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CcdaCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<CcdaText>,
    #[serde(rename = "statusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<CcdaStatusCode>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<CcdaEffectiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<CcdaValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<CcdaParticipant>>,
    #[serde(rename = "entryRelationship", skip_serializing_if = "Option::is_none")]
    pub entry_relationship: Option<Vec<CcdaEntryRelationship>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CcdaProcedure {
    #[serde(rename = "@_classCode")]
    pub class_code: ProcedureClassCode,
    #[serde(rename = "@_moodCode")]
    pub mood_code: MoodCode,
    #[serde(rename = "templateId")]
    pub template_id: Vec<CcdaTemplateId>,
    pub id: Vec<CcdaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CcdaCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<CcdaText>,
    #[serde(rename = "statusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<CcdaStatusCode>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<CcdaEffectiveTime>>,
    #[serde(rename = "targetSiteCode", skip_serializing_if = "Option::is_none")]
    pub target_site_code: Option<CcdaCode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub participant: Vec<CcdaParticipant>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CcdaSubstanceAdministration {
    #[serde(rename = "@_classCode")]
    pub class_code: SubstanceAdministrationClassCode,
    #[serde(rename = "@_moodCode")]
    pub mood_code: MoodCode,
    #[serde(rename = "@_negationInd", skip_serializing_if = "Option::is_none")]
    pub negation_ind: Option<bool>,
    #[serde(rename = "templateId")]
    pub template_id: Vec<CcdaTemplateId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub id: Vec<CcdaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CcdaCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<CcdaText>,
    #[serde(rename = "statusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<CcdaStatusCode>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<CcdaEffectiveTime>>,
    #[serde(rename = "routeCode", skip_serializing_if = "Option::is_none")]
    pub route_code: Option<CcdaCode>,
    #[serde(rename = "doseQuantity", skip_serializing_if = "Option::is_none")]
    pub dose_quantity: Option<CcdaQuantity>,
    pub consumable: CcdaConsumable,
    #[serde(rename = "entryRelationship", skip_serializing_if = "Option::is_none")]
    pub entry_relationship: Option<Vec<CcdaEntryRelationship>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CcdaConsumable {
    #[serde(rename = "@_typeCode", skip_serializing_if = "Option::is_none")]
    pub type_code: Option<ConsumableTypeCode>,
    #[serde(rename = "manufacturedProduct")]
    pub manufactured_product: Vec<CcdaManufacturedProduct>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CcdaManufacturedProduct {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<ManufacturedProductClassCode>,
    #[serde(rename = "templateId", skip_serializing_if = "Vec::is_empty")]
    pub template_id: Vec<CcdaTemplateId>,
    #[serde(rename = "manufacturedMaterial", skip_serializing_if = "Vec::is_empty")]
    pub manufactured_material: Vec<CcdaManufacturedMaterial>,
    #[serde(
        rename = "manufacturerOrganization",
        skip_serializing_if = "Option::is_none"
    )]
    pub manufacturer_organization: Option<Vec<CcdaOrganization>>,
    #[serde(
        rename = "manufacturedLabeledDrug",
        skip_serializing_if = "Option::is_none"
    )]
    pub manufactured_labeled_drug: Option<Vec<CcdaLabeledDrug>>,
}

/// A labeled drug placeholder; the free-text sig only ever carries a null flavor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CcdaLabeledDrug {
    #[serde(rename = "@_nullFlavor")]
    pub null_flavor: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CcdaManufacturedMaterial {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub code: Vec<CcdaCode>,
    #[serde(rename = "lotNumberText", skip_serializing_if = "Option::is_none")]
    pub lot_number_text: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CcdaOrganization {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub id: Vec<CcdaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<String>>,
}

// ============================================================================
// Entries and relationships
// ============================================================================

/// One clinical statement, keyed in the output by its CDA element name.
#[derive(Clone, Debug, PartialEq)]
pub enum CcdaEntry {
    Act(CcdaAct),
    Encounter(CcdaEncounter),
    Observation(CcdaObservation),
    Procedure(CcdaProcedure),
    SubstanceAdministration(CcdaSubstanceAdministration),
}

impl CcdaEntry {
    /// The CDA element name of this statement.
    pub fn element_name(&self) -> &'static str {
        match self {
            CcdaEntry::Act(_) => "act",
            CcdaEntry::Encounter(_) => "encounter",
            CcdaEntry::Observation(_) => "observation",
            CcdaEntry::Procedure(_) => "procedure",
            CcdaEntry::SubstanceAdministration(_) => "substanceAdministration",
        }
    }

    pub fn as_act(&self) -> Option<&CcdaAct> {
        match self {
            CcdaEntry::Act(act) => Some(act),
            _ => None,
        }
    }

    pub fn as_encounter(&self) -> Option<&CcdaEncounter> {
        match self {
            CcdaEntry::Encounter(encounter) => Some(encounter),
            _ => None,
        }
    }

    pub fn as_observation(&self) -> Option<&CcdaObservation> {
        match self {
            CcdaEntry::Observation(observation) => Some(observation),
            _ => None,
        }
    }

    pub fn as_procedure(&self) -> Option<&CcdaProcedure> {
        match self {
            CcdaEntry::Procedure(procedure) => Some(procedure),
            _ => None,
        }
    }

    pub fn as_substance_administration(&self) -> Option<&CcdaSubstanceAdministration> {
        match self {
            CcdaEntry::SubstanceAdministration(sa) => Some(sa),
            _ => None,
        }
    }

    fn serialize_statement<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        let name = self.element_name();
        match self {
            CcdaEntry::Act(inner) => map.serialize_entry(name, std::slice::from_ref(inner)),
            CcdaEntry::Encounter(inner) => map.serialize_entry(name, std::slice::from_ref(inner)),
            CcdaEntry::Observation(inner) => {
                map.serialize_entry(name, std::slice::from_ref(inner))
            }
            CcdaEntry::Procedure(inner) => map.serialize_entry(name, std::slice::from_ref(inner)),
            CcdaEntry::SubstanceAdministration(inner) => {
                map.serialize_entry(name, std::slice::from_ref(inner))
            }
        }
    }
}

impl Serialize for CcdaEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        self.serialize_statement(&mut map)?;
        map.end()
    }
}

/// A typed link from a parent statement to a nested one.
#[derive(Clone, Debug, PartialEq)]
pub struct CcdaEntryRelationship {
    pub type_code: RelationshipTypeCode,
    pub inversion_ind: Option<bool>,
    pub entry: CcdaEntry,
}

impl CcdaEntryRelationship {
    pub fn new(type_code: RelationshipTypeCode, entry: CcdaEntry) -> Self {
        Self {
            type_code,
            inversion_ind: None,
            entry,
        }
    }
}

impl Serialize for CcdaEntryRelationship {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.inversion_ind.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("@_typeCode", &self.type_code)?;
        if let Some(inversion_ind) = self.inversion_ind {
            map.serialize_entry("@_inversionInd", &inversion_ind)?;
        }
        self.entry.serialize_statement(&mut map)?;
        map.end()
    }
}

/// One converted Composition section.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CcdaSection {
    #[serde(rename = "templateId")]
    pub template_id: Vec<CcdaTemplateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CcdaCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub entry: Vec<CcdaEntry>,
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
}
