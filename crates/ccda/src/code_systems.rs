//! Code system registry and CodeableConcept mapping.
//!
//! Responsibilities:
//! - Cross-walk FHIR code system URLs to the OIDs and display names CDA requires
//! - Map a FHIR `CodeableConcept` to a CDA `code` element or a typed `value` element
//!
//! Notes:
//! - A `urn:oid:` system carries its OID directly and needs no registry entry
//! - Lookups are linear over a small static table; the first matching row wins

use crate::oids::*;
use crate::types::{CcdaCode, CcdaValue};
use fhir::{CodeableConcept, Coding};

/// One row of the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeSystem {
    pub fhir_url: &'static str,
    pub oid: &'static str,
    pub display_name: &'static str,
}

const fn system(fhir_url: &'static str, oid: &'static str, display_name: &'static str) -> CodeSystem {
    CodeSystem {
        fhir_url,
        oid,
        display_name,
    }
}

pub const SNOMED_URL: &str = "http://snomed.info/sct";
pub const LOINC_URL: &str = "http://loinc.org";
pub const UCUM_URL: &str = "http://unitsofmeasure.org";

pub static CODE_SYSTEMS: &[CodeSystem] = &[
    system(SNOMED_URL, OID_SNOMED_CT_CODE_SYSTEM, "SNOMED CT"),
    system(LOINC_URL, OID_LOINC_CODE_SYSTEM, "LOINC"),
    system(
        "http://www.nlm.nih.gov/research/umls/rxnorm",
        OID_RXNORM_CODE_SYSTEM,
        "RxNorm",
    ),
    system(
        "http://www.ama-assn.org/go/cpt",
        OID_CPT_CODE_SYSTEM,
        "Current Procedural Terminology (CPT)",
    ),
    system(
        "http://hl7.org/fhir/sid/ndc",
        OID_NDC_CODE_SYSTEM,
        "National Drug Code (NDC)",
    ),
    system("http://nucc.org/cvx", OID_CVX_CODE_SYSTEM, "CVX"),
    system(
        "http://hl7.org/fhir/sid/cvx",
        OID_CVX_CODE_SYSTEM,
        "Vaccine Administered Code Set (CVX)",
    ),
    system(UCUM_URL, OID_UCUM_CODE_SYSTEM, "UCUM"),
    system(
        "http://hl7.org/fhir/sid/icd-10-cm",
        OID_ICD_10_CM_CODE_SYSTEM,
        "ICD-10-CM",
    ),
    system(
        "urn:iso:std:iso:11073:10101",
        OID_MDC_CODE_SYSTEM,
        "Medical Device Communications (MDC)",
    ),
    system(
        "http://ncithesaurus-stage.nci.nih.gov",
        OID_NCI_THESAURUS_CODE_SYSTEM,
        "NCI Thesaurus",
    ),
    system(
        "http://fdasis.nlm.nih.gov",
        OID_UNII_CODE_SYSTEM,
        "Unique Ingredient Identifier (UNII)",
    ),
    system(
        "http://nucc.org/provider-taxonomy",
        OID_NUCC_TAXONOMY_CODE_SYSTEM,
        "NUCC Health Care Provider Taxonomy",
    ),
    system(
        "http://va.gov/terminology/medrt",
        OID_MED_RT_CODE_SYSTEM,
        "Medication Reference Terminology (MED-RT)",
    ),
    system(
        "http://hl7.org/fhir/ndfrt",
        OID_NDF_RT_CODE_SYSTEM,
        "National Drug File Reference Terminology (NDF-RT)",
    ),
    system("http://hl7.org/fhir/sid/us-ssn", OID_US_SSN_CODE_SYSTEM, "SSN"),
    system("http://hl7.org/fhir/sid/us-npi", OID_US_NPI_CODE_SYSTEM, "NPI"),
    system(
        "https://fhir.infoway-inforoute.ca/CodeSystem/pCLOCD",
        OID_PAN_CANADIAN_LOINC_CODE_SYSTEM,
        "pan-Canadian LOINC Observation Code Database (pCLOCD)",
    ),
    system(
        "http://terminology.hl7.org/CodeSystem/v3-ActCode",
        OID_ACT_CODE_CODE_SYSTEM,
        "ActCode",
    ),
    system(
        "http://terminology.hl7.org/CodeSystem/v3-ActClass",
        OID_ACT_CLASS_CODE_SYSTEM,
        "ActClass",
    ),
    system(
        "http://terminology.hl7.org/CodeSystem/v3-ParticipationType",
        OID_PARTICIPATION_TYPE_CODE_SYSTEM,
        "ParticipationType",
    ),
    system(
        "http://terminology.hl7.org/CodeSystem/v3-Confidentiality",
        OID_CONFIDENTIALITY_CODE_SYSTEM,
        "Confidentiality",
    ),
    system(
        "http://hl7.org/fhir/administrative-gender",
        OID_ADMINISTRATIVE_GENDER_CODE_SYSTEM,
        "Administrative Sex",
    ),
];

pub fn find_by_fhir_url(url: &str) -> Option<&'static CodeSystem> {
    CODE_SYSTEMS.iter().find(|entry| entry.fhir_url == url)
}

pub fn find_by_oid(oid: &str) -> Option<&'static CodeSystem> {
    CODE_SYSTEMS.iter().find(|entry| entry.oid == oid)
}

/// Map a FHIR system URL to the OID CDA uses for it.
///
/// `urn:oid:` systems are unwrapped; anything else must be in the registry.
pub fn map_fhir_system_to_ccda(system: Option<&str>) -> Option<String> {
    let system = system?;
    if let Some(oid) = system.strip_prefix("urn:oid:") {
        return Some(oid.to_string());
    }
    find_by_fhir_url(system).map(|entry| entry.oid.to_string())
}

/// Map a CDA code system OID back to a FHIR system URL.
pub fn map_ccda_system_to_fhir(oid: Option<&str>) -> Option<String> {
    let oid = oid?;
    Some(
        find_by_oid(oid)
            .map(|entry| entry.fhir_url.to_string())
            .unwrap_or_else(|| format!("urn:oid:{oid}")),
    )
}

/// Map one coding to a CDA code, filling the code system from the registry.
pub fn map_coding_to_code(coding: &Coding) -> CcdaCode {
    let system = coding.system.as_deref();
    let entry = system.and_then(find_by_fhir_url);
    let code_system = entry
        .map(|entry| entry.oid.to_string())
        .or_else(|| system.and_then(|s| s.strip_prefix("urn:oid:")).map(str::to_string));

    CcdaCode {
        code: coding.code.clone(),
        null_flavor: None,
        display_name: coding.display.clone(),
        code_system,
        code_system_name: entry.map(|entry| entry.display_name.to_string()),
        original_text: None,
        translation: Vec::new(),
    }
}

/// Map a concept to a CDA `code` element from its primary coding.
///
/// Returns `None` when the concept is absent or has no codings.
pub fn map_codeable_concept_to_code(concept: Option<&CodeableConcept>) -> Option<CcdaCode> {
    concept?.first_coding().map(map_coding_to_code)
}

/// Map a concept to a CDA `value` of type `CD`.
///
/// The first coding is primary; the remaining codings become translations in order.
pub fn map_codeable_concept_to_value(concept: Option<&CodeableConcept>) -> Option<CcdaValue> {
    let codings = concept?.codings();
    let (primary, rest) = codings.split_first()?;

    let mut code = map_coding_to_code(primary);
    code.translation = rest.iter().map(map_coding_to_code).collect();
    Some(CcdaValue::Coded(code))
}
