//! Object identifiers published by HL7 for C-CDA.
//!
//! These values are an external conformance contract and must match the C-CDA Implementation
//! Guide exactly.

// ============================================================================
// Code systems
// ============================================================================

pub const OID_SNOMED_CT_CODE_SYSTEM: &str = "2.16.840.1.113883.6.96";
pub const OID_LOINC_CODE_SYSTEM: &str = "2.16.840.1.113883.6.1";
pub const OID_RXNORM_CODE_SYSTEM: &str = "2.16.840.1.113883.6.88";
pub const OID_CPT_CODE_SYSTEM: &str = "2.16.840.1.113883.6.12";
pub const OID_NDC_CODE_SYSTEM: &str = "2.16.840.1.113883.6.69";
pub const OID_CVX_CODE_SYSTEM: &str = "2.16.840.1.113883.12.292";
pub const OID_UCUM_CODE_SYSTEM: &str = "2.16.840.1.113883.6.8";
pub const OID_ICD_10_CM_CODE_SYSTEM: &str = "2.16.840.1.113883.6.90";
pub const OID_MDC_CODE_SYSTEM: &str = "2.16.840.1.113883.6.24";
pub const OID_NCI_THESAURUS_CODE_SYSTEM: &str = "2.16.840.1.113883.3.26.1.1";
pub const OID_UNII_CODE_SYSTEM: &str = "2.16.840.1.113883.4.9";
pub const OID_NUCC_TAXONOMY_CODE_SYSTEM: &str = "2.16.840.1.113883.6.101";
pub const OID_MED_RT_CODE_SYSTEM: &str = "2.16.840.1.113883.6.345";
pub const OID_NDF_RT_CODE_SYSTEM: &str = "2.16.840.1.113883.3.26.1.5";
pub const OID_US_SSN_CODE_SYSTEM: &str = "2.16.840.1.113883.4.1";
pub const OID_US_NPI_CODE_SYSTEM: &str = "2.16.840.1.113883.4.6";
pub const OID_PAN_CANADIAN_LOINC_CODE_SYSTEM: &str = "2.16.840.1.113883.2.20.5.1";
pub const OID_ACT_CODE_CODE_SYSTEM: &str = "2.16.840.1.113883.5.4";
pub const OID_ACT_CLASS_CODE_SYSTEM: &str = "2.16.840.1.113883.5.6";
pub const OID_PARTICIPATION_TYPE_CODE_SYSTEM: &str = "2.16.840.1.113883.5.90";
pub const OID_CONFIDENTIALITY_CODE_SYSTEM: &str = "2.16.840.1.113883.5.25";
pub const OID_ADMINISTRATIVE_GENDER_CODE_SYSTEM: &str = "2.16.840.1.113883.5.1";

// ============================================================================
// Entry templates
// ============================================================================

macro_rules! entry_template {
    ($name:ident, $suffix:literal) => {
        pub const $name: &str = concat!("2.16.840.1.113883.10.20.22.4.", $suffix);
    };
}

entry_template!(OID_PROBLEM_CONCERN_ACT, "3");
entry_template!(OID_PROBLEM_OBSERVATION, "4");
entry_template!(OID_RESULT_OBSERVATION, "2");
entry_template!(OID_ALLERGY_OBSERVATION, "7");
entry_template!(OID_SEVERITY_OBSERVATION, "8");
entry_template!(OID_REACTION_OBSERVATION, "9");
entry_template!(OID_PROCEDURE_ACTIVITY_ACT, "12");
entry_template!(OID_PROCEDURE_ACTIVITY_OBSERVATION, "13");
entry_template!(OID_PROCEDURE_ACTIVITY_PROCEDURE, "14");
entry_template!(OID_MEDICATION_ACTIVITY, "16");
entry_template!(OID_MEDICATION_INFORMATION, "23");
entry_template!(OID_VITAL_SIGN_OBSERVATION, "27");
entry_template!(OID_ALLERGY_CONCERN_ACT, "30");
entry_template!(OID_SERVICE_DELIVERY_LOCATION, "32");
entry_template!(OID_PLANNED_OBSERVATION, "44");
entry_template!(OID_ENCOUNTER_ACTIVITY, "49");
entry_template!(OID_IMMUNIZATION_ACTIVITY, "52");
entry_template!(OID_IMMUNIZATION_MEDICATION_INFORMATION, "54");
entry_template!(OID_SMOKING_STATUS_OBSERVATION, "78");
entry_template!(OID_TOBACCO_USE_OBSERVATION, "85");
entry_template!(OID_GOAL_OBSERVATION, "121");
entry_template!(OID_HEALTH_CONCERN_ACT, "132");
entry_template!(OID_MEDICATION_FREE_TEXT_SIG, "147");
entry_template!(OID_BIRTH_SEX_OBSERVATION, "200");
entry_template!(OID_SEX_OBSERVATION, "507");

// ============================================================================
// Section templates
// ============================================================================

macro_rules! section_template {
    ($name:ident, $suffix:literal) => {
        pub const $name: &str = concat!("2.16.840.1.113883.10.20.22.2.", $suffix);
    };
}

section_template!(OID_MEDICATIONS_SECTION, "1.1");
section_template!(OID_IMMUNIZATIONS_SECTION, "2.1");
section_template!(OID_RESULTS_SECTION, "3.1");
section_template!(OID_VITAL_SIGNS_SECTION, "4.1");
section_template!(OID_PROBLEMS_SECTION, "5.1");
section_template!(OID_ALLERGIES_SECTION, "6.1");
section_template!(OID_PROCEDURES_SECTION, "7.1");
section_template!(OID_PLAN_OF_TREATMENT_SECTION, "10");
section_template!(OID_SOCIAL_HISTORY_SECTION, "17");
section_template!(OID_ENCOUNTERS_SECTION, "22.1");
section_template!(OID_HEALTH_CONCERNS_SECTION, "58");
section_template!(OID_GOALS_SECTION, "60");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_template_roots() {
        assert_eq!(OID_ENCOUNTER_ACTIVITY, "2.16.840.1.113883.10.20.22.4.49");
        assert_eq!(OID_PROBLEM_OBSERVATION, "2.16.840.1.113883.10.20.22.4.4");
        assert_eq!(OID_ENCOUNTERS_SECTION, "2.16.840.1.113883.10.20.22.2.22.1");
    }
}
