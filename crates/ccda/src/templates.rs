//! Template registry.
//!
//! C-CDA templates are identified by an OID root, and most also carry a dated identity
//! (`root` + `extension`) naming the Implementation Guide release. Which identities an entry
//! declares, and in which order, is fixed per construct by the builder that emits it.

use crate::oids::*;
use crate::types::CcdaTemplateId;

// ============================================================================
// Section codes
// ============================================================================

pub const LOINC_MEDICATIONS_SECTION: &str = "10160-0";
pub const LOINC_IMMUNIZATIONS_SECTION: &str = "11369-6";
pub const LOINC_PROBLEMS_SECTION: &str = "11450-4";
pub const LOINC_PLAN_OF_TREATMENT_SECTION: &str = "18776-5";
pub const LOINC_SOCIAL_HISTORY_SECTION: &str = "29762-2";
pub const LOINC_RESULTS_SECTION: &str = "30954-2";
pub const LOINC_ENCOUNTERS_SECTION: &str = "46240-8";
pub const LOINC_PROCEDURES_SECTION: &str = "47519-4";
pub const LOINC_ALLERGIES_SECTION: &str = "48765-2";
pub const LOINC_GOALS_SECTION: &str = "61146-7";
pub const LOINC_HEALTH_CONCERNS_SECTION: &str = "75310-3";
pub const LOINC_VITAL_SIGNS_SECTION: &str = "8716-3";

// ============================================================================
// Entry templates
// ============================================================================

/// An entry-level C-CDA template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Template {
    EncounterActivity,
    ServiceDeliveryLocation,
    ProblemObservation,
    ProblemConcernAct,
    HealthConcernAct,
    GoalObservation,
    PlannedObservation,
    ProcedureActivityAct,
    ProcedureActivityProcedure,
    ProcedureActivityObservation,
    ImmunizationActivity,
    ImmunizationMedicationInformation,
    AllergyConcernAct,
    AllergyObservation,
    ReactionObservation,
    SeverityObservation,
    MedicationActivity,
    MedicationInformation,
    MedicationFreeTextSig,
    ResultObservation,
    VitalSignObservation,
    SmokingStatusObservation,
    TobaccoUseObservation,
    SexObservation,
    BirthSexObservation,
}

impl Template {
    pub fn root(self) -> &'static str {
        match self {
            Template::EncounterActivity => OID_ENCOUNTER_ACTIVITY,
            Template::ServiceDeliveryLocation => OID_SERVICE_DELIVERY_LOCATION,
            Template::ProblemObservation => OID_PROBLEM_OBSERVATION,
            Template::ProblemConcernAct => OID_PROBLEM_CONCERN_ACT,
            Template::HealthConcernAct => OID_HEALTH_CONCERN_ACT,
            Template::GoalObservation => OID_GOAL_OBSERVATION,
            Template::PlannedObservation => OID_PLANNED_OBSERVATION,
            Template::ProcedureActivityAct => OID_PROCEDURE_ACTIVITY_ACT,
            Template::ProcedureActivityProcedure => OID_PROCEDURE_ACTIVITY_PROCEDURE,
            Template::ProcedureActivityObservation => OID_PROCEDURE_ACTIVITY_OBSERVATION,
            Template::ImmunizationActivity => OID_IMMUNIZATION_ACTIVITY,
            Template::ImmunizationMedicationInformation => OID_IMMUNIZATION_MEDICATION_INFORMATION,
            Template::AllergyConcernAct => OID_ALLERGY_CONCERN_ACT,
            Template::AllergyObservation => OID_ALLERGY_OBSERVATION,
            Template::ReactionObservation => OID_REACTION_OBSERVATION,
            Template::SeverityObservation => OID_SEVERITY_OBSERVATION,
            Template::MedicationActivity => OID_MEDICATION_ACTIVITY,
            Template::MedicationInformation => OID_MEDICATION_INFORMATION,
            Template::MedicationFreeTextSig => OID_MEDICATION_FREE_TEXT_SIG,
            Template::ResultObservation => OID_RESULT_OBSERVATION,
            Template::VitalSignObservation => OID_VITAL_SIGN_OBSERVATION,
            Template::SmokingStatusObservation => OID_SMOKING_STATUS_OBSERVATION,
            Template::TobaccoUseObservation => OID_TOBACCO_USE_OBSERVATION,
            Template::SexObservation => OID_SEX_OBSERVATION,
            Template::BirthSexObservation => OID_BIRTH_SEX_OBSERVATION,
        }
    }

    /// The Implementation Guide release stamped on the dated identity, if the template has one.
    pub fn dated_extension(self) -> Option<&'static str> {
        match self {
            Template::EncounterActivity
            | Template::ProblemObservation
            | Template::ProblemConcernAct
            | Template::HealthConcernAct
            | Template::ImmunizationActivity
            | Template::AllergyConcernAct
            | Template::ResultObservation => Some("2015-08-01"),
            Template::ProcedureActivityAct
            | Template::ProcedureActivityProcedure
            | Template::ProcedureActivityObservation
            | Template::ImmunizationMedicationInformation
            | Template::AllergyObservation
            | Template::ReactionObservation
            | Template::SeverityObservation
            | Template::MedicationActivity
            | Template::MedicationInformation
            | Template::VitalSignObservation
            | Template::SmokingStatusObservation
            | Template::TobaccoUseObservation => Some("2014-06-09"),
            Template::SexObservation => Some("2023-06-28"),
            Template::BirthSexObservation => Some("2016-06-01"),
            Template::ServiceDeliveryLocation
            | Template::GoalObservation
            | Template::PlannedObservation
            | Template::MedicationFreeTextSig => None,
        }
    }

    /// The versionless identity.
    pub fn undated(self) -> CcdaTemplateId {
        CcdaTemplateId {
            root: self.root().to_string(),
            extension: None,
        }
    }

    /// The identity stamped with `extension`.
    pub fn dated_as(self, extension: &str) -> CcdaTemplateId {
        CcdaTemplateId {
            root: self.root().to_string(),
            extension: Some(extension.to_string()),
        }
    }

    /// `[undated, dated]`, or just `[undated]` when the template has no dated identity.
    pub fn undated_then_dated(self) -> Vec<CcdaTemplateId> {
        match self.dated_extension() {
            Some(extension) => vec![self.undated(), self.dated_as(extension)],
            None => vec![self.undated()],
        }
    }

    /// `[dated, undated]`, or just `[undated]` when the template has no dated identity.
    pub fn dated_then_undated(self) -> Vec<CcdaTemplateId> {
        match self.dated_extension() {
            Some(extension) => vec![self.dated_as(extension), self.undated()],
            None => vec![self.undated()],
        }
    }
}

// ============================================================================
// Section templates
// ============================================================================

struct SectionTemplate {
    loinc: &'static str,
    root: &'static str,
    extension: Option<&'static str>,
}

static SECTION_TEMPLATES: &[SectionTemplate] = &[
    SectionTemplate {
        loinc: LOINC_ENCOUNTERS_SECTION,
        root: OID_ENCOUNTERS_SECTION,
        extension: Some("2015-08-01"),
    },
    SectionTemplate {
        loinc: LOINC_PROBLEMS_SECTION,
        root: OID_PROBLEMS_SECTION,
        extension: Some("2015-08-01"),
    },
    SectionTemplate {
        loinc: LOINC_HEALTH_CONCERNS_SECTION,
        root: OID_HEALTH_CONCERNS_SECTION,
        extension: Some("2015-08-01"),
    },
    SectionTemplate {
        loinc: LOINC_GOALS_SECTION,
        root: OID_GOALS_SECTION,
        extension: None,
    },
    SectionTemplate {
        loinc: LOINC_PLAN_OF_TREATMENT_SECTION,
        root: OID_PLAN_OF_TREATMENT_SECTION,
        extension: Some("2014-06-09"),
    },
    SectionTemplate {
        loinc: LOINC_IMMUNIZATIONS_SECTION,
        root: OID_IMMUNIZATIONS_SECTION,
        extension: Some("2015-08-01"),
    },
    SectionTemplate {
        loinc: LOINC_PROCEDURES_SECTION,
        root: OID_PROCEDURES_SECTION,
        extension: Some("2014-06-09"),
    },
    SectionTemplate {
        loinc: LOINC_RESULTS_SECTION,
        root: OID_RESULTS_SECTION,
        extension: Some("2015-08-01"),
    },
    SectionTemplate {
        loinc: LOINC_VITAL_SIGNS_SECTION,
        root: OID_VITAL_SIGNS_SECTION,
        extension: Some("2015-08-01"),
    },
    SectionTemplate {
        loinc: LOINC_SOCIAL_HISTORY_SECTION,
        root: OID_SOCIAL_HISTORY_SECTION,
        extension: Some("2015-08-01"),
    },
    SectionTemplate {
        loinc: LOINC_ALLERGIES_SECTION,
        root: OID_ALLERGIES_SECTION,
        extension: Some("2015-08-01"),
    },
    SectionTemplate {
        loinc: LOINC_MEDICATIONS_SECTION,
        root: OID_MEDICATIONS_SECTION,
        extension: Some("2014-06-09"),
    },
];

/// Template ids for the section identified by a LOINC code, versionless identity first.
pub fn section_template_ids(loinc: &str) -> Option<Vec<CcdaTemplateId>> {
    let section = SECTION_TEMPLATES.iter().find(|s| s.loinc == loinc)?;
    let mut ids = vec![CcdaTemplateId {
        root: section.root.to_string(),
        extension: None,
    }];
    if let Some(extension) = section.extension {
        ids.push(CcdaTemplateId {
            root: section.root.to_string(),
            extension: Some(extension.to_string()),
        });
    }
    Some(ids)
}
