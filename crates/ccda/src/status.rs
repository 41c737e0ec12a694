//! FHIR status values mapped to CDA `statusCode` values.

/// Condition `clinicalStatus` to problem concern status.
pub fn map_problem_status(clinical_status: Option<&str>) -> &'static str {
    match clinical_status {
        Some("inactive" | "remission" | "resolved") => "inactive",
        _ => "active",
    }
}

/// AllergyIntolerance `clinicalStatus` to allergy concern status.
pub fn map_allergy_status(clinical_status: Option<&str>) -> &'static str {
    match clinical_status {
        Some("inactive" | "resolved") => "completed",
        _ => "active",
    }
}

/// Immunization `status` to act status.
pub fn map_immunization_status(status: Option<&str>) -> &'static str {
    match status {
        Some("entered-in-error") => "nullified",
        Some("not-done") => "aborted",
        _ => "completed",
    }
}

/// MedicationRequest `status` to substance administration status.
pub fn map_medication_status(status: Option<&str>) -> &'static str {
    match status {
        Some("completed") => "completed",
        Some("stopped" | "entered-in-error") => "aborted",
        Some("cancelled" | "unknown") => "cancelled",
        _ => "active",
    }
}

/// Goal `lifecycleStatus` to observation status.
pub fn map_goal_status(lifecycle_status: Option<&str>) -> &'static str {
    match lifecycle_status {
        Some("completed" | "achieved") => "completed",
        Some("cancelled") => "cancelled",
        _ => "active",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_status_defaults_to_active() {
        assert_eq!(map_problem_status(Some("active")), "active");
        assert_eq!(map_problem_status(Some("relapse")), "active");
        assert_eq!(map_problem_status(Some("resolved")), "inactive");
        assert_eq!(map_problem_status(None), "active");
    }

    #[test]
    fn allergy_status_mapping() {
        assert_eq!(map_allergy_status(Some("active")), "active");
        assert_eq!(map_allergy_status(Some("inactive")), "completed");
        assert_eq!(map_allergy_status(Some("resolved")), "completed");
        assert_eq!(map_allergy_status(None), "active");
    }

    #[test]
    fn immunization_status_mapping() {
        assert_eq!(map_immunization_status(Some("completed")), "completed");
        assert_eq!(map_immunization_status(Some("entered-in-error")), "nullified");
        assert_eq!(map_immunization_status(Some("not-done")), "aborted");
        assert_eq!(map_immunization_status(None), "completed");
    }

    #[test]
    fn medication_status_mapping() {
        assert_eq!(map_medication_status(Some("active")), "active");
        assert_eq!(map_medication_status(Some("draft")), "active");
        assert_eq!(map_medication_status(Some("on-hold")), "active");
        assert_eq!(map_medication_status(Some("completed")), "completed");
        assert_eq!(map_medication_status(Some("stopped")), "aborted");
        assert_eq!(map_medication_status(Some("entered-in-error")), "aborted");
        assert_eq!(map_medication_status(Some("cancelled")), "cancelled");
        assert_eq!(map_medication_status(Some("unknown")), "cancelled");
        assert_eq!(map_medication_status(None), "active");
    }

    #[test]
    fn goal_status_mapping() {
        assert_eq!(map_goal_status(Some("completed")), "completed");
        assert_eq!(map_goal_status(Some("achieved")), "completed");
        assert_eq!(map_goal_status(Some("active")), "active");
        assert_eq!(map_goal_status(Some("on-hold")), "active");
        assert_eq!(map_goal_status(Some("cancelled")), "cancelled");
        assert_eq!(map_goal_status(Some("proposed")), "active");
    }
}
