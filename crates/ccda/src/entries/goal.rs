//! Goal Observation and Planned Observation entries.
//!
//! Responsibilities:
//! - Render a Goal in the Goals section as a Goal Observation.
//! - Render a Goal in the Plan of Treatment section as a Planned Observation.
//! - Attach one `RSON` act per goal target.
//!
//! Notes:
//! - A Planned Observation takes its code from `Goal.description`; without a description no
//!   entry is made. A description with only text yields an entry without a code.

use super::ConversionContext;
use crate::code_systems::map_codeable_concept_to_code;
use crate::datetime::map_effective_time;
use crate::identifiers::map_identifiers;
use crate::oids::OID_LOINC_CODE_SYSTEM;
use crate::status::map_goal_status;
use crate::templates::{Template, LOINC_GOALS_SECTION, LOINC_PLAN_OF_TREATMENT_SECTION};
use crate::types::{
    ActClassCode, CcdaAct, CcdaCode, CcdaEffectiveTime, CcdaEntry, CcdaEntryRelationship,
    CcdaObservation, CcdaStatusCode, CcdaTemplateId, CcdaValue, MoodCode, ObservationClassCode,
    RelationshipTypeCode,
};
use fhir::{Goal, GoalTarget};

const LOINC_RESIDENT_GOAL: &str = "58144-7";

/// Build the entry for a Goal listed in the section with code `section_code`.
pub fn create_goal_entry(
    ctx: &ConversionContext<'_>,
    section_code: Option<&str>,
    goal: &Goal,
) -> Option<CcdaEntry> {
    let (template_id, code) = match section_code {
        Some(LOINC_GOALS_SECTION) => (
            vec![Template::GoalObservation.undated()],
            Some(CcdaCode::fixed(
                LOINC_RESIDENT_GOAL,
                "Resident's overall goal established during assessment process",
                OID_LOINC_CODE_SYSTEM,
                "LOINC",
            )),
        ),
        Some(LOINC_PLAN_OF_TREATMENT_SECTION) => {
            let Some(description) = goal.description.as_ref() else {
                tracing::debug!(goal = ?goal.id, "planned goal has no description");
                return None;
            };
            (
                vec![Template::PlannedObservation.undated()],
                map_codeable_concept_to_code(Some(description)),
            )
        }
        _ => {
            tracing::debug!(
                section = ?section_code,
                goal = ?goal.id,
                "section does not take Goal entries"
            );
            return None;
        }
    };

    Some(goal_observation(ctx, goal, template_id, code))
}

fn goal_observation(
    ctx: &ConversionContext<'_>,
    goal: &Goal,
    template_id: Vec<CcdaTemplateId>,
    code: Option<CcdaCode>,
) -> CcdaEntry {
    let effective_time = map_effective_time(goal.start_date.as_deref(), None);

    let entry_relationship: Option<Vec<_>> = goal.target.as_ref().map(|targets| {
        targets
            .iter()
            .map(|target| target_relationship(target, effective_time.clone()))
            .collect()
    });

    CcdaEntry::Observation(CcdaObservation {
        class_code: ObservationClassCode::Observation,
        mood_code: MoodCode::Goal,
        template_id,
        id: map_identifiers(goal.id.as_deref(), goal.identifier.as_deref(), goal),
        code,
        text: ctx.text(goal.extension.as_deref()),
        status_code: Some(CcdaStatusCode::new(map_goal_status(
            goal.lifecycle_status.as_deref(),
        ))),
        effective_time,
        value: goal
            .description
            .as_ref()
            .and_then(|description| description.text.clone())
            .map(|text| CcdaValue::Text { text }),
        participant: None,
        entry_relationship,
    })
}

fn target_relationship(
    target: &GoalTarget,
    effective_time: Option<Vec<CcdaEffectiveTime>>,
) -> CcdaEntryRelationship {
    let act = CcdaAct {
        class_code: ActClassCode::Act,
        mood_code: MoodCode::Event,
        template_id: Template::ProcedureActivityAct.undated_then_dated(),
        id: Vec::new(),
        code: map_codeable_concept_to_code(target.measure.as_ref()),
        text: None,
        status_code: Some(CcdaStatusCode::completed()),
        effective_time,
        entry_relationship: None,
    };

    CcdaEntryRelationship {
        inversion_ind: Some(true),
        ..CcdaEntryRelationship::new(RelationshipTypeCode::Reason, CcdaEntry::Act(act))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_systems::{LOINC_URL, SNOMED_URL};
    use crate::entries::test_support::{context, narrative};
    use crate::oids::{OID_GOAL_OBSERVATION, OID_PLANNED_OBSERVATION};
    use fhir::{Bundle, CodeableConcept, Coding};

    fn goal() -> Goal {
        Goal {
            id: Some("goal-1".into()),
            extension: narrative("goal-1"),
            lifecycle_status: Some("achieved".into()),
            description: Some(CodeableConcept {
                coding: Some(vec![Coding::new(SNOMED_URL, "289169006", "Weight loss")]),
                text: Some("Lose 5 kg".into()),
                ..Default::default()
            }),
            start_date: Some("2024-02-01".into()),
            target: Some(vec![GoalTarget {
                measure: Some(CodeableConcept::from_codings(vec![Coding::new(
                    LOINC_URL,
                    "29463-7",
                    "Body weight",
                )])),
                due_date: None,
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn goals_section_yields_goal_observation() {
        let bundle = Bundle::default();
        let ctx = context(&bundle);
        let entry = create_goal_entry(&ctx, Some(LOINC_GOALS_SECTION), &goal()).expect("goal");
        let observation = entry.as_observation().expect("observation");

        assert_eq!(observation.mood_code, MoodCode::Goal);
        assert_eq!(observation.template_id.len(), 1);
        assert_eq!(observation.template_id[0].root, OID_GOAL_OBSERVATION);
        assert_eq!(
            observation.code.as_ref().and_then(|c| c.code.as_deref()),
            Some("58144-7")
        );
        assert_eq!(
            observation.status_code.as_ref().map(|s| s.code.as_str()),
            Some("completed")
        );
        assert_eq!(
            observation.value,
            Some(CcdaValue::Text {
                text: "Lose 5 kg".into()
            })
        );
        let effective = observation.effective_time.as_ref().expect("effective");
        assert_eq!(effective[0].value.as_deref(), Some("20240201"));
    }

    #[test]
    fn targets_become_reason_acts() {
        let bundle = Bundle::default();
        let ctx = context(&bundle);
        let entry = create_goal_entry(&ctx, Some(LOINC_GOALS_SECTION), &goal()).expect("goal");
        let observation = entry.as_observation().expect("observation");
        let relationships = observation.entry_relationship.as_ref().expect("targets");

        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].type_code, RelationshipTypeCode::Reason);
        assert_eq!(relationships[0].inversion_ind, Some(true));
        let act = relationships[0].entry.as_act().expect("act");
        assert_eq!(act.code.as_ref().and_then(|c| c.code.as_deref()), Some("29463-7"));
    }

    #[test]
    fn plan_of_treatment_uses_description_code() {
        let bundle = Bundle::default();
        let ctx = context(&bundle);
        let entry = create_goal_entry(&ctx, Some(LOINC_PLAN_OF_TREATMENT_SECTION), &goal())
            .expect("planned observation");
        let observation = entry.as_observation().expect("observation");

        assert_eq!(
            observation.template_id,
            vec![CcdaTemplateId {
                root: OID_PLANNED_OBSERVATION.to_string(),
                extension: None,
            }]
        );
        assert_eq!(
            observation.code.as_ref().and_then(|c| c.code.as_deref()),
            Some("289169006")
        );
    }

    #[test]
    fn planned_goal_with_text_only_description_has_no_code() {
        let bundle = Bundle::default();
        let ctx = context(&bundle);
        let source = Goal {
            lifecycle_status: Some("active".into()),
            description: Some(CodeableConcept {
                coding: None,
                text: Some("Walk 30 minutes daily".into()),
                ..Default::default()
            }),
            ..goal()
        };

        let entry = create_goal_entry(&ctx, Some(LOINC_PLAN_OF_TREATMENT_SECTION), &source)
            .expect("planned observation");
        let observation = entry.as_observation().expect("observation");

        assert!(observation.code.is_none());
        assert_eq!(
            observation.value,
            Some(CcdaValue::Text {
                text: "Walk 30 minutes daily".into()
            })
        );
        assert_eq!(
            observation.status_code.as_ref().map(|s| s.code.as_str()),
            Some("active")
        );
    }

    #[test]
    fn completed_goal_is_completed() {
        let bundle = Bundle::default();
        let ctx = context(&bundle);
        let source = Goal {
            lifecycle_status: Some("completed".into()),
            ..goal()
        };

        let entry = create_goal_entry(&ctx, Some(LOINC_PLAN_OF_TREATMENT_SECTION), &source)
            .expect("planned observation");
        let observation = entry.as_observation().expect("observation");
        assert_eq!(
            observation.status_code.as_ref().map(|s| s.code.as_str()),
            Some("completed")
        );
    }

    #[test]
    fn planned_goal_without_description_is_dropped() {
        let bundle = Bundle::default();
        let ctx = context(&bundle);
        let source = Goal {
            description: None,
            ..goal()
        };

        assert!(create_goal_entry(&ctx, Some(LOINC_PLAN_OF_TREATMENT_SECTION), &source).is_none());
        assert!(create_goal_entry(&ctx, Some(LOINC_GOALS_SECTION), &source).is_some());
    }

    #[test]
    fn goal_without_targets_has_no_relationships() {
        let bundle = Bundle::default();
        let ctx = context(&bundle);
        let source = Goal {
            id: None,
            target: None,
            lifecycle_status: None,
            ..goal()
        };
        let entry = create_goal_entry(&ctx, Some(LOINC_GOALS_SECTION), &source).expect("goal");
        let observation = entry.as_observation().expect("observation");

        assert!(observation.entry_relationship.is_none());
        assert!(!observation.id.is_empty());
        assert_eq!(
            observation.status_code.as_ref().map(|s| s.code.as_str()),
            Some("active")
        );
    }

    #[test]
    fn other_sections_take_no_goal() {
        let bundle = Bundle::default();
        let ctx = context(&bundle);
        assert!(create_goal_entry(&ctx, Some("11450-4"), &goal()).is_none());
    }
}
