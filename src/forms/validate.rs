//! Structural consistency checks for an engine state.

use std::collections::HashSet;

use super::model::{FieldId, StepId};
use super::state::EngineState;

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    NoSteps,
    StepOrder {
        step_id: StepId,
        expected: usize,
        found: i64,
    },
    FieldOrder {
        step_id: StepId,
        field_id: FieldId,
        expected: usize,
        found: i64,
    },
    DuplicateStepId {
        step_id: StepId,
    },
    DuplicateFieldId {
        step_id: StepId,
        field_id: FieldId,
    },
    DanglingActiveStep {
        step_id: StepId,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSteps => write!(f, "configuration has no steps"),
            Self::StepOrder {
                step_id,
                expected,
                found,
            } => write!(f, "step {step_id} has order {found}, expected {expected}"),
            Self::FieldOrder {
                step_id,
                field_id,
                expected,
                found,
            } => write!(
                f,
                "field {field_id} in step {step_id} has order {found}, expected {expected}"
            ),
            Self::DuplicateStepId { step_id } => write!(f, "duplicate step id {step_id}"),
            Self::DuplicateFieldId { step_id, field_id } => {
                write!(f, "duplicate field id {field_id} in step {step_id}")
            }
            Self::DanglingActiveStep { step_id } => {
                write!(f, "active step {step_id} does not exist")
            }
        }
    }
}

/// Every invariant violation in `state`; empty when the state is consistent.
pub fn validate(state: &EngineState) -> Vec<Violation> {
    let mut violations = Vec::new();
    let steps = state.steps();

    if steps.is_empty() {
        violations.push(Violation::NoSteps);
    }

    let mut step_ids = HashSet::new();
    for (index, step) in steps.iter().enumerate() {
        if step.order != index as i64 {
            violations.push(Violation::StepOrder {
                step_id: step.id.clone(),
                expected: index,
                found: step.order,
            });
        }
        if !step_ids.insert(&step.id) {
            violations.push(Violation::DuplicateStepId {
                step_id: step.id.clone(),
            });
        }

        let mut field_ids = HashSet::new();
        for (index, field) in step.fields.iter().enumerate() {
            if field.order != index as i64 {
                violations.push(Violation::FieldOrder {
                    step_id: step.id.clone(),
                    field_id: field.id.clone(),
                    expected: index,
                    found: field.order,
                });
            }
            if !field_ids.insert(&field.id) {
                violations.push(Violation::DuplicateFieldId {
                    step_id: step.id.clone(),
                    field_id: field.id.clone(),
                });
            }
        }
    }

    if let Some(active) = &state.active_step_id
        && !step_ids.contains(active)
    {
        violations.push(Violation::DanglingActiveStep {
            step_id: active.clone(),
        });
    }

    violations
}

pub fn is_consistent(state: &EngineState) -> bool {
    validate(state).is_empty()
}
