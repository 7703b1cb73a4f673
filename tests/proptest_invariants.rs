//! Property-based invariant tests for the command processor.
//!
//! Random edit sequences are replayed from the initial state, with ids drawn
//! from the live document (and occasionally stale ones). After every command:
//!
//! 1. The document has at least one step.
//! 2. Step and field `order` values are dense and match array position.
//! 3. Step ids are unique; field ids are unique within their step.
//! 4. The active step is unset or exists.
//! 5. Rejected commands leave the state untouched; accepted edits mark it modified.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use onboarding_forms::config::EngineConfig;
use onboarding_forms::forms::{
    BuiltinCatalog, Command, Configuration, Engine, EngineState, FieldId, FieldPatch, FieldType,
    SequentialIds, StepId, StepPatch, validate,
};

// ── Helpers ─────────────────────────────────────────────────────────────

const FIELD_TAGS: &[&str] = &["text", "email", "select", "radio", "heading", "rating-stars"];

#[derive(Debug, Clone)]
enum Op {
    AddStep,
    DeleteStep(usize),
    UpdateStep(usize),
    ReorderSteps(usize, usize),
    SelectStep(usize),
    AddField(usize, usize),
    DeleteField(usize, usize),
    ReorderFields(usize, usize, usize),
    UpdateField(usize, usize),
    StaleStep,
    Reset,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::AddStep),
        2 => any::<usize>().prop_map(Op::DeleteStep),
        1 => any::<usize>().prop_map(Op::UpdateStep),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::ReorderSteps(a, b)),
        2 => any::<usize>().prop_map(Op::SelectStep),
        4 => (any::<usize>(), 0..FIELD_TAGS.len()).prop_map(|(s, t)| Op::AddField(s, t)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(s, f)| Op::DeleteField(s, f)),
        3 => (any::<usize>(), any::<usize>(), any::<usize>())
            .prop_map(|(s, a, b)| Op::ReorderFields(s, a, b)),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(s, f)| Op::UpdateField(s, f)),
        1 => Just(Op::StaleStep),
        1 => Just(Op::Reset),
    ]
}

fn engine() -> Engine {
    Engine::new(
        EngineConfig::default(),
        Arc::new(BuiltinCatalog::default()),
        Arc::new(SequentialIds::new()),
    )
}

fn pick_step(state: &EngineState, i: usize) -> StepId {
    let steps = state.steps();
    if steps.is_empty() {
        return StepId::from("missing");
    }
    steps[i % steps.len()].id.clone()
}

fn pick_field(state: &EngineState, step: &StepId, i: usize) -> FieldId {
    match state.step(step) {
        Some(s) if !s.fields.is_empty() => s.fields[i % s.fields.len()].id.clone(),
        _ => FieldId::from("missing"),
    }
}

fn resolve(state: &EngineState, op: &Op) -> Command {
    match *op {
        Op::AddStep => Command::AddStep,
        Op::DeleteStep(i) => Command::DeleteStep {
            step_id: pick_step(state, i),
        },
        Op::UpdateStep(i) => Command::UpdateStep {
            step_id: pick_step(state, i),
            patch: StepPatch::title(format!("Renamed {i}")),
        },
        Op::ReorderSteps(a, b) => Command::ReorderSteps {
            active_id: pick_step(state, a),
            over_id: pick_step(state, b),
        },
        Op::SelectStep(i) => Command::SetActiveStep {
            step_id: Some(pick_step(state, i)),
        },
        Op::AddField(s, t) => Command::AddField {
            step_id: pick_step(state, s),
            field_type: FieldType::from(FIELD_TAGS[t]),
        },
        Op::DeleteField(s, f) => {
            let step_id = pick_step(state, s);
            let field_id = pick_field(state, &step_id, f);
            Command::DeleteField { step_id, field_id }
        }
        Op::ReorderFields(s, a, b) => {
            // Mostly target the active step, sometimes a background one.
            let step_id = if s % 3 == 0 {
                pick_step(state, s)
            } else {
                state
                    .active_step_id
                    .clone()
                    .unwrap_or_else(|| pick_step(state, s))
            };
            Command::ReorderFields {
                active_id: pick_field(state, &step_id, a),
                over_id: pick_field(state, &step_id, b),
                step_id,
            }
        }
        Op::UpdateField(s, f) => {
            let step_id = pick_step(state, s);
            let field_id = pick_field(state, &step_id, f);
            Command::UpdateField {
                step_id,
                field_id,
                patch: FieldPatch::required(f % 2 == 0),
            }
        }
        Op::StaleStep => Command::DeleteStep {
            step_id: StepId::from("stale-step"),
        },
        Op::Reset => Command::Reset,
    }
}

fn arbitrary_document() -> impl Strategy<Value = serde_json::Value> {
    let field = (0u8..6, -5i64..5, 0..FIELD_TAGS.len()).prop_map(|(id, order, tag)| {
        json!({"id": format!("f{id}"), "type": FIELD_TAGS[tag], "order": order, "label": format!("L{id}")})
    });
    let step = (0u8..6, -5i64..5, prop::collection::vec(field, 0..5)).prop_map(|(id, order, fields)| {
        json!({"id": format!("s{id}"), "title": format!("T{id}"), "order": order, "fields": fields})
    });
    prop::collection::vec(step, 0..6).prop_map(|steps| json!({"name": "generated", "steps": steps}))
}

// ═════════════════════════════════════════════════════════════════════════
// 1–4. Structural invariants hold after every command
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn invariants_hold_for_any_edit_sequence(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let engine = engine();
        let mut state = engine.initial_state();

        for op in &ops {
            let command = resolve(&state, op);
            state = engine.apply(&state, command.clone());

            let violations = validate(&state);
            prop_assert!(
                violations.is_empty(),
                "after {:?}: {:?}",
                command,
                violations
            );
            prop_assert!(!state.steps().is_empty());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Rejections are no-ops, accepted edits mark the document modified
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rejections_leave_state_untouched(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let engine = engine();
        let mut state = engine.initial_state();

        for op in &ops {
            let command = resolve(&state, op);
            let marks_modified = command.marks_modified();
            match engine.try_apply(&state, command.clone()) {
                Ok(next) => {
                    if marks_modified {
                        prop_assert!(next.is_modified, "{:?} did not mark modified", command);
                    }
                    state = next;
                }
                Err(_) => {
                    prop_assert_eq!(engine.apply(&state, command), state.clone());
                }
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Self-reorders are idempotent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn self_reorder_is_idempotent(
        ops in prop::collection::vec(op_strategy(), 0..40),
        pick in any::<usize>(),
    ) {
        let engine = engine();
        let mut state = engine.initial_state();
        for op in &ops {
            let command = resolve(&state, op);
            state = engine.apply(&state, command);
        }

        let step = pick_step(&state, pick);
        let same_step = engine.apply(&state, Command::ReorderSteps { active_id: step.clone(), over_id: step });
        prop_assert_eq!(&same_step, &state);

        if let Some(active) = state.active_step_id.clone() {
            let field = pick_field(&state, &active, pick);
            let same_field = engine.apply(
                &state,
                Command::ReorderFields { step_id: active, active_id: field.clone(), over_id: field },
            );
            prop_assert_eq!(&same_field, &state);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Load normalizes arbitrary documents without losing content
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn load_canonicalizes_untrusted_documents(doc in arbitrary_document()) {
        let engine = engine();
        let dirty = engine.apply(&engine.initial_state(), Command::AddStep);
        let configuration = Configuration::from_json(doc.clone()).unwrap();
        let input_steps = configuration.steps.len();
        let input_fields = configuration.field_count();

        let loaded = engine.apply(&dirty, Command::Load { configuration });

        prop_assert!(validate(&loaded).is_empty(), "{:?}", validate(&loaded));
        prop_assert!(!loaded.is_modified);
        prop_assert!(!loaded.is_loading);
        prop_assert_eq!(loaded.steps().len(), input_steps.max(1));
        prop_assert_eq!(loaded.configuration.field_count(), input_fields);

        let mut titles: Vec<String> = loaded
            .steps()
            .iter()
            .filter(|s| s.title.starts_with('T'))
            .map(|s| s.title.clone())
            .collect();
        let mut expected: Vec<String> = doc["steps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["title"].as_str().unwrap().to_string())
            .collect();
        titles.sort();
        expected.sort();
        prop_assert_eq!(titles, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Loading an already canonical document is a fixed point
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reloading_is_stable(doc in arbitrary_document()) {
        let engine = engine();
        let configuration = Configuration::from_json(doc).unwrap();
        let once = engine.apply(&engine.initial_state(), Command::Load { configuration });
        let twice = engine.apply(&once, Command::Load { configuration: once.configuration.clone() });
        prop_assert_eq!(once, twice);
    }
}
