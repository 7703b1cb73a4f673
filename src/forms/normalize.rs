//! Order normalization and repair of externally supplied documents.
//!
//! Every structural edit ends by rewriting `order` from array position, so
//! ordering never drifts or collides no matter how many edits accumulate.

use std::collections::HashSet;

use tracing::warn;

use super::ids::IdGenerator;
use super::model::{Configuration, Field, Step};

/// Rewrite each step's `order` to its index.
pub fn renumber_steps(steps: &mut [Step]) {
    for (index, step) in steps.iter_mut().enumerate() {
        step.order = index as i64;
    }
}

/// Rewrite each field's `order` to its index.
pub fn renumber_fields(fields: &mut [Field]) {
    for (index, field) in fields.iter_mut().enumerate() {
        field.order = index as i64;
    }
}

/// Move the element at `from` so it ends up at index `to`, shifting the
/// elements in between.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Bring a document into canonical order.
///
/// Steps are stably sorted by their existing `order` (ties keep array
/// position) and renumbered `0..n`; the same happens to each step's fields.
pub fn normalize_configuration(mut config: Configuration) -> Configuration {
    config.steps.sort_by_key(|s| s.order);
    renumber_steps(&mut config.steps);
    for step in &mut config.steps {
        step.fields.sort_by_key(|f| f.order);
        renumber_fields(&mut step.fields);
    }
    config
}

/// What [`repair_ids`] had to change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub reissued_step_ids: usize,
    pub reissued_field_ids: usize,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.reissued_step_ids == 0 && self.reissued_field_ids == 0
    }
}

/// Give empty or duplicate ids a fresh value.
///
/// The first occurrence of an id keeps it; later duplicates are reissued.
/// Field ids only need to be unique within their step.
pub fn repair_ids(config: &mut Configuration, ids: &dyn IdGenerator) -> RepairReport {
    let mut report = RepairReport::default();
    let mut seen_steps = HashSet::new();

    for step in &mut config.steps {
        if step.id.is_empty() || !seen_steps.insert(step.id.clone()) {
            let fresh = ids.step_id();
            warn!(old_id = %step.id, new_id = %fresh, "Reissued empty or duplicate step id");
            step.id = fresh;
            seen_steps.insert(step.id.clone());
            report.reissued_step_ids += 1;
        }

        let mut seen_fields = HashSet::new();
        for field in &mut step.fields {
            if field.id.is_empty() || !seen_fields.insert(field.id.clone()) {
                let fresh = ids.field_id();
                warn!(
                    step_id = %step.id,
                    old_id = %field.id,
                    new_id = %fresh,
                    "Reissued empty or duplicate field id"
                );
                field.id = fresh;
                seen_fields.insert(field.id.clone());
                report.reissued_field_ids += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::ids::SequentialIds;
    use crate::forms::model::{FieldId, FieldType, StepId};
    use serde_json::json;

    fn step(id: &str, order: i64) -> Step {
        let mut s = Step::new(StepId::from(id), id);
        s.order = order;
        s
    }

    fn field(id: &str, order: i64) -> Field {
        let mut f = Field::new(FieldId::from(id), FieldType::from("text"), id);
        f.order = order;
        f
    }

    fn config_with(steps: Vec<Step>) -> Configuration {
        let mut config = Configuration::from_json(json!({})).unwrap();
        config.steps = steps;
        config
    }

    fn step_ids(config: &Configuration) -> Vec<&str> {
        config.steps.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn sorts_by_existing_order_then_renumbers() {
        let config = config_with(vec![step("c", 7), step("a", -3), step("b", 2)]);
        let config = normalize_configuration(config);
        assert_eq!(step_ids(&config), vec!["a", "b", "c"]);
        let orders: Vec<i64> = config.steps.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn ties_keep_array_position() {
        let config = config_with(vec![step("x", 1), step("y", 0), step("z", 1)]);
        let config = normalize_configuration(config);
        assert_eq!(step_ids(&config), vec!["y", "x", "z"]);
    }

    #[test]
    fn fields_are_normalized_per_step() {
        let mut s = step("s", 0);
        s.fields = vec![field("f3", 30), field("f1", 10), field("f2", 10)];
        let config = normalize_configuration(config_with(vec![s]));

        let fields = &config.steps[0].fields;
        let ids: Vec<&str> = fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f2", "f3"]);
        assert!(fields.iter().enumerate().all(|(i, f)| f.order == i as i64));
    }

    #[test]
    fn move_item_forward_and_back() {
        let mut v = vec!['a', 'b', 'c', 'd'];
        move_item(&mut v, 0, 2);
        assert_eq!(v, vec!['b', 'c', 'a', 'd']);
        move_item(&mut v, 3, 0);
        assert_eq!(v, vec!['d', 'b', 'c', 'a']);
        move_item(&mut v, 1, 9);
        assert_eq!(v, vec!['d', 'b', 'c', 'a']);
    }

    #[test]
    fn repair_reissues_duplicates_and_blanks() {
        let mut s1 = step("dup", 0);
        s1.fields = vec![field("f", 0), field("f", 1), field("", 2)];
        let s2 = step("dup", 1);
        let s3 = step("", 2);
        let mut config = config_with(vec![s1, s2, s3]);

        let ids = SequentialIds::new();
        let report = repair_ids(&mut config, &ids);

        assert_eq!(report.reissued_step_ids, 2);
        assert_eq!(report.reissued_field_ids, 2);
        assert_eq!(config.steps[0].id.as_str(), "dup");
        let unique: HashSet<_> = config.steps.iter().map(|s| s.id.clone()).collect();
        assert_eq!(unique.len(), 3);
        let field_ids: HashSet<_> = config.steps[0].fields.iter().map(|f| f.id.clone()).collect();
        assert_eq!(field_ids.len(), 3);
    }

    #[test]
    fn repair_leaves_clean_documents_alone() {
        let mut s = step("s1", 0);
        s.fields = vec![field("a", 0)];
        let mut s2 = step("s2", 1);
        // Same field id in a different step is allowed.
        s2.fields = vec![field("a", 0)];
        let mut config = config_with(vec![s, s2]);
        let before = config.clone();

        let report = repair_ids(&mut config, &SequentialIds::new());
        assert!(report.is_clean());
        assert_eq!(config, before);
    }
}
