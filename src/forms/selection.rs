//! Active-step selection rules.
//!
//! The active step is a plain id, never a reference into the step list, so
//! these helpers only decide which id (if any) it should hold.

use super::model::{Step, StepId};

/// The step a freshly loaded document should open on: the lowest `order`.
pub fn initial_selection(steps: &[Step]) -> Option<StepId> {
    steps.iter().min_by_key(|s| s.order).map(|s| s.id.clone())
}

/// Selection after `deleted` was removed from the document.
///
/// Deleting the active step moves the selection to the first remaining
/// step; deleting any other step leaves it where it was.
pub fn after_delete(
    active: Option<&StepId>,
    deleted: &StepId,
    remaining: &[Step],
) -> Option<StepId> {
    match active {
        Some(id) if id == deleted => initial_selection(remaining),
        Some(id) => Some(id.clone()),
        None => None,
    }
}

/// Whether `active` points at a step that exists (or is unset).
pub fn is_valid(active: Option<&StepId>, steps: &[Step]) -> bool {
    match active {
        Some(id) => steps.iter().any(|s| &s.id == id),
        None => true,
    }
}
