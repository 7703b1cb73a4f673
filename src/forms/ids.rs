//! Identifier generation for new steps and fields.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use super::model::{FieldId, StepId};

/// Source of fresh identifiers.
///
/// Injected into the engine so transitions stay deterministic under test.
pub trait IdGenerator: Send + Sync {
    fn step_id(&self) -> StepId;
    fn field_id(&self) -> FieldId;
}

/// Random v4 UUIDs, globally unique.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn step_id(&self) -> StepId {
        StepId::new(format!("step_{}", Uuid::new_v4().simple()))
    }

    fn field_id(&self) -> FieldId {
        FieldId::new(format!("field_{}", Uuid::new_v4().simple()))
    }
}

/// Counter-based ids (`step-1`, `field-2`, ...) shared by steps and fields.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl IdGenerator for SequentialIds {
    fn step_id(&self) -> StepId {
        StepId::new(format!("step-{}", self.bump()))
    }

    fn field_id(&self) -> FieldId {
        FieldId::new(format!("field-{}", self.bump()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_distinct_and_prefixed() {
        let ids = UuidIds;
        let a = ids.step_id();
        let b = ids.step_id();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("step_"));
        assert!(ids.field_id().as_str().starts_with("field_"));
    }

    #[test]
    fn sequential_ids_share_one_counter() {
        let ids = SequentialIds::new();
        assert_eq!(ids.step_id().as_str(), "step-1");
        assert_eq!(ids.field_id().as_str(), "field-2");
        assert_eq!(ids.step_id().as_str(), "step-3");
    }
}
