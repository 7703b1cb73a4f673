//! Engine state — the document plus editor bookkeeping.

use serde::{Deserialize, Serialize};

use super::model::{Configuration, Step, StepId};

/// Everything the command processor transitions between.
///
/// Values are never mutated in place by the engine; each command yields a
/// new state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    pub configuration: Configuration,
    pub active_step_id: Option<StepId>,
    pub is_loading: bool,
    pub is_modified: bool,
}

impl EngineState {
    /// A clean, unmodified state opened on the first step of `configuration`.
    pub fn new(configuration: Configuration) -> Self {
        let active_step_id = super::selection::initial_selection(&configuration.steps);
        Self {
            configuration,
            active_step_id,
            is_loading: false,
            is_modified: false,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.configuration.steps
    }

    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.configuration.step(id)
    }

    /// The step currently selected for editing.
    pub fn active_step(&self) -> Option<&Step> {
        self.active_step_id
            .as_ref()
            .and_then(|id| self.configuration.step(id))
    }

    pub fn is_active(&self, id: &StepId) -> bool {
        self.active_step_id.as_ref() == Some(id)
    }
}
