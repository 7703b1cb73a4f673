//! Command processor — `(state, command) -> state`.
//!
//! Every command is applied to a copy of the input state; a rejected command
//! discards the copy, so callers always get back either a fully edited state
//! or the one they passed in. Invariants are kept by construction:
//!
//! - a document always has at least one step (the last step cannot be deleted)
//! - step and field `order` equal array position (renumbered after each edit)
//! - step ids are unique, field ids unique within their step
//! - the active step id is unset or names an existing step

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::Rejection;

use super::catalog::{BuiltinCatalog, FieldTypeCatalog};
use super::command::{Command, ConfigAttribute, FieldPatch, StepPatch};
use super::ids::{IdGenerator, UuidIds};
use super::model::{Configuration, Field, FieldId, FieldType, RESERVED_FIELD_KEYS, Step, StepId};
use super::normalize::{
    move_item, normalize_configuration, renumber_fields, renumber_steps, repair_ids,
};
use super::selection;
use super::state::EngineState;

/// The command processor and the collaborators it reads from.
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    catalog: Arc<dyn FieldTypeCatalog>,
    ids: Arc<dyn IdGenerator>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(
            EngineConfig::default(),
            Arc::new(BuiltinCatalog::default()),
            Arc::new(UuidIds),
        )
    }
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        catalog: Arc<dyn FieldTypeCatalog>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            config,
            catalog,
            ids,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &dyn FieldTypeCatalog {
        self.catalog.as_ref()
    }

    /// A brand-new document with a single empty step.
    pub fn fresh_configuration(&self) -> Configuration {
        let step = self.new_step(0);
        Configuration {
            name: self.config.default_configuration_name.clone(),
            key: String::new(),
            target_user_type: self.config.default_target_user_type.clone(),
            target_org_type: String::new(),
            version: self.config.default_version.clone(),
            is_active: false,
            security_level: self.config.default_security_level.clone(),
            steps: vec![step],
            extra: Default::default(),
        }
    }

    /// Starting state: a fresh document with its step selected.
    pub fn initial_state(&self) -> EngineState {
        EngineState::new(self.fresh_configuration())
    }

    /// Apply a command, returning the input state unchanged if it is rejected.
    pub fn apply(&self, state: &EngineState, command: Command) -> EngineState {
        let name = command.name();
        match self.try_apply(state, command) {
            Ok(next) => next,
            Err(rejection) => {
                match &rejection {
                    Rejection::StepNotFound { .. }
                    | Rejection::FieldNotFound { .. }
                    | Rejection::InactiveStep { .. } => {
                        warn!(
                            command = name,
                            reason = %rejection,
                            "Rejected edit referencing stale state"
                        );
                    }
                    Rejection::UnknownCommand => {}
                    _ => {
                        debug!(command = name, reason = %rejection, "Rejected edit");
                    }
                }
                state.clone()
            }
        }
    }

    /// Apply a command, reporting why it was refused.
    pub fn try_apply(
        &self,
        state: &EngineState,
        command: Command,
    ) -> Result<EngineState, Rejection> {
        let marks_modified = command.marks_modified();
        let mut next = state.clone();
        self.reduce(&mut next, command)?;
        if marks_modified {
            next.is_modified = true;
        }
        Ok(next)
    }

    fn reduce(&self, state: &mut EngineState, command: Command) -> Result<(), Rejection> {
        match command {
            Command::Load { configuration } => {
                self.load(state, configuration);
                Ok(())
            }
            Command::Reset => {
                let configuration = self.fresh_configuration();
                state.active_step_id = selection::initial_selection(&configuration.steps);
                state.configuration = configuration;
                state.is_modified = false;
                info!("Configuration reset");
                Ok(())
            }
            Command::SetLoading { loading } => {
                state.is_loading = loading;
                Ok(())
            }
            Command::UpdateConfigField { name, value } => {
                update_config_field(&mut state.configuration, &name, value)
            }
            Command::SetActiveStep { step_id } => {
                if let Some(id) = &step_id
                    && state.step(id).is_none()
                {
                    return Err(Rejection::StepNotFound {
                        step_id: id.clone(),
                    });
                }
                state.active_step_id = step_id;
                Ok(())
            }
            Command::AddStep => {
                self.add_step(state);
                Ok(())
            }
            Command::DeleteStep { step_id } => delete_step(state, &step_id),
            Command::UpdateStep { step_id, patch } => update_step(state, &step_id, patch),
            Command::ReorderSteps { active_id, over_id } => {
                reorder_steps(state, &active_id, &over_id)
            }
            Command::AddField {
                step_id,
                field_type,
            } => self.add_field(state, &step_id, field_type),
            Command::DeleteField { step_id, field_id } => delete_field(state, &step_id, &field_id),
            Command::ReorderFields {
                step_id,
                active_id,
                over_id,
            } => reorder_fields(state, &step_id, &active_id, &over_id),
            Command::UpdateField {
                step_id,
                field_id,
                patch,
            } => update_field(state, &step_id, &field_id, patch),
            Command::Unknown => {
                warn!("Ignoring unknown command");
                Err(Rejection::UnknownCommand)
            }
        }
    }

    fn new_step(&self, existing: usize) -> Step {
        let title = format!("{} {}", self.config.step_title_prefix, existing + 1);
        let mut step = Step::new(self.ids.step_id(), title);
        step.order = existing as i64;
        step
    }

    fn load(&self, state: &mut EngineState, configuration: Configuration) {
        let mut configuration = normalize_configuration(configuration);
        let report = repair_ids(&mut configuration, self.ids.as_ref());
        if !report.is_clean() {
            warn!(
                steps = report.reissued_step_ids,
                fields = report.reissued_field_ids,
                "Loaded configuration had conflicting ids"
            );
        }

        if configuration.steps.is_empty() && self.config.inject_step_on_empty_load {
            warn!(
                key = %configuration.key,
                "Loaded configuration has no steps; adding an empty one"
            );
            configuration.steps.push(self.new_step(0));
        }

        info!(
            key = %configuration.key,
            steps = configuration.steps.len(),
            fields = configuration.field_count(),
            "Configuration loaded"
        );

        state.active_step_id = selection::initial_selection(&configuration.steps);
        state.configuration = configuration;
        state.is_modified = false;
        state.is_loading = false;
    }

    fn add_step(&self, state: &mut EngineState) {
        let step = self.new_step(state.configuration.steps.len());
        debug!(step_id = %step.id, order = step.order, "Step added");
        state.active_step_id = Some(step.id.clone());
        state.configuration.steps.push(step);
    }

    fn add_field(
        &self,
        state: &mut EngineState,
        step_id: &StepId,
        field_type: FieldType,
    ) -> Result<(), Rejection> {
        let template = self.catalog.template_for(&field_type);
        let field_id = self.ids.field_id();
        let step = find_step_mut(state, step_id)?;

        let mut field = Field::new(field_id, field_type, template.label);
        field.field_name = unique_field_name(step, &template.field_name);
        field.placeholder = template.placeholder;
        field.options = template.options;
        field.is_required = template.is_required;
        field.order = step.fields.len() as i64;

        debug!(
            step_id = %step.id,
            field_id = %field.id,
            field_type = %field.field_type,
            "Field added"
        );
        step.fields.push(field);
        Ok(())
    }
}

fn find_step_mut<'a>(
    state: &'a mut EngineState,
    step_id: &StepId,
) -> Result<&'a mut Step, Rejection> {
    state
        .configuration
        .step_mut(step_id)
        .ok_or_else(|| Rejection::StepNotFound {
            step_id: step_id.clone(),
        })
}

/// `base`, or `base_2`, `base_3`, ... whichever is free in the step.
fn unique_field_name(step: &Step, base: &str) -> String {
    let taken = |name: &str| step.fields.iter().any(|f| f.field_name == name);
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn update_config_field(
    config: &mut Configuration,
    name: &str,
    value: Value,
) -> Result<(), Rejection> {
    let attribute: ConfigAttribute = name.parse().map_err(|_| Rejection::UnknownConfigAttribute {
        name: name.to_string(),
    })?;

    let invalid = |expected: &str| Rejection::InvalidConfigValue {
        name: name.to_string(),
        expected: expected.to_string(),
    };

    let slot = match attribute {
        ConfigAttribute::IsActive => {
            config.is_active = value.as_bool().ok_or_else(|| invalid("boolean"))?;
            return Ok(());
        }
        ConfigAttribute::Name => &mut config.name,
        ConfigAttribute::Key => &mut config.key,
        ConfigAttribute::TargetUserType => &mut config.target_user_type,
        ConfigAttribute::TargetOrgType => &mut config.target_org_type,
        ConfigAttribute::Version => &mut config.version,
        ConfigAttribute::SecurityLevel => &mut config.security_level,
    };
    *slot = match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        _ => return Err(invalid("string")),
    };
    Ok(())
}

fn delete_step(state: &mut EngineState, step_id: &StepId) -> Result<(), Rejection> {
    let position = state
        .configuration
        .step_position(step_id)
        .ok_or_else(|| Rejection::StepNotFound {
            step_id: step_id.clone(),
        })?;
    if state.configuration.steps.len() == 1 {
        return Err(Rejection::LastStep {
            step_id: step_id.clone(),
        });
    }

    let removed = state.configuration.steps.remove(position);
    renumber_steps(&mut state.configuration.steps);
    state.active_step_id = selection::after_delete(
        state.active_step_id.as_ref(),
        step_id,
        &state.configuration.steps,
    );

    debug!(step_id = %step_id, fields = removed.fields.len(), "Step deleted");
    Ok(())
}

fn update_step(
    state: &mut EngineState,
    step_id: &StepId,
    patch: StepPatch,
) -> Result<(), Rejection> {
    let step = find_step_mut(state, step_id)?;
    if let Some(title) = patch.title {
        step.title = title;
    }
    if let Some(description) = patch.description {
        step.description = description;
    }
    Ok(())
}

fn reorder_steps(
    state: &mut EngineState,
    active_id: &StepId,
    over_id: &StepId,
) -> Result<(), Rejection> {
    if active_id == over_id {
        return Err(Rejection::SameElement {
            id: active_id.to_string(),
        });
    }
    let config = &mut state.configuration;
    let from = config
        .step_position(active_id)
        .ok_or_else(|| Rejection::StepNotFound {
            step_id: active_id.clone(),
        })?;
    let to = config
        .step_position(over_id)
        .ok_or_else(|| Rejection::StepNotFound {
            step_id: over_id.clone(),
        })?;

    move_item(&mut config.steps, from, to);
    renumber_steps(&mut config.steps);
    debug!(step_id = %active_id, from, to, "Step moved");
    Ok(())
}

fn delete_field(
    state: &mut EngineState,
    step_id: &StepId,
    field_id: &FieldId,
) -> Result<(), Rejection> {
    let step = find_step_mut(state, step_id)?;
    let position = step
        .field_position(field_id)
        .ok_or_else(|| Rejection::FieldNotFound {
            step_id: step_id.clone(),
            field_id: field_id.clone(),
        })?;

    step.fields.remove(position);
    renumber_fields(&mut step.fields);
    debug!(step_id = %step_id, field_id = %field_id, "Field deleted");
    Ok(())
}

fn reorder_fields(
    state: &mut EngineState,
    step_id: &StepId,
    active_id: &FieldId,
    over_id: &FieldId,
) -> Result<(), Rejection> {
    if active_id == over_id {
        return Err(Rejection::SameElement {
            id: active_id.to_string(),
        });
    }
    // Drags may only rearrange the step the user is looking at.
    if !state.is_active(step_id) {
        return Err(Rejection::InactiveStep {
            step_id: step_id.clone(),
            active: state.active_step_id.clone(),
        });
    }

    let step = find_step_mut(state, step_id)?;
    let not_found = |field_id: &FieldId| Rejection::FieldNotFound {
        step_id: step_id.clone(),
        field_id: field_id.clone(),
    };
    let from = step.field_position(active_id).ok_or_else(|| not_found(active_id))?;
    let to = step.field_position(over_id).ok_or_else(|| not_found(over_id))?;

    move_item(&mut step.fields, from, to);
    renumber_fields(&mut step.fields);
    debug!(step_id = %step_id, field_id = %active_id, from, to, "Field moved");
    Ok(())
}

fn update_field(
    state: &mut EngineState,
    step_id: &StepId,
    field_id: &FieldId,
    patch: FieldPatch,
) -> Result<(), Rejection> {
    let step = find_step_mut(state, step_id)?;
    let field = step
        .field_mut(field_id)
        .ok_or_else(|| Rejection::FieldNotFound {
            step_id: step_id.clone(),
            field_id: field_id.clone(),
        })?;

    if let Some(field_type) = patch.field_type {
        field.field_type = field_type;
    }
    if let Some(label) = patch.label {
        field.label = label;
    }
    if let Some(field_name) = patch.field_name {
        field.field_name = field_name;
    }
    if let Some(is_required) = patch.is_required {
        field.is_required = is_required;
    }
    if let Some(placeholder) = patch.placeholder {
        field.placeholder = Some(placeholder);
    }
    if let Some(help_text) = patch.help_text {
        field.help_text = Some(help_text);
    }
    if let Some(options) = patch.options {
        field.options = Some(options);
    }
    if let Some(default_value) = patch.default_value {
        field.default_value = Some(default_value);
    }
    for (key, value) in patch.extra {
        if RESERVED_FIELD_KEYS.contains(&key.as_str()) {
            debug!(field_id = %field_id, key = %key, "Ignoring patch of engine-owned attribute");
            continue;
        }
        field.extra.insert(key, value);
    }
    Ok(())
}
