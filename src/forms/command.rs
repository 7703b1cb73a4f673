//! Edit commands accepted by the command processor.
//!
//! Commands arrive from the presentation layer and the drag-input layer,
//! often as JSON (`{"type": "add_field", "stepId": "...", "fieldType": "email"}`).
//! Tags this version does not know deserialize to [`Command::Unknown`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::model::{Configuration, FieldId, FieldOption, FieldType, StepId};

/// A discrete mutation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Command {
    /// Replace the document with one from outside, normalizing it first.
    Load { configuration: Configuration },
    /// Start over with a fresh one-step document.
    Reset,
    SetLoading { loading: bool },
    /// Overwrite a top-level configuration attribute by its JSON name.
    UpdateConfigField { name: String, value: Value },
    SetActiveStep { step_id: Option<StepId> },
    AddStep,
    DeleteStep { step_id: StepId },
    UpdateStep { step_id: StepId, patch: StepPatch },
    /// Move `active_id` to the position currently held by `over_id`.
    ReorderSteps { active_id: StepId, over_id: StepId },
    AddField { step_id: StepId, field_type: FieldType },
    DeleteField { step_id: StepId, field_id: FieldId },
    /// Move a field within `step_id`, which must be the active step.
    ReorderFields {
        step_id: StepId,
        active_id: FieldId,
        over_id: FieldId,
    },
    UpdateField {
        step_id: StepId,
        field_id: FieldId,
        patch: FieldPatch,
    },
    #[serde(other)]
    Unknown,
}

impl Command {
    /// Stable tag used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Reset => "reset",
            Self::SetLoading { .. } => "set_loading",
            Self::UpdateConfigField { .. } => "update_config_field",
            Self::SetActiveStep { .. } => "set_active_step",
            Self::AddStep => "add_step",
            Self::DeleteStep { .. } => "delete_step",
            Self::UpdateStep { .. } => "update_step",
            Self::ReorderSteps { .. } => "reorder_steps",
            Self::AddField { .. } => "add_field",
            Self::DeleteField { .. } => "delete_field",
            Self::ReorderFields { .. } => "reorder_fields",
            Self::UpdateField { .. } => "update_field",
            Self::Unknown => "unknown",
        }
    }

    /// Whether a successful application marks the document modified.
    pub fn marks_modified(&self) -> bool {
        !matches!(
            self,
            Self::Load { .. }
                | Self::Reset
                | Self::SetLoading { .. }
                | Self::SetActiveStep { .. }
                | Self::Unknown
        )
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Partial update of a step. Absent members are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StepPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// Partial update of a field. Absent members are left untouched.
///
/// `id` and `order` are owned by the engine and cannot be patched; any other
/// unrecognised attribute is merged into the field's type-specific
/// attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn required(is_required: bool) -> Self {
        Self {
            is_required: Some(is_required),
            ..Default::default()
        }
    }
}

/// Top-level configuration attributes addressable by `UpdateConfigField`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAttribute {
    Name,
    Key,
    TargetUserType,
    TargetOrgType,
    Version,
    IsActive,
    SecurityLevel,
}

impl std::str::FromStr for ConfigAttribute {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "key" => Ok(Self::Key),
            "targetUserType" | "target_user_type" => Ok(Self::TargetUserType),
            "targetOrgType" | "target_org_type" => Ok(Self::TargetOrgType),
            "version" => Ok(Self::Version),
            "isActive" | "is_active" => Ok(Self::IsActive),
            "securityLevel" | "security_level" => Ok(Self::SecurityLevel),
            _ => Err(format!("Unknown configuration attribute: {}", s)),
        }
    }
}

impl std::fmt::Display for ConfigAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Key => "key",
            Self::TargetUserType => "targetUserType",
            Self::TargetOrgType => "targetOrgType",
            Self::Version => "version",
            Self::IsActive => "isActive",
            Self::SecurityLevel => "securityLevel",
        };
        write!(f, "{s}")
    }
}
