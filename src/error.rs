//! Error types for the onboarding form engine.

use crate::forms::model::{FieldId, StepId};
use crate::forms::validate::Violation;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Edit rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Document failed validation: {}", format_violations(.0))]
    Invalid(Vec<Violation>),
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Engine configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Persistence gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Configuration not found: {id}")]
    NotFound { id: String },

    #[error("Configuration {id} cannot be stored: {reason}")]
    Conflict { id: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Why the command processor refused an edit.
///
/// A rejection is an expected outcome, not a failure: the state it was
/// applied to is returned untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Cannot delete the last remaining step {step_id}")]
    LastStep { step_id: StepId },

    #[error("Step {step_id} not found")]
    StepNotFound { step_id: StepId },

    #[error("Field {field_id} not found in step {step_id}")]
    FieldNotFound { step_id: StepId, field_id: FieldId },

    #[error("Cannot reorder {id} relative to itself")]
    SameElement { id: String },

    #[error("Step {step_id} is not the active step (active: {active:?})")]
    InactiveStep {
        step_id: StepId,
        active: Option<StepId>,
    },

    #[error("Unknown configuration attribute: {name}")]
    UnknownConfigAttribute { name: String },

    #[error("Invalid value for configuration attribute {name}: expected {expected}")]
    InvalidConfigValue { name: String, expected: String },

    #[error("Unknown command")]
    UnknownCommand,
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
