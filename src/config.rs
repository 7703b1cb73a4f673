//! Configuration types.

use crate::error::ConfigError;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// New steps are titled `"{prefix} {n}"`, `n` being their 1-based position.
    pub step_title_prefix: String,
    /// Name given to a freshly created document.
    pub default_configuration_name: String,
    /// Version string of a freshly created document.
    pub default_version: String,
    /// Security level of a freshly created document.
    pub default_security_level: String,
    /// Target user type of a freshly created document.
    pub default_target_user_type: String,
    /// Whether loading a document with no steps adds an empty one.
    pub inject_step_on_empty_load: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_title_prefix: "Step".to_string(),
            default_configuration_name: "New Onboarding Flow".to_string(),
            default_version: "1.0.0".to_string(),
            default_security_level: "standard".to_string(),
            default_target_user_type: "individual".to_string(),
            inject_step_on_empty_load: true,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `ONBOARDING_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(prefix) = lookup("ONBOARDING_STEP_TITLE_PREFIX") {
            config.step_title_prefix = prefix;
        }
        if let Some(name) = lookup("ONBOARDING_DEFAULT_NAME") {
            config.default_configuration_name = name;
        }
        if let Some(version) = lookup("ONBOARDING_DEFAULT_VERSION") {
            config.default_version = version;
        }
        if let Some(level) = lookup("ONBOARDING_SECURITY_LEVEL") {
            config.default_security_level = level;
        }
        if let Some(user_type) = lookup("ONBOARDING_TARGET_USER_TYPE") {
            config.default_target_user_type = user_type;
        }
        if let Some(raw) = lookup("ONBOARDING_INJECT_EMPTY_STEP") {
            config.inject_step_on_empty_load = parse_bool("ONBOARDING_INJECT_EMPTY_STEP", &raw)?;
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}
