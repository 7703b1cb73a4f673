//! Onboarding Forms — configuration state engine for multi-step onboarding forms.

pub mod config;
pub mod error;
pub mod forms;
pub mod logging;
