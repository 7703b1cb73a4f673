//! Onboarding form configuration engine.
//!
//! An operator assembles a multi-step data-collection form out of reusable
//! field types. The document (steps holding ordered fields) lives in a
//! [`DocumentStore`] and changes only through [`Command`]s run by the
//! [`Engine`]; persistence goes through a [`PersistenceGateway`] driven by
//! the [`ConfigurationController`].

pub mod catalog;
pub mod command;
pub mod controller;
pub mod engine;
pub mod gateway;
pub mod ids;
pub mod model;
pub mod normalize;
pub mod selection;
pub mod state;
pub mod store;
pub mod validate;

pub use catalog::{BuiltinCatalog, FieldTemplate, FieldTypeCatalog};
pub use command::{Command, ConfigAttribute, FieldPatch, StepPatch};
pub use controller::ConfigurationController;
pub use engine::Engine;
pub use gateway::{InMemoryGateway, JsonFileGateway, PersistenceGateway};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use model::{Configuration, Field, FieldId, FieldOption, FieldType, Step, StepId};
pub use state::EngineState;
pub use store::{DocumentStore, Snapshot};
pub use validate::{Violation, validate};
