#![deny(missing_docs)]
#![doc = "Core settings, blueprint and error types for parameter-sweep suites."]

pub mod blueprint;
pub mod errors;
/// Declared kinds for settings and modifier variables.
pub mod schema;
pub mod settings;

pub use blueprint::{AssemblySpec, BlockSpec, Blueprint, ComponentSpec};
pub use errors::{AggregateFailure, CaseFailure, ErrorInfo, SuiteError};
pub use schema::{SettingKind, SettingsSchema, VariableSchema};
pub use settings::{IndependentVariables, SettingValue, Settings};
