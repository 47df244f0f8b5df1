use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SuiteError};
use crate::settings::{SettingValue, Settings};

/// Declared kind of a setting or independent variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    /// Boolean flag.
    Bool,
    /// Integer only.
    Int,
    /// Float only.
    Float,
    /// Integer or float.
    Number,
    /// Free text.
    Text,
    /// Text interpreted as a filesystem path.
    Path,
}

impl SettingKind {
    /// Whether `value` is acceptable for this kind.
    pub fn accepts(&self, value: &SettingValue) -> bool {
        matches!(
            (self, value),
            (SettingKind::Bool, SettingValue::Bool(_))
                | (SettingKind::Int, SettingValue::Int(_))
                | (SettingKind::Float, SettingValue::Float(_))
                | (SettingKind::Number, SettingValue::Int(_) | SettingValue::Float(_))
                | (SettingKind::Text | SettingKind::Path, SettingValue::Text(_))
        )
    }
}

impl Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SettingKind::Bool => "bool",
            SettingKind::Int => "int",
            SettingKind::Float => "float",
            SettingKind::Number => "number",
            SettingKind::Text => "text",
            SettingKind::Path => "path",
        };
        f.write_str(label)
    }
}

/// Variables a modifier type declares, with their kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableSchema {
    kinds: BTreeMap<String, SettingKind>,
}

impl VariableSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a variable, returning the updated schema.
    pub fn declare(mut self, name: impl Into<String>, kind: SettingKind) -> Self {
        self.kinds.insert(name.into(), kind);
        self
    }

    /// Whether `name` is declared.
    pub fn declares(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Iterates over declarations in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingKind)> {
        self.kinds.iter()
    }
}

/// Declared kinds for case settings, checked on every derived case.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettingsSchema {
    /// Reject settings that are not declared.
    #[serde(default)]
    pub strict: bool,
    /// Declared kinds by setting name.
    #[serde(default)]
    pub kinds: BTreeMap<String, SettingKind>,
}

impl SettingsSchema {
    /// Declares a setting kind, returning the updated schema.
    pub fn declare(mut self, name: impl Into<String>, kind: SettingKind) -> Self {
        self.kinds.insert(name.into(), kind);
        self
    }

    /// Validates `settings`; absent declared settings are allowed.
    pub fn validate(&self, settings: &Settings) -> Result<(), SuiteError> {
        for (name, value) in settings.iter() {
            match self.kinds.get(name) {
                Some(kind) if !kind.accepts(value) => {
                    return Err(SuiteError::Configuration(
                        ErrorInfo::new("setting-kind", "setting has the wrong kind")
                            .with_context("setting", name.clone())
                            .with_context("expected", kind.to_string())
                            .with_context("found", value.kind().to_string()),
                    ));
                }
                None if self.strict => {
                    return Err(SuiteError::Configuration(
                        ErrorInfo::new("setting-undeclared", "setting is not declared")
                            .with_context("setting", name.clone())
                            .with_hint("declare it in the schema or disable `strict`"),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
