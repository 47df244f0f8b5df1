//! Typed case settings and the independent variables recorded by modifiers.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SuiteError};
use crate::schema::{SettingKind, VariableSchema};

/// A single typed setting value.
///
/// Values are stored untagged so persisted files read as plain YAML scalars.
/// Integers are tried before floats so `3` stays an integer and `3.0` a float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Free text, also used for paths.
    Text(String),
}

impl SettingValue {
    /// Returns the numeric value for integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Int(value) => Some(*value as f64),
            SettingValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the text payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the kind this value naturally belongs to.
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::Bool(_) => SettingKind::Bool,
            SettingValue::Int(_) => SettingKind::Int,
            SettingValue::Float(_) => SettingKind::Float,
            SettingValue::Text(_) => SettingKind::Text,
        }
    }
}

impl Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{value}"),
            SettingValue::Int(value) => write!(f, "{value}"),
            SettingValue::Float(value) => write!(f, "{value}"),
            SettingValue::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

/// Case configuration: named settings with typed values.
///
/// Derived cases never mutate a base configuration; [`Settings::with`] hands
/// back an updated copy instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    entries: BTreeMap<String, SettingValue>,
}

impl Settings {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.entries.get(key)
    }

    /// Returns the value under `key` or a lookup error naming it.
    pub fn require(&self, key: &str) -> Result<&SettingValue, SuiteError> {
        self.entries
            .get(key)
            .ok_or_else(|| SuiteError::lookup("setting", key))
    }

    /// Returns a text setting interpreted as a filesystem path.
    pub fn path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).and_then(SettingValue::as_str).map(PathBuf::from)
    }

    /// Returns a copy with `key` set to `value`.
    pub fn with(&self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        let mut next = self.clone();
        next.entries.insert(key.into(), value.into());
        next
    }

    /// Returns a copy with every entry of `overrides` applied.
    pub fn with_all<'a, I>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a SettingValue)>,
    {
        let mut next = self.clone();
        for (key, value) in overrides {
            next.entries.insert(key.clone(), value.clone());
        }
        next
    }

    /// Iterates over the settings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.entries.iter()
    }

    /// Number of configured entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<SettingValue>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Named independent-variable values recorded by a modifier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndependentVariables {
    values: BTreeMap<String, SettingValue>,
}

impl IndependentVariables {
    /// Creates an empty variable map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a variable, returning the updated map.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Returns the value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.values.get(name)
    }

    /// Merges `other` into `self`; entries from `other` win on collision.
    pub fn merge(&mut self, other: &IndependentVariables) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// Iterates over the variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.values.iter()
    }

    /// Variable names in order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// Whether no variables are recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks the variables against a declared schema.
    ///
    /// Every declared variable must be present with a compatible kind and no
    /// undeclared variable may appear.
    pub fn validate(&self, schema: &VariableSchema) -> Result<(), SuiteError> {
        for (name, kind) in schema.iter() {
            let Some(value) = self.values.get(name) else {
                return Err(SuiteError::Configuration(
                    ErrorInfo::new("variable-missing", "declared independent variable missing")
                        .with_context("variable", name.clone()),
                ));
            };
            if !kind.accepts(value) {
                return Err(SuiteError::Configuration(
                    ErrorInfo::new("variable-kind", "independent variable has the wrong kind")
                        .with_context("variable", name.clone())
                        .with_context("expected", kind.to_string())
                        .with_context("found", value.kind().to_string()),
                ));
            }
        }
        if let Some(name) = self.values.keys().find(|name| !schema.declares(name)) {
            return Err(SuiteError::Configuration(
                ErrorInfo::new("variable-undeclared", "independent variable is not declared")
                    .with_context("variable", name.clone()),
            ));
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<SettingValue>> FromIterator<(K, V)> for IndependentVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
