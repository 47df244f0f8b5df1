use std::fmt;
use std::sync::Arc;

use suite_core::blueprint::Blueprint;
use suite_core::errors::SuiteError;
use suite_core::schema::{SettingKind, VariableSchema};
use suite_core::settings::{IndependentVariables, SettingValue, Settings};

/// A transformation producing one perturbed variant of a base case.
///
/// Implementations must leave their inputs untouched and return fresh
/// copies. The only state a modifier carries is its independent variables.
pub trait Modifier: fmt::Debug + Send + Sync {
    /// Applies the perturbation to a configuration and design pair.
    fn apply(
        &self,
        settings: &Settings,
        design: &Blueprint,
    ) -> Result<(Settings, Blueprint), SuiteError>;

    /// Independent-variable values this modifier represents.
    fn independent_variables(&self) -> &IndependentVariables;

    /// Variables this modifier type declares.
    ///
    /// The default accepts exactly the variables the modifier carries, so
    /// registration only rejects modifiers that override it.
    fn schema(&self) -> VariableSchema {
        self.independent_variables()
            .iter()
            .fold(VariableSchema::new(), |schema, (name, value)| {
                schema.declare(name.clone(), value.kind())
            })
    }

    /// Short description used in logs and tables.
    fn label(&self) -> String {
        let vars = self
            .independent_variables()
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>();
        if vars.is_empty() {
            "base".to_string()
        } else {
            vars.join(", ")
        }
    }
}

/// Reference-counted modifier shared between modifier sets.
pub type SharedModifier = Arc<dyn Modifier>;

/// Overrides one named setting; the design is passed through.
///
/// The declared kind defaults to the kind of the value and can be widened
/// or pinned with [`SettingsModifier::with_kind`].
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsModifier {
    key: String,
    value: SettingValue,
    kind: SettingKind,
    variables: IndependentVariables,
}

impl SettingsModifier {
    pub fn new(key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        let key = key.into();
        let value = value.into();
        let variables = IndependentVariables::new().with(key.clone(), value.clone());
        Self {
            key,
            kind: value.kind(),
            value,
            variables,
        }
    }

    /// Declares the kind the overridden setting must have.
    pub fn with_kind(mut self, kind: SettingKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> SettingKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &SettingValue {
        &self.value
    }
}

impl Modifier for SettingsModifier {
    fn apply(
        &self,
        settings: &Settings,
        design: &Blueprint,
    ) -> Result<(Settings, Blueprint), SuiteError> {
        Ok((settings.with(self.key.clone(), self.value.clone()), design.clone()))
    }

    fn independent_variables(&self) -> &IndependentVariables {
        &self.variables
    }

    fn schema(&self) -> VariableSchema {
        VariableSchema::new().declare(self.key.clone(), self.kind)
    }
}

/// Overrides several settings together as one value of a degree of freedom.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSettingsModifier {
    variables: IndependentVariables,
}

impl MultiSettingsModifier {
    pub fn new<K, V, I>(values: I) -> Self
    where
        K: Into<String>,
        V: Into<SettingValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            variables: values.into_iter().collect(),
        }
    }
}

impl Modifier for MultiSettingsModifier {
    fn apply(
        &self,
        settings: &Settings,
        design: &Blueprint,
    ) -> Result<(Settings, Blueprint), SuiteError> {
        Ok((settings.with_all(self.variables.iter()), design.clone()))
    }

    fn independent_variables(&self) -> &IndependentVariables {
        &self.variables
    }
}

/// Rewrites a single component dimension of the design.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionModifier {
    block: String,
    component: String,
    dimension: String,
    value: f64,
    variables: IndependentVariables,
}

impl DimensionModifier {
    pub fn new(
        block: impl Into<String>,
        component: impl Into<String>,
        dimension: impl Into<String>,
        value: f64,
    ) -> Self {
        let block = block.into();
        let component = component.into();
        let dimension = dimension.into();
        let variables = IndependentVariables::new().with(
            Self::variable_name(&block, &component, &dimension),
            value,
        );
        Self {
            block,
            component,
            dimension,
            value,
            variables,
        }
    }

    /// Independent-variable name recorded for a dimension perturbation.
    pub fn variable_name(block: &str, component: &str, dimension: &str) -> String {
        format!("{block}.{component}.{dimension}")
    }
}

impl Modifier for DimensionModifier {
    fn apply(
        &self,
        settings: &Settings,
        design: &Blueprint,
    ) -> Result<(Settings, Blueprint), SuiteError> {
        let design =
            design.with_dimension(&self.block, &self.component, &self.dimension, self.value)?;
        Ok((settings.clone(), design))
    }

    fn independent_variables(&self) -> &IndependentVariables {
        &self.variables
    }

    fn schema(&self) -> VariableSchema {
        VariableSchema::new().declare(
            Self::variable_name(&self.block, &self.component, &self.dimension),
            SettingKind::Float,
        )
    }
}

/// Identity modifier for degrees of freedom held at their base value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Unmodified {
    variables: IndependentVariables,
}

impl Unmodified {
    pub fn shared() -> SharedModifier {
        Arc::new(Self::default())
    }
}

impl Modifier for Unmodified {
    fn apply(
        &self,
        settings: &Settings,
        design: &Blueprint,
    ) -> Result<(Settings, Blueprint), SuiteError> {
        Ok((settings.clone(), design.clone()))
    }

    fn independent_variables(&self) -> &IndependentVariables {
        &self.variables
    }
}

/// One modifier per registered degree of freedom, defining one derived case.
#[derive(Debug, Clone)]
pub struct ModifierSet {
    modifiers: Vec<SharedModifier>,
}

impl ModifierSet {
    pub fn new(modifiers: Vec<SharedModifier>) -> Self {
        Self { modifiers }
    }

    /// Applies every modifier in degree-of-freedom order.
    pub fn apply(
        &self,
        settings: &Settings,
        design: &Blueprint,
    ) -> Result<(Settings, Blueprint), SuiteError> {
        let mut current = (settings.clone(), design.clone());
        for modifier in &self.modifiers {
            current = modifier.apply(&current.0, &current.1)?;
        }
        Ok(current)
    }

    /// Union of the independent variables; later degrees of freedom win.
    pub fn independent_variables(&self) -> IndependentVariables {
        let mut merged = IndependentVariables::new();
        for modifier in &self.modifiers {
            merged.merge(modifier.independent_variables());
        }
        merged
    }

    pub fn label(&self) -> String {
        self.modifiers
            .iter()
            .map(|modifier| modifier.label())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    pub fn modifiers(&self) -> &[SharedModifier] {
        &self.modifiers
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suite_core::blueprint::{BlockSpec, ComponentSpec};

    fn design() -> Blueprint {
        Blueprint {
            name: "core".into(),
            blocks: vec![BlockSpec {
                name: "fuel".into(),
                components: vec![ComponentSpec {
                    name: "clad".into(),
                    shape: "circle".into(),
                    material: "HT9".into(),
                    dimensions: [("od".to_string(), 0.75)].into_iter().collect(),
                }],
            }],
            assemblies: Vec::new(),
        }
    }

    #[test]
    fn settings_modifier_overrides_one_key() {
        let base: Settings = [("power", 1.0e6), ("flow", 2.0)].into_iter().collect();
        let modifier = SettingsModifier::new("power", 4.0e7);
        let (settings, bp) = modifier.apply(&base, &design()).unwrap();
        assert_eq!(settings.get("power"), Some(&SettingValue::Float(4.0e7)));
        assert_eq!(settings.get("flow"), base.get("flow"));
        assert_eq!(bp, design());
        assert_eq!(base.get("power"), Some(&SettingValue::Float(1.0e6)));
    }

    #[test]
    fn modifier_set_chains_in_order() {
        let set = ModifierSet::new(vec![
            Arc::new(SettingsModifier::new("power", 1.0)) as SharedModifier,
            Arc::new(DimensionModifier::new("fuel", "clad", "od", 0.8)),
            Arc::new(SettingsModifier::new("power", 2.0)),
        ]);
        let (settings, bp) = set.apply(&Settings::new(), &design()).unwrap();
        assert_eq!(settings.get("power"), Some(&SettingValue::Float(2.0)));
        assert_eq!(bp.component("fuel", "clad").unwrap().dimensions["od"], 0.8);
        let vars = set.independent_variables();
        assert_eq!(vars.get("power"), Some(&SettingValue::Float(2.0)));
        assert_eq!(vars.get("fuel.clad.od"), Some(&SettingValue::Float(0.8)));
    }

    #[test]
    fn dimension_modifier_reports_missing_component() {
        let modifier = DimensionModifier::new("fuel", "duct", "op", 16.0);
        let err = modifier.apply(&Settings::new(), &design()).unwrap_err();
        assert_eq!(err.family(), "lookup");
        assert_eq!(err.info().context["component"], "duct");
    }

    #[test]
    fn settings_modifier_declares_its_kind() {
        let plain = SettingsModifier::new("cycles", 3i64);
        assert!(plain.independent_variables().validate(&plain.schema()).is_ok());
        let widened = SettingsModifier::new("cycles", 3i64).with_kind(SettingKind::Number);
        assert!(widened.independent_variables().validate(&widened.schema()).is_ok());
        let mismatched = SettingsModifier::new("power", "hot").with_kind(SettingKind::Number);
        let err = mismatched
            .independent_variables()
            .validate(&mismatched.schema())
            .unwrap_err();
        assert_eq!(err.info().code, "variable-kind");
    }

    #[test]
    fn labels_describe_variables() {
        assert_eq!(SettingsModifier::new("power", 10i64).label(), "power=10");
        assert_eq!(Unmodified::default().label(), "base");
    }
}
