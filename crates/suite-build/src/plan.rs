use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use suite_core::blueprint::Blueprint;
use suite_core::errors::{ErrorInfo, SuiteError};
use suite_core::schema::{SettingKind, SettingsSchema};
use suite_core::settings::{SettingValue, Settings};

use crate::builder::{ExpansionPolicy, SuiteBuilder};
use crate::case::Case;
use crate::context::{CaseNaming, InputLayout, SuiteContext};
use crate::hash::stable_hash_string;
use crate::modifier::{DimensionModifier, MultiSettingsModifier, SettingsModifier, SharedModifier};
use crate::serde::from_yaml_slice;

fn io_error(code: &str, path: &Path, err: impl ToString) -> SuiteError {
    SuiteError::Io(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Declarative form of the built-in modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ModifierSpec {
    Setting {
        key: String,
        value: SettingValue,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<SettingKind>,
    },
    Settings {
        values: BTreeMap<String, SettingValue>,
    },
    Dimension {
        block: String,
        component: String,
        dimension: String,
        value: f64,
    },
}

impl ModifierSpec {
    pub fn to_modifier(&self) -> SharedModifier {
        match self {
            ModifierSpec::Setting { key, value, kind } => {
                let modifier = SettingsModifier::new(key.clone(), value.clone());
                match kind {
                    Some(kind) => Arc::new(modifier.with_kind(*kind)),
                    None => Arc::new(modifier),
                }
            }
            ModifierSpec::Settings { values } => Arc::new(MultiSettingsModifier::new(
                values.iter().map(|(key, value)| (key.clone(), value.clone())),
            )),
            ModifierSpec::Dimension {
                block,
                component,
                dimension,
                value,
            } => Arc::new(DimensionModifier::new(
                block.clone(),
                component.clone(),
                dimension.clone(),
                *value,
            )),
        }
    }
}

/// YAML sweep plan: base case, expansion policy and degrees of freedom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    pub title: String,
    /// Base settings file (flat mapping), relative to the plan.
    pub settings: PathBuf,
    /// Base blueprint file, relative to the plan.
    pub blueprint: PathBuf,
    #[serde(default = "SweepPlan::default_output")]
    pub output: PathBuf,
    #[serde(default = "SweepPlan::default_policy")]
    pub policy: ExpansionPolicy,
    #[serde(default)]
    pub naming: CaseNaming,
    #[serde(default)]
    pub layout: InputLayout,
    #[serde(default)]
    pub schema: SettingsSchema,
    #[serde(default)]
    pub degrees_of_freedom: Vec<Vec<ModifierSpec>>,
    /// Directory containing the plan on disk (ignored when serializing).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl SweepPlan {
    fn default_output() -> PathBuf {
        PathBuf::from("cases")
    }

    const fn default_policy() -> ExpansionPolicy {
        ExpansionPolicy::FullFactorial
    }

    /// Stable hash of the plan contents.
    pub fn plan_hash(&self) -> Result<String, SuiteError> {
        stable_hash_string(self)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Context for this plan; `output` overrides the plan's output directory.
    pub fn context(&self, output: Option<&Path>) -> SuiteContext {
        let root = match output {
            Some(path) => path.to_path_buf(),
            None => self.resolve(&self.output),
        };
        SuiteContext::new(root)
            .with_naming(self.naming.clone())
            .with_layout(self.layout.clone())
            .with_schema(self.schema.clone())
    }

    /// Loads the base settings and blueprint into a base case.
    pub fn base_case(&self) -> Result<Case, SuiteError> {
        let settings_path = self.resolve(&self.settings);
        let bytes =
            fs::read(&settings_path).map_err(|err| io_error("plan-settings-read", &settings_path, err))?;
        let settings: Settings = from_yaml_slice(&bytes)?;
        let blueprint_path = self.resolve(&self.blueprint);
        let bytes = fs::read(&blueprint_path)
            .map_err(|err| io_error("plan-blueprint-read", &blueprint_path, err))?;
        let blueprint: Blueprint = from_yaml_slice(&bytes)?;
        Ok(Case::new(self.title.clone(), settings, blueprint))
    }

    /// Builder populated with the base case and every degree of freedom.
    pub fn builder(&self) -> Result<SuiteBuilder, SuiteError> {
        let mut builder = SuiteBuilder::new(self.base_case()?, self.policy.clone());
        for dof in &self.degrees_of_freedom {
            builder.add_degree_of_freedom(dof.iter().map(ModifierSpec::to_modifier))?;
        }
        Ok(builder)
    }
}

/// Loads a sweep plan from disk, remembering its directory for relative paths.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<SweepPlan, SuiteError> {
    let plan_path = path.as_ref();
    let bytes = fs::read(plan_path).map_err(|err| io_error("plan-read", plan_path, err))?;
    let mut plan: SweepPlan = from_yaml_slice(&bytes)?;
    plan.base_dir = plan_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    Ok(plan)
}
