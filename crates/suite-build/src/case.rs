use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use suite_core::blueprint::Blueprint;
use suite_core::errors::{ErrorInfo, SuiteError};
use suite_core::settings::{IndependentVariables, Settings};
use tracing::debug;

use crate::context::InputLayout;
use crate::hash::stable_hash_string;
use crate::runner::{CaseRunner, RunOutcome};
use crate::serde::{from_yaml_slice, to_yaml_string};

fn io_error(code: &str, path: &Path, err: impl ToString) -> SuiteError {
    SuiteError::Io(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Header persisted at the top of every case settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CaseHeader {
    title: String,
    name: String,
    index: usize,
    #[serde(default)]
    independent_variables: IndependentVariables,
    blueprint: String,
}

/// On-disk settings document: identity header plus the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CaseDocument {
    case: CaseHeader,
    #[serde(default)]
    settings: Settings,
}

/// A materialized unit of work: configuration and design after modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    title: String,
    name: String,
    index: usize,
    settings: Settings,
    blueprint: Blueprint,
    independent_variables: IndependentVariables,
    directory: PathBuf,
}

impl Case {
    /// Base case; its name is its title and it writes into `./<title>`.
    pub fn new(title: impl Into<String>, settings: Settings, blueprint: Blueprint) -> Self {
        let title = title.into();
        Self {
            name: title.clone(),
            directory: PathBuf::from(&title),
            title,
            index: 0,
            settings,
            blueprint,
            independent_variables: IndependentVariables::new(),
        }
    }

    pub(crate) fn derived(
        base: &Case,
        name: String,
        index: usize,
        settings: Settings,
        blueprint: Blueprint,
        independent_variables: IndependentVariables,
        directory: PathBuf,
    ) -> Self {
        Self {
            title: base.title.clone(),
            name,
            index,
            settings,
            blueprint,
            independent_variables,
            directory,
        }
    }

    /// Returns the case relocated to `directory`.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn independent_variables(&self) -> &IndependentVariables {
        &self.independent_variables
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the settings document under `layout`.
    pub fn settings_path(&self, layout: &InputLayout) -> PathBuf {
        layout.settings_path(&self.directory, &self.name)
    }

    /// Stable digest over the case configuration and design.
    pub fn fingerprint(&self) -> Result<String, SuiteError> {
        stable_hash_string(&(&self.settings, &self.blueprint))
    }

    /// Writes the settings and blueprint documents into the case directory.
    ///
    /// Creates the directory when absent and returns the settings path.
    pub fn write_inputs(&self, layout: &InputLayout) -> Result<PathBuf, SuiteError> {
        fs::create_dir_all(&self.directory)
            .map_err(|err| io_error("case-dir", &self.directory, err))?;
        let design_name = layout.design_file_name(&self.name);
        let design_path = self.directory.join(&design_name);
        let design_text = to_yaml_string(&self.blueprint)?;
        fs::write(&design_path, design_text)
            .map_err(|err| io_error("case-write-blueprint", &design_path, err))?;

        let document = CaseDocument {
            case: CaseHeader {
                title: self.title.clone(),
                name: self.name.clone(),
                index: self.index,
                independent_variables: self.independent_variables.clone(),
                blueprint: design_name,
            },
            settings: self.settings.clone(),
        };
        let settings_path = self.settings_path(layout);
        fs::write(&settings_path, to_yaml_string(&document)?)
            .map_err(|err| io_error("case-write-settings", &settings_path, err))?;
        debug!(case = %self.name, path = %settings_path.display(), "wrote case inputs");
        Ok(settings_path)
    }

    /// Loads a case from a settings document written by [`Case::write_inputs`].
    ///
    /// Unreadable or malformed documents are reported as I/O errors.
    pub fn load(path: &Path) -> Result<Self, SuiteError> {
        let bytes = fs::read(path).map_err(|err| io_error("case-read", path, err))?;
        let document: CaseDocument = from_yaml_slice(&bytes)
            .map_err(|err| io_error("case-parse", path, err.info().message.clone()))?;
        let directory = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let design_path = directory.join(&document.case.blueprint);
        let design_bytes =
            fs::read(&design_path).map_err(|err| io_error("case-read-blueprint", &design_path, err))?;
        let blueprint: Blueprint = from_yaml_slice(&design_bytes).map_err(|err| {
            io_error("case-parse-blueprint", &design_path, err.info().message.clone())
        })?;
        Ok(Self {
            title: document.case.title,
            name: document.case.name,
            index: document.case.index,
            settings: document.settings,
            blueprint,
            independent_variables: document.case.independent_variables,
            directory,
        })
    }

    /// Hands the case to an external runner.
    pub fn run(&self, runner: &dyn CaseRunner) -> Result<RunOutcome, SuiteError> {
        runner.run(self)
    }
}
