use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};
use suite_core::errors::{ErrorInfo, SuiteError};
use tracing::info;

use crate::case::Case;
use crate::context::InputLayout;

/// Result reported by an external runner for one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub case: String,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub output: String,
}

/// External driver executing one case's analysis.
pub trait CaseRunner: Send + Sync {
    fn run(&self, case: &Case) -> Result<RunOutcome, SuiteError>;
}

/// Runs `program [args..] <settings-file>` inside each case directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRunner {
    program: PathBuf,
    args: Vec<String>,
    layout: InputLayout,
}

impl CommandRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            layout: InputLayout::default(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_layout(mut self, layout: InputLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl CaseRunner for CommandRunner {
    fn run(&self, case: &Case) -> Result<RunOutcome, SuiteError> {
        let settings_path = case.settings_path(&self.layout);
        let settings_arg = settings_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| settings_path.clone());
        info!(case = %case.name(), program = %self.program.display(), "running case");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&settings_arg)
            .current_dir(case.directory())
            .output()
            .map_err(|err| {
                SuiteError::Io(
                    ErrorInfo::new("runner-spawn", err.to_string())
                        .with_context("program", self.program.display().to_string())
                        .with_context("case", case.name()),
                )
            })?;
        if !output.status.success() {
            return Err(SuiteError::Io(
                ErrorInfo::new("runner-exit", format!("runner exited with {}", output.status))
                    .with_context("case", case.name())
                    .with_hint(String::from_utf8_lossy(&output.stderr).trim().to_string()),
            ));
        }
        Ok(RunOutcome {
            case: case.name().to_string(),
            exit_code: output.status.code(),
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
