pub mod build;
pub mod discover;
pub mod run;

use std::path::PathBuf;

use clap::Args;
use suite_build::{DiscoverOpts, InputLayout, Suite};

/// Discovery arguments shared by `discover` and `run`.
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Directory searched for case files.
    #[arg(long)]
    pub root: PathBuf,
    /// File-name globs selecting case files; all case files when omitted.
    #[arg(long = "pattern", value_name = "GLOB")]
    pub patterns: Vec<String>,
    /// File-name globs to skip.
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,
    /// Only search the top level of `--root`.
    #[arg(long)]
    pub no_recursive: bool,
    /// Extension of the case documents.
    #[arg(long, default_value = "yaml")]
    pub extension: String,
    /// Suffix marking blueprint documents.
    #[arg(long, default_value = "-blueprints", allow_hyphen_values = true)]
    pub design_suffix: String,
}

impl SelectArgs {
    pub fn layout(&self) -> InputLayout {
        InputLayout {
            extension: self.extension.clone(),
            design_suffix: self.design_suffix.clone(),
        }
    }

    pub fn discover(&self) -> Result<Suite, suite_core::SuiteError> {
        let opts = DiscoverOpts {
            ignore: self.ignore.clone(),
            recursive: !self.no_recursive,
            layout: self.layout(),
        };
        Suite::discover(&self.root, &self.patterns, &opts)
    }
}
