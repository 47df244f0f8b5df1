use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use suite_core::errors::{AggregateFailure, CaseFailure, ErrorInfo, SuiteError};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::case::Case;
use crate::context::InputLayout;
use crate::runner::{CaseRunner, RunOutcome};
use crate::table::Table;

/// Options for writing a suite's inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOpts {
    /// Number of worker threads writing cases; values below one mean one.
    pub concurrency: usize,
}

impl Default for WriteOpts {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Options controlling discovery of previously written cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverOpts {
    /// File-name globs to skip even when a pattern matches.
    pub ignore: Vec<String>,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Layout used to recognise blueprint documents.
    pub layout: InputLayout,
}

impl Default for DiscoverOpts {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            recursive: true,
            layout: InputLayout::default(),
        }
    }
}

/// Ordered collection of cases with unique names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Suite {
    cases: Vec<Case>,
}

impl Suite {
    /// Creates a suite, rejecting duplicate case names.
    pub fn new(cases: Vec<Case>) -> Result<Self, SuiteError> {
        let mut seen = BTreeSet::new();
        for case in &cases {
            if !seen.insert(case.name()) {
                return Err(SuiteError::Configuration(
                    ErrorInfo::new("duplicate-case", "case name appears twice in suite")
                        .with_context("case", case.name()),
                ));
            }
        }
        Ok(Self { cases })
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Case> {
        self.cases.iter()
    }

    /// Looks a case up by name.
    pub fn get(&self, name: &str) -> Option<&Case> {
        self.cases.iter().find(|case| case.name() == name)
    }

    /// Writes every case's inputs.
    ///
    /// A failing case does not stop the others; once all cases were
    /// attempted, every failure is reported in one aggregate error ordered
    /// like the suite.
    pub fn write_inputs(
        &self,
        layout: &InputLayout,
        opts: &WriteOpts,
    ) -> Result<Vec<PathBuf>, SuiteError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.concurrency.max(1))
            .build()
            .map_err(|err| SuiteError::Io(ErrorInfo::new("thread-pool", err.to_string())))?;
        let mut results: Vec<(usize, Result<PathBuf, SuiteError>)> = pool.install(|| {
            self.cases
                .par_iter()
                .enumerate()
                .map(|(idx, case)| (idx, case.write_inputs(layout)))
                .collect()
        });
        results.sort_by_key(|(idx, _)| *idx);

        let mut written = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (idx, result) in results {
            match result {
                Ok(path) => written.push(path),
                Err(err) => {
                    let name = self.cases[idx].name();
                    warn!(case = %name, error = %err, "failed to write case inputs");
                    failures.push(err.into_case_failure(name));
                }
            }
        }
        finish_batch("write-inputs", "write inputs", failures)?;
        info!(cases = written.len(), "wrote suite inputs");
        Ok(written)
    }

    /// Runs every case through `runner`, aggregating failures like
    /// [`Suite::write_inputs`].
    pub fn run(&self, runner: &dyn CaseRunner) -> Result<Vec<RunOutcome>, SuiteError> {
        let mut outcomes = Vec::with_capacity(self.cases.len());
        let mut failures = Vec::new();
        for case in &self.cases {
            match case.run(runner) {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    warn!(case = %case.name(), error = %err, "case run failed");
                    failures.push(err.into_case_failure(case.name()));
                }
            }
        }
        finish_batch("run-cases", "run", failures)?;
        Ok(outcomes)
    }

    /// Reconstructs a suite from settings documents under `root`.
    ///
    /// File names are matched against `patterns` (all settings documents
    /// when empty). Blueprint documents and `ignore` matches are skipped.
    /// Cases are ordered by path. A missing root is an I/O error; finding
    /// nothing yields an empty suite.
    pub fn discover(
        root: &Path,
        patterns: &[String],
        opts: &DiscoverOpts,
    ) -> Result<Self, SuiteError> {
        fs::read_dir(root).map_err(|err| {
            SuiteError::Io(
                ErrorInfo::new("discover-root", err.to_string())
                    .with_context("path", root.display().to_string()),
            )
        })?;
        let include = if patterns.is_empty() {
            build_globset(&[format!("*.{}", opts.layout.extension)])?
        } else {
            build_globset(patterns)?
        };
        let ignore = build_globset(&opts.ignore)?;
        let max_depth = if opts.recursive { usize::MAX } else { 1 };

        let mut matches = Vec::new();
        for entry in WalkDir::new(root).max_depth(max_depth) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry during discovery");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if !include.is_match(&*file_name)
                || ignore.is_match(&*file_name)
                || opts.layout.is_design_file(&file_name)
            {
                continue;
            }
            matches.push(entry.into_path());
        }
        matches.sort();

        let cases = matches
            .iter()
            .map(|path| Case::load(path.as_path()))
            .collect::<Result<Vec<_>, _>>()?;
        info!(root = %root.display(), cases = cases.len(), "discovered cases");
        Self::new(cases)
    }

    /// Summary table of the suite.
    pub fn summary_table(&self) -> Result<Table, SuiteError> {
        Table::from_cases(self.cases.iter())
    }

    /// Writes the summary table as CSV.
    pub fn write_summary_csv(&self, path: &Path) -> Result<(), SuiteError> {
        self.summary_table()?.write_csv(path)
    }
}

impl<'a> IntoIterator for &'a Suite {
    type Item = &'a Case;
    type IntoIter = std::slice::Iter<'a, Case>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

fn finish_batch(code: &str, operation: &str, failures: Vec<CaseFailure>) -> Result<(), SuiteError> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(SuiteError::Aggregate(AggregateFailure::new(
            code, operation, failures,
        )))
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, SuiteError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|err| {
            SuiteError::Configuration(
                ErrorInfo::new("glob", err.to_string()).with_context("pattern", pattern.clone()),
            )
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| SuiteError::Configuration(ErrorInfo::new("glob-build", err.to_string())))
}
