//! Structured error types shared across suite crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SuiteError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (case names, paths, element names).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// One failed case inside an aggregated batch error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFailure {
    /// Name of the case that failed.
    pub case: String,
    /// Error family of the underlying failure (`io`, `lookup`, ...).
    pub family: String,
    /// Payload of the underlying failure.
    pub error: ErrorInfo,
}

/// Batch-level failure summarising every failed case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateFailure {
    /// Summary payload for the batch.
    pub info: ErrorInfo,
    /// Individual failures in case order.
    pub failures: Vec<CaseFailure>,
}

impl AggregateFailure {
    /// Builds an aggregate from the collected per-case failures.
    pub fn new(code: impl Into<String>, operation: &str, failures: Vec<CaseFailure>) -> Self {
        let names = failures
            .iter()
            .map(|failure| failure.case.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let info = ErrorInfo::new(
            code,
            format!("{operation} failed for {} case(s)", failures.len()),
        )
        .with_context("cases", names);
        Self { info, failures }
    }

    /// Returns the names of the failed cases in order.
    pub fn case_names(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.case.as_str()).collect()
    }
}

impl Display for AggregateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info)?;
        for failure in &self.failures {
            write!(f, "\n  - {} [{}]: {}", failure.case, failure.family, failure.error)?;
        }
        Ok(())
    }
}

/// Canonical error type for suite construction, I/O and discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SuiteError {
    /// Builder misuse or invalid declarations.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// A modifier referenced a design element or setting that does not exist.
    #[error("lookup error: {0}")]
    Lookup(ErrorInfo),
    /// Artifact read or write failure.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Batch failure wrapping per-case errors.
    #[error("aggregate error: {0}")]
    Aggregate(AggregateFailure),
}

impl SuiteError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SuiteError::Configuration(info)
            | SuiteError::Lookup(info)
            | SuiteError::Io(info)
            | SuiteError::Serde(info) => info,
            SuiteError::Aggregate(aggregate) => &aggregate.info,
        }
    }

    /// Returns the lowercase family tag of the error.
    pub fn family(&self) -> &'static str {
        match self {
            SuiteError::Configuration(_) => "configuration",
            SuiteError::Lookup(_) => "lookup",
            SuiteError::Io(_) => "io",
            SuiteError::Serde(_) => "serde",
            SuiteError::Aggregate(_) => "aggregate",
        }
    }

    /// Converts the error into a per-case failure record.
    pub fn into_case_failure(self, case: impl Into<String>) -> CaseFailure {
        let family = self.family().to_string();
        let error = match self {
            SuiteError::Aggregate(aggregate) => aggregate.info,
            SuiteError::Configuration(info)
            | SuiteError::Lookup(info)
            | SuiteError::Io(info)
            | SuiteError::Serde(info) => info,
        };
        CaseFailure {
            case: case.into(),
            family,
            error,
        }
    }

    /// Adds a context entry to the payload of any variant.
    pub fn with_context(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            SuiteError::Configuration(info) => {
                SuiteError::Configuration(info.with_context(key, value))
            }
            SuiteError::Lookup(info) => SuiteError::Lookup(info.with_context(key, value)),
            SuiteError::Io(info) => SuiteError::Io(info.with_context(key, value)),
            SuiteError::Serde(info) => SuiteError::Serde(info.with_context(key, value)),
            SuiteError::Aggregate(mut aggregate) => {
                aggregate.info = aggregate.info.with_context(key, value);
                SuiteError::Aggregate(aggregate)
            }
        }
    }

    /// Shorthand for a configuration error.
    pub fn configuration(code: &str, message: impl Into<String>) -> Self {
        SuiteError::Configuration(ErrorInfo::new(code, message))
    }

    /// Shorthand for a lookup error naming the missing element.
    pub fn lookup(kind: &str, name: &str) -> Self {
        SuiteError::Lookup(
            ErrorInfo::new(format!("missing-{kind}"), format!("{kind} `{name}` not found"))
                .with_context(kind, name),
        )
    }
}
