//! Structured error types shared across the campaign crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`KshError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (file names, labels, etc.).
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

/// Canonical error type for the campaign tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum KshError {
    /// Unparseable state, nuclide or truncation text.
    #[error("format error: {0}")]
    Format(ErrorInfo),
    /// Element symbol absent from the periodic table.
    #[error("unknown element: {0}")]
    UnknownElement(ErrorInfo),
    /// Angular momentum or parity mismatch between an operator and its bra/ket.
    #[error("selection rule violated: {0}")]
    SelectionRule(ErrorInfo),
    /// Partition, wavefunction, summary or density file not produced yet.
    #[error("missing artifact: {0}")]
    MissingArtifact(ErrorInfo),
    /// Filesystem errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
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

impl KshError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            KshError::Format(info)
            | KshError::UnknownElement(info)
            | KshError::SelectionRule(info)
            | KshError::MissingArtifact(info)
            | KshError::Io(info)
            | KshError::Serde(info) => info,
        }
    }

    /// True when the error only means an upstream artifact is not ready yet.
    pub fn is_missing_artifact(&self) -> bool {
        matches!(self, KshError::MissingArtifact(_))
    }

    /// Wraps a filesystem error together with the offending path.
    pub fn io(code: &str, path: impl fmt::Display, err: impl ToString) -> Self {
        KshError::Io(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.to_string()),
        )
    }
}
