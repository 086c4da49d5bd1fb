use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Status classification of a failed request. Rendered in the fixed order
/// `Failure` then `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Failure,
    Error,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Failure => "Failure",
            ErrorKind::Error => "Error",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ErrorKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Failure" => Ok(ErrorKind::Failure),
            "Error" => Ok(ErrorKind::Error),
            other => Err(ReportError::InvalidInput(format!(
                "unknown error status: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorRecord
// ---------------------------------------------------------------------------

/// Structured exception metadata extracted from a failed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExceptionInfo {
    pub file: String,
    pub line: String,
    pub kind: String,
    pub value: String,
}

/// One failed or errored request occurrence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorRecord {
    /// Response status code.
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionInfo>,
    /// Raw traceback text, rendered as a literal block when no structured
    /// exception metadata is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

// ---------------------------------------------------------------------------
// BenchErrors
// ---------------------------------------------------------------------------

/// All error records of a bench run, split by status classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BenchErrors {
    #[serde(default)]
    pub failures: Vec<ErrorRecord>,
    #[serde(default)]
    pub errors: Vec<ErrorRecord>,
}

impl BenchErrors {
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty() && self.errors.is_empty()
    }

    /// Records for one classification, in recording order.
    pub fn records(&self, kind: ErrorKind) -> &[ErrorRecord] {
        match kind {
            ErrorKind::Failure => &self.failures,
            ErrorKind::Error => &self.errors,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
