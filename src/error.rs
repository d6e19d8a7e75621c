//! Error taxonomy shared by every layer of the pool.
//!
//! Kinds mirror the error table in the design: a handful of named
//! failure modes rather than one opaque catch-all, so callers can match on
//! what actually happened (a malformed file vs. a cache that needs a
//! re-parse vs. two components racing for the same identity).

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppStreamError>;

/// A non-fatal issue recorded while loading a file. Issues never abort a
/// load on their own; they're surfaced to the caller alongside whatever
/// Components did parse successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: Option<PathBuf>,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Issue {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum AppStreamError {
    /// Malformed XML/YAML, unknown document root, truncated input.
    #[error("parse error{}: {message}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    Parse {
        path: Option<PathBuf>,
        message: String,
    },

    /// Well-formed input, semantically invalid value (bad id pattern,
    /// unknown enum variant). Parsers downgrade these to an [`Issue`] and
    /// drop the offending field rather than returning this variant, but it
    /// remains constructible for callers building their own validators.
    #[error("invalid value{}: {message}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    Value {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("I/O error accessing {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache corrupted, version-mismatched, or unwritable. Recovered
    /// locally by re-parse; surfaced only when the re-parse also fails.
    #[error("cache error at {path}: {message}")]
    Cache { path: PathBuf, message: String },

    /// Two Components share `(id, scope, origin)` after merge with no
    /// priority tiebreak.
    #[error("collision on id {id:?} between origins {a:?} and {b:?}")]
    Collision { id: String, a: String, b: String },

    /// Caller asked to override a validator tag severity that isn't
    /// overridable for that tag.
    #[error("override not permitted for tag {tag}")]
    Override { tag: String },

    /// A `load_async` call was cancelled before completion.
    #[error("load cancelled")]
    Cancelled,
}

impl AppStreamError {
    pub fn parse(message: impl Into<String>) -> Self {
        AppStreamError::Parse {
            path: None,
            message: message.into(),
        }
    }

    pub fn parse_at(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AppStreamError::Parse {
            path: Some(path.into()),
            message: message.into(),
        }
    }

    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match self {
            AppStreamError::Parse { message, .. } => AppStreamError::Parse {
                path: Some(path),
                message,
            },
            AppStreamError::Value { message, .. } => AppStreamError::Value {
                path: Some(path),
                message,
            },
            other => other,
        }
    }
}

impl From<quick_xml::Error> for AppStreamError {
    fn from(e: quick_xml::Error) -> Self {
        AppStreamError::parse(e.to_string())
    }
}

impl From<serde_yaml::Error> for AppStreamError {
    fn from(e: serde_yaml::Error) -> Self {
        AppStreamError::parse(e.to_string())
    }
}
