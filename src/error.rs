//! Error types.

use std::fmt;

use thiserror::Error;

/// Result alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Errors returned by resolver operations.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Filesystem I/O failed (typically `PermissionDenied` on `/etc/resolv.conf`).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The raw parameter set could not be decoded.
    #[error("invalid parameters: {0}")]
    Params(#[from] serde_json::Error),

    /// One or more parameters failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
}

impl ResolverError {
    /// Returns `true` if the underlying I/O error is `PermissionDenied`.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied)
    }

    /// Returns the validation failures, if this is a validation error.
    #[must_use]
    pub const fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Category of a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Value of the wrong kind, e.g. a list where a boolean was required.
    Shape,
    /// Scalar that fails its syntax check (IP address, domain name, integer).
    Format,
    /// Integer outside its permitted bounds.
    Range,
    /// List longer than its permitted maximum.
    Cardinality,
    /// `domain` and `search` both supplied.
    MutualExclusion,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shape => "shape",
            Self::Format => "format",
            Self::Range => "range",
            Self::Cardinality => "cardinality",
            Self::MutualExclusion => "mutual exclusion",
        })
    }
}

/// A single failed check on one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {value} {reason}")]
pub struct ValidationError {
    /// Parameter name, as the caller spells it.
    pub field: &'static str,
    /// The offending value, rendered as JSON.
    pub value: String,
    /// Category of the failure.
    pub kind: ErrorKind,
    /// Human-readable description of the violated constraint.
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(
        field: &'static str,
        value: impl fmt::Display,
        kind: ErrorKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field,
            value: value.to_string(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Every failed check from one validation pass. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Wraps the collected errors, or returns `None` if there are none.
    #[must_use]
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    /// Iterates over the individual errors in detection order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Number of failed checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if any error concerns `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Returns `true` if any error has the given kind.
    #[must_use]
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.0.iter().any(|e| e.kind == kind)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid parameter(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
