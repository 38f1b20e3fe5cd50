//! Domain-level error type shared by every service.
//!
//! Failures are values, not panics: every business-rule outcome a caller can
//! recover from (bad input, missing record, uniqueness clash, missing
//! privilege) is returned as an [`Error`] distinguishable by [`ErrorKind`].
//! Transport adapters map kinds onto their own envelopes; the domain stays
//! protocol agnostic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable machine-readable category describing a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input is malformed or out of range; the caller can correct and retry.
    Validation,
    /// A referenced workspace, plan, expense, or user does not exist.
    NotFound,
    /// A uniqueness rule was violated (plan type, workspace name, membership).
    Conflict,
    /// Authenticated but not a workspace participant, or not entitled to the
    /// record-level action.
    Forbidden,
    /// A participant attempted an owner-gated action without owner role.
    OwnerRequired,
    /// Credential missing, invalid, or expired.
    Unauthorized,
    /// Unexpected collaborator failure; details are logged, not surfaced.
    Internal,
}

/// Field-level validation messages keyed by the offending field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Domain failure payload carried through every service result.
///
/// # Examples
/// ```
/// use backend::domain::{Error, ErrorKind};
///
/// let err = Error::not_found("workspace does not exist");
/// assert_eq!(err.kind, ErrorKind::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    /// Failure category, stable across releases.
    pub kind: ErrorKind,
    /// Human-readable message safe to show to the caller.
    pub message: String,
    /// Per-field validation messages, present on `Validation` failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

impl Error {
    /// Create an error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field_errors: None,
        }
    }

    /// Append a message for a named field, keeping earlier ones.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Error;
    ///
    /// let err = Error::validation("invalid plan")
    ///     .with_field_error("plannedAmount", "must not be negative");
    /// assert!(err.field_errors.is_some());
    /// ```
    pub fn with_field_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.field_errors
            .get_or_insert_with(FieldErrors::new)
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Convenience constructor for [`ErrorKind::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Convenience constructor for [`ErrorKind::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Convenience constructor for [`ErrorKind::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Convenience constructor for [`ErrorKind::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorKind::OwnerRequired`].
    pub fn owner_required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OwnerRequired, message)
    }

    /// Convenience constructor for [`ErrorKind::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorKind::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
