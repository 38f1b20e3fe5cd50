//! Identity primitives: verified identities, email addresses, credentials.
//!
//! Inbound payload parsing stays outside the domain; these types expose
//! validating constructors so a handler has a proven-good value before it
//! talks to a port or service.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::UserId;

/// Longest acceptable email address, per the usual mailbox length cap.
const MAX_EMAIL_LEN: usize = 254;

/// Bounds on raw password length accepted at registration.
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// Validation errors returned when constructing an [`EmailAddress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailValidationError {
    /// Address was empty once trimmed.
    Empty,
    /// Address does not have the `local@domain` shape.
    MalformedAddress,
    /// Address exceeds the length cap.
    TooLong { max: usize },
}

impl fmt::Display for EmailValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "email must not be empty"),
            Self::MalformedAddress => write!(f, "email must look like local@domain"),
            Self::TooLong { max } => write!(f, "email must be at most {max} characters"),
        }
    }
}

impl std::error::Error for EmailValidationError {}

/// Case-insensitive email address, stored lowercased.
///
/// ## Invariants
/// - Trimmed, non-empty, at most 254 characters.
/// - Contains exactly one `@` with non-empty local part and a domain
///   containing a dot.
/// - Always lowercase, so equality is the case-insensitive uniqueness rule.
///
/// # Examples
/// ```
/// use backend::domain::EmailAddress;
///
/// let email = EmailAddress::parse("  Ada@Example.ORG ").unwrap();
/// assert_eq!(email.as_str(), "ada@example.org");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise a raw email address.
    pub fn parse(raw: &str) -> Result<Self, EmailValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        if trimmed.len() > MAX_EMAIL_LEN {
            return Err(EmailValidationError::TooLong { max: MAX_EMAIL_LEN });
        }
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(EmailValidationError::MalformedAddress);
        };
        if local.is_empty() || domain.len() < 3 || !domain.contains('.') || domain.contains('@') {
            return Err(EmailValidationError::MalformedAddress);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Borrow the normalised address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Verified `(user id, email)` pair produced by the credential service.
///
/// Every guarded operation receives one of these; the domain never sees raw
/// bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Authenticated user's identifier.
    pub user_id: UserId,
    /// Authenticated user's email address.
    pub email: EmailAddress,
}

/// Validation errors returned when constructing [`Credentials`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Email failed validation.
    Email(EmailValidationError),
    /// Password is shorter than the minimum.
    PasswordTooShort { min: usize },
    /// Password exceeds the maximum.
    PasswordTooLong { max: usize },
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(inner) => inner.fmt(f),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for CredentialValidationError {}

impl CredentialValidationError {
    /// Name of the input field this error applies to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::PasswordTooShort { .. } | Self::PasswordTooLong { .. } => "password",
        }
    }
}

/// Validated registration/login credentials.
///
/// ## Invariants
/// - `email` is a valid [`EmailAddress`].
/// - `password` is 8..=128 bytes and retains caller-provided whitespace to
///   avoid surprising credential comparisons. The buffer is zeroised on drop.
#[derive(Debug, Clone)]
pub struct Credentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw email/password input.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let email = EmailAddress::parse(email).map_err(CredentialValidationError::Email)?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(CredentialValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        if password.len() > MAX_PASSWORD_LEN {
            return Err(CredentialValidationError::PasswordTooLong {
                max: MAX_PASSWORD_LEN,
            });
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for account lookups.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password exactly as the caller supplied it.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
