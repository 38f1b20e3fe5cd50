//! Account services: registration, login, and identity resolution.
//!
//! Password hashing and token handling live behind the credential port; the
//! service owns the business rules only (email uniqueness, indistinguishable
//! login failures).

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::ports::{CredentialError, CredentialService, UserRepository, UserStoreError};
use crate::domain::{Credentials, EmailAddress, Error, Identity, User, UserId};

/// Message returned for every failed login attempt. Unknown email and wrong
/// password must be indistinguishable to the caller.
const BAD_LOGIN: &str = "invalid email or password";

fn map_user_store_error(error: UserStoreError) -> Error {
    match error {
        UserStoreError::Connection { message } => {
            Error::internal(format!("user store unavailable: {message}"))
        }
        UserStoreError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
        UserStoreError::DuplicateEmail { .. } => {
            Error::conflict("an account with this email already exists")
                .with_field_error("email", "already registered")
        }
    }
}

fn map_credential_error(error: CredentialError) -> Error {
    Error::internal(format!("credential service failure: {error}"))
}

/// Public account projection; never carries the credential hash.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    /// Stable identifier.
    pub id: UserId,
    /// Normalised email address.
    pub email: EmailAddress,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Successful registration or login: the profile plus a fresh bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The account the token belongs to.
    pub profile: UserProfile,
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// Account service over the user repository and credential port.
#[derive(Clone)]
pub struct AccountService<U, C> {
    users: Arc<U>,
    credentials: Arc<C>,
}

impl<U, C> AccountService<U, C> {
    /// Create a new service with the given collaborators.
    pub fn new(users: Arc<U>, credentials: Arc<C>) -> Self {
        Self { users, credentials }
    }
}

impl<U, C> AccountService<U, C>
where
    U: UserRepository,
    C: CredentialService,
{
    /// Register a new account and sign the caller in.
    ///
    /// Fails `Conflict` when the (case-insensitive) email is already taken.
    pub async fn register(&self, credentials: &Credentials) -> Result<AuthenticatedUser, Error> {
        let hash = self
            .credentials
            .hash_password(credentials.password())
            .map_err(map_credential_error)?;

        let user = User::new(credentials.email().clone(), hash, Utc::now());
        self.users
            .insert(&user)
            .await
            .map_err(map_user_store_error)?;

        self.issue_for(&user)
    }

    /// Verify credentials and issue a bearer token.
    ///
    /// Every failure path returns the same `Unauthorized` message so callers
    /// cannot probe which emails are registered.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthenticatedUser, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::unauthorized(BAD_LOGIN))?;

        let matches = self
            .credentials
            .verify_password(credentials.password(), &user.credential_hash)
            .map_err(map_credential_error)?;
        if !matches {
            return Err(Error::unauthorized(BAD_LOGIN));
        }

        self.issue_for(&user)
    }

    /// Resolve a bearer token to a verified identity.
    ///
    /// A missing, malformed, or expired token fails `Unauthorized`; only
    /// mechanical credential-service faults surface as `Internal`.
    pub fn identify(&self, bearer: &str) -> Result<Identity, Error> {
        self.credentials
            .verify_token(bearer)
            .map_err(map_credential_error)?
            .ok_or_else(|| Error::unauthorized("invalid or expired token"))
    }

    /// Fetch the profile behind a verified identity.
    pub async fn me(&self, identity: &Identity) -> Result<UserProfile, Error> {
        let user = self
            .users
            .find_by_id(&identity.user_id)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
        Ok(UserProfile::from(&user))
    }

    fn issue_for(&self, user: &User) -> Result<AuthenticatedUser, Error> {
        let identity = Identity {
            user_id: user.id,
            email: user.email.clone(),
        };
        let token = self
            .credentials
            .issue_token(&identity)
            .map_err(map_credential_error)?;
        Ok(AuthenticatedUser {
            profile: UserProfile::from(user),
            token,
        })
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
