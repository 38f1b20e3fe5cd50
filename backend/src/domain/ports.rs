//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the document store and the credential service). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants instead of returning a catch-all.
//!
//! Uniqueness rules are part of the port contracts: an adapter must enforce
//! them atomically with the write (a unique index or an equivalent
//! compare-and-set), never as a separate read-then-write, so concurrent
//! writers surface as typed duplicate errors instead of corrupting data.

use async_trait::async_trait;
use thiserror::Error;

use pagination::{Page, PageRequest};

use super::{
    EmailAddress, Expense, ExpenseFilter, ExpenseId, Identity, Plan, PlanId, PlanType, User,
    UserId, Workspace, WorkspaceId,
};

/// Errors surfaced by user store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserStoreError {
    /// Store connectivity failure.
    #[error("user store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user store query failed: {message}")]
    Query { message: String },
    /// Another account already holds this (case-insensitive) email.
    #[error("an account already exists for {email}")]
    DuplicateEmail { email: String },
}

impl UserStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for email uniqueness violations.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }
}

/// Errors surfaced by workspace store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceStoreError {
    /// Store connectivity failure.
    #[error("workspace store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("workspace store query failed: {message}")]
    Query { message: String },
    /// The owner already has a workspace with this name.
    #[error("workspace name '{name}' is already taken by this owner")]
    DuplicateName { name: String },
    /// The user is already a member of the workspace.
    #[error("user {user_id} is already a member")]
    DuplicateMember { user_id: String },
}

impl WorkspaceStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for `(name, owner)` uniqueness violations.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Helper for duplicate membership violations.
    pub fn duplicate_member(user_id: impl Into<String>) -> Self {
        Self::DuplicateMember {
            user_id: user_id.into(),
        }
    }
}

/// Errors surfaced by plan store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanStoreError {
    /// Store connectivity failure.
    #[error("plan store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("plan store query failed: {message}")]
    Query { message: String },
    /// The workspace already has a plan with this type.
    #[error("plan type '{plan_type}' already exists in this workspace")]
    DuplicateType { plan_type: String },
}

impl PlanStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for `(workspace, type)` uniqueness violations.
    pub fn duplicate_type(plan_type: impl Into<String>) -> Self {
        Self::DuplicateType {
            plan_type: plan_type.into(),
        }
    }
}

/// Errors surfaced by expense store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseStoreError {
    /// Store connectivity failure.
    #[error("expense store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("expense store query failed: {message}")]
    Query { message: String },
    /// The referenced plan type does not exist in the workspace.
    #[error("plan type '{plan_type}' does not exist in this workspace")]
    UnknownPlanType { plan_type: String },
}

impl ExpenseStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for referential-integrity violations on the category key.
    pub fn unknown_plan_type(plan_type: impl Into<String>) -> Self {
        Self::UnknownPlanType {
            plan_type: plan_type.into(),
        }
    }
}

/// Errors surfaced by the credential adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Password hashing or verification failed mechanically.
    #[error("credential hashing failed: {message}")]
    Hashing { message: String },
    /// Token issuance failed; verification failures are `Ok(None)` instead.
    #[error("token handling failed: {message}")]
    Token { message: String },
}

impl CredentialError {
    /// Helper for hashing failures.
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }

    /// Helper for token failures.
    pub fn token(message: impl Into<String>) -> Self {
        Self::Token {
            message: message.into(),
        }
    }
}

/// Per-category aggregate produced by [`ExpenseRepository::totals_by_plan_type`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlanTypeTotal {
    /// Category key.
    pub plan_type: PlanType,
    /// Sum of expense amounts in the category.
    pub total: f64,
    /// Number of expenses in the category.
    pub count: u64,
}

/// Persistence port for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Email uniqueness (case-insensitive; addresses
    /// are stored lowercased) must be enforced atomically with the write.
    async fn insert(&self, user: &User) -> Result<(), UserStoreError>;

    /// Fetch an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError>;

    /// Fetch an account by its normalised email.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserStoreError>;

    /// Append a workspace to the user's back-reference list (idempotent).
    async fn add_workspace(
        &self,
        user_id: &UserId,
        workspace_id: &WorkspaceId,
    ) -> Result<(), UserStoreError>;

    /// Remove a workspace from the user's back-reference list (idempotent).
    async fn remove_workspace(
        &self,
        user_id: &UserId,
        workspace_id: &WorkspaceId,
    ) -> Result<(), UserStoreError>;

    /// Remove a workspace from every user's back-reference list; returns the
    /// number of users touched. Used by the workspace-delete cascade.
    async fn remove_workspace_from_all(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<u64, UserStoreError>;
}

/// Persistence port for workspaces.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Insert a new workspace. `(name, owner)` uniqueness must be enforced
    /// atomically with the write.
    async fn insert(&self, workspace: &Workspace) -> Result<(), WorkspaceStoreError>;

    /// Fetch a workspace by id.
    async fn find_by_id(
        &self,
        id: &WorkspaceId,
    ) -> Result<Option<Workspace>, WorkspaceStoreError>;

    /// Fetch workspaces for the given ids, preserving the input order and
    /// skipping ids that no longer resolve.
    async fn find_by_ids(
        &self,
        ids: &[WorkspaceId],
    ) -> Result<Vec<Workspace>, WorkspaceStoreError>;

    /// Update name/description. Re-checks `(name, owner)` uniqueness against
    /// every other workspace. Returns `false` when the workspace is gone.
    async fn update_profile(
        &self,
        id: &WorkspaceId,
        name: &str,
        description: &str,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<bool, WorkspaceStoreError>;

    /// Add a member atomically; duplicate membership surfaces as
    /// [`WorkspaceStoreError::DuplicateMember`].
    async fn add_member(
        &self,
        id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<(), WorkspaceStoreError>;

    /// Remove a member; returns `false` when the user was not a member.
    async fn remove_member(
        &self,
        id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<bool, WorkspaceStoreError>;

    /// Delete the workspace record; returns `false` when already gone.
    async fn delete(&self, id: &WorkspaceId) -> Result<bool, WorkspaceStoreError>;
}

/// Persistence port for budget plans.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Insert a new plan. `(workspace, type)` uniqueness must be enforced
    /// atomically with the write.
    async fn insert(&self, plan: &Plan) -> Result<(), PlanStoreError>;

    /// Fetch a plan by id.
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, PlanStoreError>;

    /// Fetch a plan by its `(workspace, type)` key.
    async fn find_by_type(
        &self,
        workspace_id: &WorkspaceId,
        plan_type: &PlanType,
    ) -> Result<Option<Plan>, PlanStoreError>;

    /// Replace a plan record. The `(workspace, type)` uniqueness check must
    /// exclude the record under edit. Returns `false` when the plan is gone.
    async fn update(&self, plan: &Plan) -> Result<bool, PlanStoreError>;

    /// Delete a plan; returns `false` when already gone.
    async fn delete(&self, id: &PlanId) -> Result<bool, PlanStoreError>;

    /// All plans in a workspace, sorted by type ascending then creation time
    /// descending.
    async fn list_by_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<Plan>, PlanStoreError>;

    /// Delete every plan in a workspace; returns the number removed.
    async fn delete_by_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<u64, PlanStoreError>;
}

/// Persistence port for expenses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Insert a new expense. When the category is not `"other"`, the adapter
    /// must verify a matching plan exists in the workspace atomically with
    /// the write and surface [`ExpenseStoreError::UnknownPlanType`] otherwise.
    async fn insert(&self, expense: &Expense) -> Result<(), ExpenseStoreError>;

    /// Fetch an expense by id.
    async fn find_by_id(&self, id: &ExpenseId) -> Result<Option<Expense>, ExpenseStoreError>;

    /// Replace an expense record, applying the same category check as
    /// [`ExpenseRepository::insert`]. Returns `false` when the expense is gone.
    async fn update(&self, expense: &Expense) -> Result<bool, ExpenseStoreError>;

    /// Delete an expense; returns `false` when already gone.
    async fn delete(&self, id: &ExpenseId) -> Result<bool, ExpenseStoreError>;

    /// Filtered page of a workspace's expenses, ordered by date descending
    /// then creation time descending.
    async fn list(
        &self,
        workspace_id: &WorkspaceId,
        filter: &ExpenseFilter,
        page: PageRequest,
    ) -> Result<Page<Expense>, ExpenseStoreError>;

    /// Every expense in a workspace, unordered; analytics input.
    async fn list_all(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<Expense>, ExpenseStoreError>;

    /// Sum of all expense amounts in a workspace.
    async fn total_amount(&self, workspace_id: &WorkspaceId) -> Result<f64, ExpenseStoreError>;

    /// Per-category sums and counts, descending by sum.
    async fn totals_by_plan_type(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<PlanTypeTotal>, ExpenseStoreError>;

    /// Delete every expense in a workspace; returns the number removed.
    async fn delete_by_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<u64, ExpenseStoreError>;
}

/// Credential service contract: hashing and bearer-token handling.
///
/// `verify_token` distinguishes "token is invalid or expired" (`Ok(None)`,
/// an authentication failure) from mechanical adapter errors (`Err`).
#[cfg_attr(test, mockall::automock)]
pub trait CredentialService: Send + Sync {
    /// Hash a raw password for storage.
    fn hash_password(&self, password: &str) -> Result<String, CredentialError>;

    /// Check a raw password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, CredentialError>;

    /// Issue a bearer token encoding the identity.
    fn issue_token(&self, identity: &Identity) -> Result<String, CredentialError>;

    /// Resolve a bearer token back to an identity; `None` when the token is
    /// missing a valid signature, malformed, or expired.
    fn verify_token(&self, token: &str) -> Result<Option<Identity>, CredentialError>;
}
