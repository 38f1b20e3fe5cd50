//! Domain layer: entities, ports, and the workspace-scoped services.
//!
//! Everything here is transport and storage agnostic. Adapters sit at the
//! edges: the HTTP layer maps [`Error`] values onto status codes, the store
//! implements the repository ports, and the credential adapter implements
//! [`ports::CredentialService`]. Services are stateless values over
//! `Arc`-shared collaborators; no module-level singletons.

pub mod access;
pub mod account_service;
pub mod analytics;
mod error;
pub mod expense;
pub mod expense_service;
mod identity;
mod ids;
pub mod membership;
pub mod plan;
pub mod plan_service;
pub mod ports;
mod user;
pub mod workspace;
pub mod workspace_service;

pub use self::access::AccessGuard;
pub use self::account_service::{AccountService, AuthenticatedUser, UserProfile};
pub use self::analytics::{
    compute_snapshot, Alert, AlertSeverity, AnalyticsService, AnalyticsSnapshot, AnalyticsTotals,
    BudgetSummary, CategoryComparison, CategoryStatus, MonthlyTrendEntry,
};
pub use self::error::{DomainResult, Error, ErrorKind, FieldErrors};
pub use self::expense::{
    validate_amount, validate_note, Expense, ExpenseFilter, ExpenseValidationError,
};
pub use self::expense_service::{
    ExpenseDraft, ExpensePatch, ExpenseService, ExpenseSummary,
};
pub use self::identity::{
    CredentialValidationError, Credentials, EmailAddress, EmailValidationError, Identity,
};
pub use self::ids::{ExpenseId, PlanId, UserId, WorkspaceId};
pub use self::membership::{MemberEntry, MembershipService};
pub use self::plan::{
    validate_planned_amount, Plan, PlanType, PlanValidationError, OTHER_CATEGORY,
};
pub use self::plan_service::{PlanDraft, PlanList, PlanPatch, PlanService};
pub use self::user::User;
pub use self::workspace::{Role, Workspace, WorkspaceDraft, WorkspaceValidationError};
pub use self::workspace_service::{WorkspacePatch, WorkspaceService};
