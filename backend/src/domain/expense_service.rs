//! Expense ledger: CRUD, filtered listing, and aggregate read models.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::access::AccessGuard;
use crate::domain::ports::{
    ExpenseRepository, ExpenseStoreError, PlanTypeTotal, WorkspaceRepository,
};
use crate::domain::{
    validate_amount, validate_note, Error, Expense, ExpenseFilter, ExpenseId,
    ExpenseValidationError, Identity, PlanType, Role, WorkspaceId,
};

fn map_expense_store_error(error: ExpenseStoreError) -> Error {
    match error {
        ExpenseStoreError::Connection { message } => {
            Error::internal(format!("expense store unavailable: {message}"))
        }
        ExpenseStoreError::Query { message } => {
            Error::internal(format!("expense store error: {message}"))
        }
        ExpenseStoreError::UnknownPlanType { plan_type } => Error::validation(format!(
            "plan type '{plan_type}' does not exist in this workspace"
        ))
        .with_field_error("planType", "no plan with this type exists"),
    }
}

fn map_validation_error(error: ExpenseValidationError) -> Error {
    Error::validation(error.to_string()).with_field_error(error.field(), error.to_string())
}

fn parse_plan_type(raw: Option<String>) -> Result<PlanType, Error> {
    match raw {
        None => Ok(PlanType::other()),
        Some(text) if text.trim().is_empty() => Ok(PlanType::other()),
        Some(text) => PlanType::parse(&text).map_err(|err| {
            Error::validation(err.to_string()).with_field_error("planType", err.to_string())
        }),
    }
}

/// Input for recording an expense.
#[derive(Debug, Clone, Default)]
pub struct ExpenseDraft {
    /// Category key; empty or missing falls back to `"other"`.
    pub plan_type: Option<String>,
    /// Spent amount; must be finite and strictly positive.
    pub amount: f64,
    /// Optional free-form note.
    pub note: Option<String>,
    /// When the expense occurred; defaults to now.
    pub date: Option<DateTime<Utc>>,
}

/// Patch applied to an existing expense. Absent fields stay unchanged; an
/// empty note string clears the note.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    /// Replacement category key, if changing.
    pub plan_type: Option<String>,
    /// Replacement amount, if changing.
    pub amount: Option<f64>,
    /// Replacement note, if changing.
    pub note: Option<String>,
    /// Replacement occurrence date, if changing.
    pub date: Option<DateTime<Utc>>,
}

/// Aggregate read model over a workspace's expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseSummary {
    /// Sum of every expense amount in the workspace.
    pub total_amount: f64,
    /// Per-category sums and counts, descending by sum.
    pub by_plan_type: Vec<PlanTypeTotal>,
}

/// Expense service over the workspace and expense stores.
#[derive(Clone)]
pub struct ExpenseService<W, E> {
    guard: AccessGuard<W>,
    expenses: Arc<E>,
}

impl<W, E> ExpenseService<W, E> {
    /// Create a new service with the given collaborators.
    pub fn new(workspaces: Arc<W>, expenses: Arc<E>) -> Self {
        Self {
            guard: AccessGuard::new(workspaces),
            expenses,
        }
    }
}

impl<W, E> ExpenseService<W, E>
where
    W: WorkspaceRepository,
    E: ExpenseRepository,
{
    /// Record an expense attributed to the caller; any participant.
    ///
    /// A non-`"other"` category must name an existing plan; the store checks
    /// this atomically with the write.
    pub async fn create(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
        draft: ExpenseDraft,
    ) -> Result<Expense, Error> {
        self.guard.require_participant(workspace_id, identity).await?;

        let plan_type = parse_plan_type(draft.plan_type)?;
        let amount = validate_amount(draft.amount).map_err(map_validation_error)?;
        let note = validate_note(draft.note).map_err(map_validation_error)?;
        let now = Utc::now();

        let expense = Expense::new(
            *workspace_id,
            plan_type,
            amount,
            note,
            draft.date.unwrap_or(now),
            identity.user_id,
            now,
        );
        self.expenses
            .insert(&expense)
            .await
            .map_err(map_expense_store_error)?;
        Ok(expense)
    }

    /// Update an expense; any participant.
    pub async fn update(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
        expense_id: &ExpenseId,
        patch: ExpensePatch,
    ) -> Result<Expense, Error> {
        self.guard.require_participant(workspace_id, identity).await?;

        let mut expense = self.fetch_scoped(workspace_id, expense_id).await?;
        if let Some(raw) = patch.plan_type {
            expense.plan_type = parse_plan_type(Some(raw))?;
        }
        if let Some(amount) = patch.amount {
            expense.amount = validate_amount(amount).map_err(map_validation_error)?;
        }
        if let Some(note) = patch.note {
            expense.note = validate_note(Some(note)).map_err(map_validation_error)?;
        }
        if let Some(date) = patch.date {
            expense.date = date;
        }
        expense.updated_at = Utc::now();

        let found = self
            .expenses
            .update(&expense)
            .await
            .map_err(map_expense_store_error)?;
        if !found {
            return Err(Error::not_found("expense does not exist"));
        }
        Ok(expense)
    }

    /// Delete an expense; only its creator or the workspace owner.
    pub async fn delete(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
        expense_id: &ExpenseId,
    ) -> Result<(), Error> {
        let (_, role) = self.guard.require_participant(workspace_id, identity).await?;

        let expense = self.fetch_scoped(workspace_id, expense_id).await?;
        if expense.created_by != identity.user_id && role != Role::Owner {
            return Err(Error::forbidden(
                "only the expense creator or the workspace owner can delete this expense",
            ));
        }

        let found = self
            .expenses
            .delete(expense_id)
            .await
            .map_err(map_expense_store_error)?;
        if !found {
            return Err(Error::not_found("expense does not exist"));
        }
        Ok(())
    }

    /// Filtered, paginated listing ordered by date then creation time, both
    /// descending.
    pub async fn list(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
        filter: ExpenseFilter,
        page: PageRequest,
    ) -> Result<Page<Expense>, Error> {
        self.guard.require_participant(workspace_id, identity).await?;

        self.expenses
            .list(workspace_id, &filter, page)
            .await
            .map_err(map_expense_store_error)
    }

    /// Aggregate totals for the workspace.
    pub async fn summary(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
    ) -> Result<ExpenseSummary, Error> {
        self.guard.require_participant(workspace_id, identity).await?;

        let total_amount = self
            .expenses
            .total_amount(workspace_id)
            .await
            .map_err(map_expense_store_error)?;
        let by_plan_type = self
            .expenses
            .totals_by_plan_type(workspace_id)
            .await
            .map_err(map_expense_store_error)?;
        Ok(ExpenseSummary {
            total_amount,
            by_plan_type,
        })
    }

    async fn fetch_scoped(
        &self,
        workspace_id: &WorkspaceId,
        expense_id: &ExpenseId,
    ) -> Result<Expense, Error> {
        let expense = self
            .expenses
            .find_by_id(expense_id)
            .await
            .map_err(map_expense_store_error)?
            .filter(|expense| expense.workspace_id == *workspace_id)
            .ok_or_else(|| Error::not_found("expense does not exist"))?;
        Ok(expense)
    }
}

#[cfg(test)]
#[path = "expense_service_tests.rs"]
mod tests;
