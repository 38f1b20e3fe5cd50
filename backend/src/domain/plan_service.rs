//! Plan registry: CRUD over budget plans plus listing read models.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::access::AccessGuard;
use crate::domain::ports::{PlanRepository, PlanStoreError, WorkspaceRepository};
use crate::domain::{
    validate_planned_amount, Error, Identity, Plan, PlanId, PlanType, PlanValidationError,
    WorkspaceId, OTHER_CATEGORY,
};

fn map_plan_store_error(error: PlanStoreError) -> Error {
    match error {
        PlanStoreError::Connection { message } => {
            Error::internal(format!("plan store unavailable: {message}"))
        }
        PlanStoreError::Query { message } => {
            Error::internal(format!("plan store error: {message}"))
        }
        PlanStoreError::DuplicateType { plan_type } => Error::conflict(format!(
            "a plan for '{plan_type}' already exists in this workspace"
        )),
    }
}

fn map_validation_error(error: PlanValidationError) -> Error {
    Error::validation(error.to_string()).with_field_error(error.field(), error.to_string())
}

/// Input for creating a plan.
#[derive(Debug, Clone)]
pub struct PlanDraft {
    /// Raw category key; trimmed and validated by the service.
    pub plan_type: String,
    /// Target amount; must be finite and non-negative.
    pub planned_amount: f64,
}

/// Patch applied to an existing plan.
#[derive(Debug, Clone, Default)]
pub struct PlanPatch {
    /// Replacement category key, if changing.
    pub plan_type: Option<String>,
    /// Replacement target amount, if changing.
    pub planned_amount: Option<f64>,
}

/// Listing read model: all plans plus the aggregate totals.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanList {
    /// Plans sorted by type ascending, then creation time descending.
    pub plans: Vec<Plan>,
    /// Sum of all planned amounts.
    pub total_planned_amount: f64,
    /// Mean planned amount; zero when the workspace has no plans.
    pub average_amount: f64,
}

/// Plan service over the workspace and plan stores.
#[derive(Clone)]
pub struct PlanService<W, P> {
    guard: AccessGuard<W>,
    plans: Arc<P>,
}

impl<W, P> PlanService<W, P> {
    /// Create a new service with the given collaborators.
    pub fn new(workspaces: Arc<W>, plans: Arc<P>) -> Self {
        Self {
            guard: AccessGuard::new(workspaces),
            plans,
        }
    }
}

impl<W, P> PlanService<W, P>
where
    W: WorkspaceRepository,
    P: PlanRepository,
{
    /// Create a plan; any participant may do so.
    ///
    /// Fails `Conflict` when the workspace already budgets this category.
    pub async fn create(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
        draft: PlanDraft,
    ) -> Result<Plan, Error> {
        self.guard.require_participant(workspace_id, identity).await?;

        let plan_type = PlanType::parse(&draft.plan_type).map_err(map_validation_error)?;
        let amount = validate_planned_amount(draft.planned_amount).map_err(map_validation_error)?;

        let plan = Plan::new(*workspace_id, plan_type, amount, Utc::now());
        self.plans
            .insert(&plan)
            .await
            .map_err(map_plan_store_error)?;
        Ok(plan)
    }

    /// Update a plan; any participant may do so.
    ///
    /// A type change re-checks uniqueness excluding the record under edit.
    pub async fn update(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
        plan_id: &PlanId,
        patch: PlanPatch,
    ) -> Result<Plan, Error> {
        self.guard.require_participant(workspace_id, identity).await?;

        let mut plan = self.fetch_scoped(workspace_id, plan_id).await?;
        if let Some(raw) = patch.plan_type {
            plan.plan_type = PlanType::parse(&raw).map_err(map_validation_error)?;
        }
        if let Some(amount) = patch.planned_amount {
            plan.planned_amount = validate_planned_amount(amount).map_err(map_validation_error)?;
        }
        plan.updated_at = Utc::now();

        let found = self
            .plans
            .update(&plan)
            .await
            .map_err(map_plan_store_error)?;
        if !found {
            return Err(Error::not_found("plan does not exist"));
        }
        Ok(plan)
    }

    /// Delete a plan; owner only.
    pub async fn delete(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
        plan_id: &PlanId,
    ) -> Result<(), Error> {
        self.guard.require_owner(workspace_id, identity).await?;

        self.fetch_scoped(workspace_id, plan_id).await?;
        let found = self
            .plans
            .delete(plan_id)
            .await
            .map_err(map_plan_store_error)?;
        if !found {
            return Err(Error::not_found("plan does not exist"));
        }
        Ok(())
    }

    /// List the workspace's plans with aggregate totals.
    pub async fn list(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
    ) -> Result<PlanList, Error> {
        self.guard.require_participant(workspace_id, identity).await?;

        let plans = self
            .plans
            .list_by_workspace(workspace_id)
            .await
            .map_err(map_plan_store_error)?;

        let total_planned_amount: f64 = plans.iter().map(|plan| plan.planned_amount).sum();
        let average_amount = if plans.is_empty() {
            0.0
        } else {
            total_planned_amount / plans.len() as f64
        };

        Ok(PlanList {
            plans,
            total_planned_amount,
            average_amount,
        })
    }

    /// Distinct category keys in the workspace, always including `"other"`,
    /// sorted lexicographically.
    pub async fn plan_types(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<String>, Error> {
        self.guard.require_participant(workspace_id, identity).await?;

        let plans = self
            .plans
            .list_by_workspace(workspace_id)
            .await
            .map_err(map_plan_store_error)?;

        let mut types: BTreeSet<String> = plans
            .into_iter()
            .map(|plan| plan.plan_type.as_str().to_owned())
            .collect();
        types.insert(OTHER_CATEGORY.to_owned());
        Ok(types.into_iter().collect())
    }

    async fn fetch_scoped(
        &self,
        workspace_id: &WorkspaceId,
        plan_id: &PlanId,
    ) -> Result<Plan, Error> {
        let plan = self
            .plans
            .find_by_id(plan_id)
            .await
            .map_err(map_plan_store_error)?
            .filter(|plan| plan.workspace_id == *workspace_id)
            .ok_or_else(|| Error::not_found("plan does not exist"))?;
        Ok(plan)
    }
}

#[cfg(test)]
#[path = "plan_service_tests.rs"]
mod tests;
