//! In-memory document store.
//!
//! One `RwLock` guards every collection, so each mutation observes a
//! consistent view of all records: the uniqueness checks (email, workspace
//! name per owner, plan type per workspace, membership) and the expense
//! plan-type referential check run atomically with their write. This is the
//! storage-level guarantee the ports demand; services never re-implement
//! these checks as separate read-then-write sequences.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    ExpenseRepository, ExpenseStoreError, PlanRepository, PlanStoreError, PlanTypeTotal,
    UserRepository, UserStoreError, WorkspaceRepository, WorkspaceStoreError,
};
use crate::domain::{
    EmailAddress, Expense, ExpenseFilter, ExpenseId, Plan, PlanId, PlanType, User, UserId,
    Workspace, WorkspaceId,
};

const POISONED: &str = "store lock poisoned";

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<UserId, User>,
    workspaces: HashMap<WorkspaceId, Workspace>,
    plans: HashMap<PlanId, Plan>,
    expenses: HashMap<ExpenseId, Expense>,
}

impl Collections {
    fn plan_type_exists(&self, workspace_id: &WorkspaceId, plan_type: &PlanType) -> bool {
        self.plans
            .values()
            .any(|plan| plan.workspace_id == *workspace_id && plan.plan_type == *plan_type)
    }
}

/// Process-local document store backing every repository port.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, &'static str> {
        self.inner.read().map_err(|_| POISONED)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, &'static str> {
        self.inner.write().map_err(|_| POISONED)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserStoreError> {
        let mut guard = self.write().map_err(UserStoreError::connection)?;
        if guard.users.values().any(|other| other.email == user.email) {
            return Err(UserStoreError::duplicate_email(user.email.as_str()));
        }
        guard.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError> {
        let guard = self.read().map_err(UserStoreError::connection)?;
        Ok(guard.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserStoreError> {
        let guard = self.read().map_err(UserStoreError::connection)?;
        Ok(guard.users.values().find(|user| user.email == *email).cloned())
    }

    async fn add_workspace(
        &self,
        user_id: &UserId,
        workspace_id: &WorkspaceId,
    ) -> Result<(), UserStoreError> {
        let mut guard = self.write().map_err(UserStoreError::connection)?;
        let user = guard
            .users
            .get_mut(user_id)
            .ok_or_else(|| UserStoreError::query(format!("user {user_id} not found")))?;
        if !user.workspace_ids.contains(workspace_id) {
            user.workspace_ids.push(*workspace_id);
        }
        Ok(())
    }

    async fn remove_workspace(
        &self,
        user_id: &UserId,
        workspace_id: &WorkspaceId,
    ) -> Result<(), UserStoreError> {
        let mut guard = self.write().map_err(UserStoreError::connection)?;
        let user = guard
            .users
            .get_mut(user_id)
            .ok_or_else(|| UserStoreError::query(format!("user {user_id} not found")))?;
        user.workspace_ids.retain(|id| id != workspace_id);
        Ok(())
    }

    async fn remove_workspace_from_all(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<u64, UserStoreError> {
        let mut guard = self.write().map_err(UserStoreError::connection)?;
        let mut touched = 0;
        for user in guard.users.values_mut() {
            let before = user.workspace_ids.len();
            user.workspace_ids.retain(|id| id != workspace_id);
            if user.workspace_ids.len() != before {
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[async_trait]
impl WorkspaceRepository for MemoryStore {
    async fn insert(&self, workspace: &Workspace) -> Result<(), WorkspaceStoreError> {
        let mut guard = self.write().map_err(WorkspaceStoreError::connection)?;
        let clash = guard.workspaces.values().any(|other| {
            other.owner_id == workspace.owner_id && other.name == workspace.name
        });
        if clash {
            return Err(WorkspaceStoreError::duplicate_name(workspace.name.clone()));
        }
        guard.workspaces.insert(workspace.id, workspace.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &WorkspaceId,
    ) -> Result<Option<Workspace>, WorkspaceStoreError> {
        let guard = self.read().map_err(WorkspaceStoreError::connection)?;
        Ok(guard.workspaces.get(id).cloned())
    }

    async fn find_by_ids(
        &self,
        ids: &[WorkspaceId],
    ) -> Result<Vec<Workspace>, WorkspaceStoreError> {
        let guard = self.read().map_err(WorkspaceStoreError::connection)?;
        Ok(ids
            .iter()
            .filter_map(|id| guard.workspaces.get(id).cloned())
            .collect())
    }

    async fn update_profile(
        &self,
        id: &WorkspaceId,
        name: &str,
        description: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, WorkspaceStoreError> {
        let mut guard = self.write().map_err(WorkspaceStoreError::connection)?;
        let Some(owner_id) = guard.workspaces.get(id).map(|ws| ws.owner_id) else {
            return Ok(false);
        };
        let clash = guard.workspaces.values().any(|other| {
            other.id != *id && other.owner_id == owner_id && other.name == name
        });
        if clash {
            return Err(WorkspaceStoreError::duplicate_name(name));
        }
        if let Some(workspace) = guard.workspaces.get_mut(id) {
            workspace.name = name.to_owned();
            workspace.description = description.to_owned();
            workspace.updated_at = updated_at;
        }
        Ok(true)
    }

    async fn add_member(
        &self,
        id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<(), WorkspaceStoreError> {
        let mut guard = self.write().map_err(WorkspaceStoreError::connection)?;
        let workspace = guard
            .workspaces
            .get_mut(id)
            .ok_or_else(|| WorkspaceStoreError::query(format!("workspace {id} not found")))?;
        if workspace.owner_id == *user_id || workspace.member_ids.contains(user_id) {
            return Err(WorkspaceStoreError::duplicate_member(user_id.to_string()));
        }
        workspace.member_ids.push(*user_id);
        workspace.updated_at = Utc::now();
        Ok(())
    }

    async fn remove_member(
        &self,
        id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<bool, WorkspaceStoreError> {
        let mut guard = self.write().map_err(WorkspaceStoreError::connection)?;
        let workspace = guard
            .workspaces
            .get_mut(id)
            .ok_or_else(|| WorkspaceStoreError::query(format!("workspace {id} not found")))?;
        let before = workspace.member_ids.len();
        workspace.member_ids.retain(|member| member != user_id);
        let removed = workspace.member_ids.len() != before;
        if removed {
            workspace.updated_at = Utc::now();
        }
        Ok(removed)
    }

    async fn delete(&self, id: &WorkspaceId) -> Result<bool, WorkspaceStoreError> {
        let mut guard = self.write().map_err(WorkspaceStoreError::connection)?;
        Ok(guard.workspaces.remove(id).is_some())
    }
}

#[async_trait]
impl PlanRepository for MemoryStore {
    async fn insert(&self, plan: &Plan) -> Result<(), PlanStoreError> {
        let mut guard = self.write().map_err(PlanStoreError::connection)?;
        if guard.plan_type_exists(&plan.workspace_id, &plan.plan_type) {
            return Err(PlanStoreError::duplicate_type(plan.plan_type.as_str()));
        }
        guard.plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, PlanStoreError> {
        let guard = self.read().map_err(PlanStoreError::connection)?;
        Ok(guard.plans.get(id).cloned())
    }

    async fn find_by_type(
        &self,
        workspace_id: &WorkspaceId,
        plan_type: &PlanType,
    ) -> Result<Option<Plan>, PlanStoreError> {
        let guard = self.read().map_err(PlanStoreError::connection)?;
        Ok(guard
            .plans
            .values()
            .find(|plan| plan.workspace_id == *workspace_id && plan.plan_type == *plan_type)
            .cloned())
    }

    async fn update(&self, plan: &Plan) -> Result<bool, PlanStoreError> {
        let mut guard = self.write().map_err(PlanStoreError::connection)?;
        if !guard.plans.contains_key(&plan.id) {
            return Ok(false);
        }
        let clash = guard.plans.values().any(|other| {
            other.id != plan.id
                && other.workspace_id == plan.workspace_id
                && other.plan_type == plan.plan_type
        });
        if clash {
            return Err(PlanStoreError::duplicate_type(plan.plan_type.as_str()));
        }
        guard.plans.insert(plan.id, plan.clone());
        Ok(true)
    }

    async fn delete(&self, id: &PlanId) -> Result<bool, PlanStoreError> {
        let mut guard = self.write().map_err(PlanStoreError::connection)?;
        Ok(guard.plans.remove(id).is_some())
    }

    async fn list_by_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<Plan>, PlanStoreError> {
        let guard = self.read().map_err(PlanStoreError::connection)?;
        let mut plans: Vec<Plan> = guard
            .plans
            .values()
            .filter(|plan| plan.workspace_id == *workspace_id)
            .cloned()
            .collect();
        plans.sort_by(|a, b| {
            a.plan_type
                .cmp(&b.plan_type)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(plans)
    }

    async fn delete_by_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<u64, PlanStoreError> {
        let mut guard = self.write().map_err(PlanStoreError::connection)?;
        let before = guard.plans.len();
        guard.plans.retain(|_, plan| plan.workspace_id != *workspace_id);
        Ok((before - guard.plans.len()) as u64)
    }
}

#[async_trait]
impl ExpenseRepository for MemoryStore {
    async fn insert(&self, expense: &Expense) -> Result<(), ExpenseStoreError> {
        let mut guard = self.write().map_err(ExpenseStoreError::connection)?;
        if !expense.plan_type.is_other()
            && !guard.plan_type_exists(&expense.workspace_id, &expense.plan_type)
        {
            return Err(ExpenseStoreError::unknown_plan_type(
                expense.plan_type.as_str(),
            ));
        }
        guard.expenses.insert(expense.id, expense.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ExpenseId) -> Result<Option<Expense>, ExpenseStoreError> {
        let guard = self.read().map_err(ExpenseStoreError::connection)?;
        Ok(guard.expenses.get(id).cloned())
    }

    async fn update(&self, expense: &Expense) -> Result<bool, ExpenseStoreError> {
        let mut guard = self.write().map_err(ExpenseStoreError::connection)?;
        if !guard.expenses.contains_key(&expense.id) {
            return Ok(false);
        }
        if !expense.plan_type.is_other()
            && !guard.plan_type_exists(&expense.workspace_id, &expense.plan_type)
        {
            return Err(ExpenseStoreError::unknown_plan_type(
                expense.plan_type.as_str(),
            ));
        }
        guard.expenses.insert(expense.id, expense.clone());
        Ok(true)
    }

    async fn delete(&self, id: &ExpenseId) -> Result<bool, ExpenseStoreError> {
        let mut guard = self.write().map_err(ExpenseStoreError::connection)?;
        Ok(guard.expenses.remove(id).is_some())
    }

    async fn list(
        &self,
        workspace_id: &WorkspaceId,
        filter: &ExpenseFilter,
        page: PageRequest,
    ) -> Result<Page<Expense>, ExpenseStoreError> {
        let guard = self.read().map_err(ExpenseStoreError::connection)?;
        let mut matching: Vec<Expense> = guard
            .expenses
            .values()
            .filter(|expense| expense.workspace_id == *workspace_id && filter.matches(expense))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.created_at.cmp(&a.created_at))
        });

        let total = matching.len();
        let items = matching
            .get(page.window(total))
            .map(<[Expense]>::to_vec)
            .unwrap_or_default();
        Ok(Page::new(items, total as u64, page))
    }

    async fn list_all(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<Expense>, ExpenseStoreError> {
        let guard = self.read().map_err(ExpenseStoreError::connection)?;
        Ok(guard
            .expenses
            .values()
            .filter(|expense| expense.workspace_id == *workspace_id)
            .cloned()
            .collect())
    }

    async fn total_amount(&self, workspace_id: &WorkspaceId) -> Result<f64, ExpenseStoreError> {
        let guard = self.read().map_err(ExpenseStoreError::connection)?;
        Ok(guard
            .expenses
            .values()
            .filter(|expense| expense.workspace_id == *workspace_id)
            .map(|expense| expense.amount)
            .sum())
    }

    async fn totals_by_plan_type(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<PlanTypeTotal>, ExpenseStoreError> {
        let guard = self.read().map_err(ExpenseStoreError::connection)?;
        let mut grouped: HashMap<PlanType, (f64, u64)> = HashMap::new();
        for expense in guard
            .expenses
            .values()
            .filter(|expense| expense.workspace_id == *workspace_id)
        {
            let entry = grouped.entry(expense.plan_type.clone()).or_insert((0.0, 0));
            entry.0 += expense.amount;
            entry.1 += 1;
        }

        let mut totals: Vec<PlanTypeTotal> = grouped
            .into_iter()
            .map(|(plan_type, (total, count))| PlanTypeTotal {
                plan_type,
                total,
                count,
            })
            .collect();
        totals.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.plan_type.cmp(&b.plan_type))
        });
        Ok(totals)
    }

    async fn delete_by_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<u64, ExpenseStoreError> {
        let mut guard = self.write().map_err(ExpenseStoreError::connection)?;
        let before = guard.expenses.len();
        guard
            .expenses
            .retain(|_, expense| expense.workspace_id != *workspace_id);
        Ok((before - guard.expenses.len()) as u64)
    }
}
