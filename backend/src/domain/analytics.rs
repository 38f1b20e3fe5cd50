//! Budget analytics: the derived snapshot for one workspace.
//!
//! [`compute_snapshot`] is a pure function over the full plan and expense
//! sets; given identical inputs it produces an identical snapshot. Access is
//! checked once at the workspace level by [`AnalyticsService`] before the
//! computation runs; nothing here is persisted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::access::AccessGuard;
use crate::domain::ports::{ExpenseRepository, PlanRepository, WorkspaceRepository};
use crate::domain::{Error, Expense, Identity, Plan, WorkspaceId};

/// Real usage fraction (percent) above which a caution alert fires.
const USAGE_WARNING_THRESHOLD: f64 = 80.0;

/// Number of calendar months covered by the trend, current month included.
const TREND_MONTHS: u32 = 6;

/// Workspace-level spending summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    /// Sum of all planned amounts.
    pub total_planned: f64,
    /// Sum of all expense amounts.
    pub total_spent: f64,
    /// `total_planned - total_spent`; goes negative when overspent.
    pub remaining: f64,
    /// Spent-over-planned percentage capped at 100 for display. The uncapped
    /// ratio drives `over_spent` and the usage alerts.
    pub usage_percentage: f64,
    /// Whether spending exceeds the total plan.
    pub over_spent: bool,
}

/// Classification of one budget category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    /// Spending exceeds the category's plan.
    Over,
    /// A planned category with no spending at all.
    Unused,
    /// Anything else, including expense-only categories.
    Normal,
}

/// Planned-versus-spent comparison for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryComparison {
    /// Category key (a plan type, or `"other"`).
    pub category: String,
    /// Planned amount; zero for expense-only categories.
    pub planned: f64,
    /// Spent amount.
    pub spent: f64,
    /// Spent-over-planned percentage; zero when nothing is planned.
    pub percentage: f64,
    /// Status classification.
    pub status: CategoryStatus,
}

/// One month of the spending trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendEntry {
    /// Calendar month label, e.g. `"Mar 2026"`.
    pub label: String,
    /// Sum of expenses dated within the month.
    pub total_expenses: f64,
}

/// Alert severity in increasing order of urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Informational; no action needed.
    Info,
    /// Needs attention.
    Warning,
    /// Budget has been breached.
    Danger,
}

/// Rule-generated alert for the workspace dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// How urgent the alert is.
    pub severity: AlertSeverity,
    /// Human-readable alert text.
    pub message: String,
}

/// Record counts derived alongside the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsTotals {
    /// Number of plans.
    pub total_plans: u64,
    /// Number of expenses.
    pub total_expenses: u64,
    /// Number of distinct categories in the comparison.
    pub categories_count: u64,
}

/// The full derived analytics result for one workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    /// Workspace-level totals.
    pub summary: BudgetSummary,
    /// Per-category comparison: planned categories first, then categories
    /// discovered from expenses alone.
    pub category_comparison: Vec<CategoryComparison>,
    /// Exactly six entries, oldest month first, current month last.
    pub monthly_trend: Vec<MonthlyTrendEntry>,
    /// Rule-based alerts in generation order.
    pub alerts: Vec<Alert>,
    /// Record counts.
    pub totals: AnalyticsTotals,
}

/// Start of the given calendar month as a UTC instant.
fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    let date = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN);
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// The calendar month `back` months before `(year, month)`.
fn shift_month(year: i32, month: u32, back: u32) -> (i32, u32) {
    let months0 = year * 12 + month as i32 - 1 - back as i32;
    (months0.div_euclid(12), (months0.rem_euclid(12) + 1) as u32)
}

fn build_summary(plans: &[Plan], expenses: &[Expense]) -> (BudgetSummary, f64) {
    let total_planned: f64 = plans.iter().map(|plan| plan.planned_amount).sum();
    let total_spent: f64 = expenses.iter().map(|expense| expense.amount).sum();
    let real_usage = if total_planned > 0.0 {
        total_spent / total_planned * 100.0
    } else {
        0.0
    };

    let summary = BudgetSummary {
        total_planned,
        total_spent,
        remaining: total_planned - total_spent,
        usage_percentage: real_usage.min(100.0),
        over_spent: total_spent > total_planned,
    };
    (summary, real_usage)
}

fn build_comparison(plans: &[Plan], expenses: &[Expense]) -> Vec<CategoryComparison> {
    // Discovery order: plans first, then expense-only categories as they
    // appear. The index map keeps the fold O(1) per expense.
    let mut comparison: Vec<(String, f64, f64, bool)> = Vec::with_capacity(plans.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(plans.len());

    for plan in plans {
        let key = plan.plan_type.as_str().to_owned();
        index.insert(key.clone(), comparison.len());
        comparison.push((key, plan.planned_amount, 0.0, true));
    }

    for expense in expenses {
        let key = expense.plan_type.as_str();
        match index.get(key) {
            Some(&at) => comparison[at].2 += expense.amount,
            None => {
                index.insert(key.to_owned(), comparison.len());
                comparison.push((key.to_owned(), 0.0, expense.amount, false));
            }
        }
    }

    comparison
        .into_iter()
        .map(|(category, planned, spent, plan_sourced)| {
            let percentage = if planned > 0.0 {
                spent / planned * 100.0
            } else {
                0.0
            };
            // Expense-only categories are never "over": there is no plan to
            // breach, only untracked spending.
            let status = if plan_sourced && spent > planned {
                CategoryStatus::Over
            } else if plan_sourced && spent == 0.0 {
                CategoryStatus::Unused
            } else {
                CategoryStatus::Normal
            };
            CategoryComparison {
                category,
                planned,
                spent,
                percentage,
                status,
            }
        })
        .collect()
}

fn build_trend(expenses: &[Expense], now: DateTime<Utc>) -> Vec<MonthlyTrendEntry> {
    let (year, month) = (now.year(), now.month());
    (0..TREND_MONTHS)
        .rev()
        .map(|back| {
            let (y, m) = shift_month(year, month, back);
            let start = month_start(y, m);
            let (next_y, next_m) = if m == 12 { (y + 1, 1) } else { (y, m + 1) };
            let end = month_start(next_y, next_m);

            let total_expenses = expenses
                .iter()
                .filter(|expense| expense.date >= start && expense.date < end)
                .map(|expense| expense.amount)
                .sum();
            let label = NaiveDate::from_ymd_opt(y, m, 1)
                .unwrap_or(NaiveDate::MIN)
                .format("%b %Y")
                .to_string();
            MonthlyTrendEntry {
                label,
                total_expenses,
            }
        })
        .collect()
}

fn build_alerts(comparison: &[CategoryComparison], real_usage: f64) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for entry in comparison {
        if entry.status == CategoryStatus::Over {
            alerts.push(Alert {
                severity: AlertSeverity::Warning,
                message: format!(
                    "Category '{}' is over budget by {:.2}",
                    entry.category,
                    entry.spent - entry.planned
                ),
            });
        }
    }

    let unused: Vec<&str> = comparison
        .iter()
        .filter(|entry| entry.status == CategoryStatus::Unused)
        .map(|entry| entry.category.as_str())
        .collect();
    if !unused.is_empty() {
        alerts.push(Alert {
            severity: AlertSeverity::Info,
            message: format!("Unused budget categories: {}", unused.join(", ")),
        });
    }

    if real_usage > 100.0 {
        alerts.push(Alert {
            severity: AlertSeverity::Danger,
            message: "Spending has exceeded the total planned budget".to_owned(),
        });
    } else if real_usage > USAGE_WARNING_THRESHOLD {
        alerts.push(Alert {
            severity: AlertSeverity::Warning,
            message: "Spending has passed 80% of the total planned budget".to_owned(),
        });
    }

    alerts
}

/// Reduce the full plan and expense sets of one workspace into a snapshot.
///
/// Deterministic: the same inputs and `now` always produce the same value.
///
/// # Examples
/// ```
/// use backend::domain::compute_snapshot;
/// use chrono::Utc;
///
/// let snapshot = compute_snapshot(&[], &[], Utc::now());
/// assert_eq!(snapshot.summary.total_planned, 0.0);
/// assert_eq!(snapshot.monthly_trend.len(), 6);
/// ```
pub fn compute_snapshot(
    plans: &[Plan],
    expenses: &[Expense],
    now: DateTime<Utc>,
) -> AnalyticsSnapshot {
    let (summary, real_usage) = build_summary(plans, expenses);
    let category_comparison = build_comparison(plans, expenses);
    let monthly_trend = build_trend(expenses, now);
    let alerts = build_alerts(&category_comparison, real_usage);
    let totals = AnalyticsTotals {
        total_plans: plans.len() as u64,
        total_expenses: expenses.len() as u64,
        categories_count: category_comparison.len() as u64,
    };

    AnalyticsSnapshot {
        summary,
        category_comparison,
        monthly_trend,
        alerts,
        totals,
    }
}

/// Analytics service: one workspace-level access check, then the pure
/// computation over the full record sets.
#[derive(Clone)]
pub struct AnalyticsService<W, P, E> {
    guard: AccessGuard<W>,
    plans: Arc<P>,
    expenses: Arc<E>,
}

impl<W, P, E> AnalyticsService<W, P, E> {
    /// Create a new service with the given collaborators.
    pub fn new(workspaces: Arc<W>, plans: Arc<P>, expenses: Arc<E>) -> Self {
        Self {
            guard: AccessGuard::new(workspaces),
            plans,
            expenses,
        }
    }
}

impl<W, P, E> AnalyticsService<W, P, E>
where
    W: WorkspaceRepository,
    P: PlanRepository,
    E: ExpenseRepository,
{
    /// Compute the current snapshot for a workspace; any participant.
    pub async fn snapshot(
        &self,
        identity: &Identity,
        workspace_id: &WorkspaceId,
    ) -> Result<AnalyticsSnapshot, Error> {
        self.guard.require_participant(workspace_id, identity).await?;

        let plans = self
            .plans
            .list_by_workspace(workspace_id)
            .await
            .map_err(|err| Error::internal(format!("plan store failure: {err}")))?;
        let expenses = self
            .expenses
            .list_all(workspace_id)
            .await
            .map_err(|err| Error::internal(format!("expense store failure: {err}")))?;

        Ok(compute_snapshot(&plans, &expenses, Utc::now()))
    }
}

#[cfg(test)]
#[path = "analytics_tests.rs"]
mod tests;
