//! Expense ledger endpoints.

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::PlanTypeTotal;
use crate::domain::{
    Error, Expense, ExpenseDraft, ExpenseFilter, ExpenseId, ExpensePatch, ExpenseSummary,
    PlanType, UserId, WorkspaceId,
};

use super::{authenticate, AppState};

/// Expense creation payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    /// Category key; missing or empty falls back to `"other"`.
    pub plan_type: Option<String>,
    /// Spent amount; must be strictly positive.
    pub amount: f64,
    /// Optional note, at most 500 characters.
    pub note: Option<String>,
    /// When the expense occurred; defaults to now.
    pub date: Option<DateTime<Utc>>,
}

/// Expense update payload; absent fields stay unchanged, an empty note
/// clears it.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    /// Replacement category key.
    pub plan_type: Option<String>,
    /// Replacement amount.
    pub amount: Option<f64>,
    /// Replacement note.
    pub note: Option<String>,
    /// Replacement occurrence date.
    pub date: Option<DateTime<Utc>>,
}

/// Listing filter and paging, all optional.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseListQuery {
    /// Exact-match category restriction.
    pub plan_type: Option<String>,
    /// Inclusive lower bound on the expense date (RFC 3339).
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the expense date (RFC 3339).
    pub end_date: Option<DateTime<Utc>>,
    /// Page size, clamped into 1..=100 (default 50).
    pub limit: Option<u32>,
    /// Rows to skip (default 0).
    pub offset: Option<u64>,
}

/// Expense projection.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    /// Expense identifier.
    pub id: ExpenseId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Category the amount counts against.
    pub plan_type: String,
    /// Spent amount.
    pub amount: f64,
    /// Optional note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// When the expense occurred.
    pub date: DateTime<Utc>,
    /// Recording member.
    pub created_by: UserId,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            workspace_id: expense.workspace_id,
            plan_type: expense.plan_type.as_str().to_owned(),
            amount: expense.amount,
            note: expense.note,
            date: expense.date,
            created_by: expense.created_by,
            created_at: expense.created_at,
            updated_at: expense.updated_at,
        }
    }
}

/// One page of expenses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePageResponse {
    /// Rows within the requested window.
    pub items: Vec<ExpenseResponse>,
    /// Total rows matching the filter.
    pub total: u64,
    /// Effective page size.
    pub limit: u32,
    /// Rows skipped.
    pub offset: u64,
    /// Whether rows exist beyond this page.
    pub has_more: bool,
}

impl From<Page<Expense>> for ExpensePageResponse {
    fn from(page: Page<Expense>) -> Self {
        let page = page.map(ExpenseResponse::from);
        Self {
            items: page.items,
            total: page.total,
            limit: page.limit,
            offset: page.offset,
            has_more: page.has_more,
        }
    }
}

/// Per-category aggregate row.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanTypeTotalResponse {
    /// Category key.
    pub plan_type: String,
    /// Sum of amounts in the category.
    pub total: f64,
    /// Number of expenses in the category.
    pub count: u64,
}

impl From<PlanTypeTotal> for PlanTypeTotalResponse {
    fn from(total: PlanTypeTotal) -> Self {
        Self {
            plan_type: total.plan_type.as_str().to_owned(),
            total: total.total,
            count: total.count,
        }
    }
}

/// Workspace-level aggregate totals.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummaryResponse {
    /// Sum of every expense amount.
    pub total_amount: f64,
    /// Per-category sums and counts, descending by sum.
    pub by_plan_type: Vec<PlanTypeTotalResponse>,
}

impl From<ExpenseSummary> for ExpenseSummaryResponse {
    fn from(summary: ExpenseSummary) -> Self {
        Self {
            total_amount: summary.total_amount,
            by_plan_type: summary.by_plan_type.into_iter().map(Into::into).collect(),
        }
    }
}

fn parse_filter(query: &ExpenseListQuery) -> Result<ExpenseFilter, Error> {
    let plan_type = match query.plan_type.as_deref() {
        None => None,
        Some(raw) if raw.trim().is_empty() => None,
        Some(raw) => Some(PlanType::parse(raw).map_err(|err| {
            Error::validation(err.to_string()).with_field_error("planType", err.to_string())
        })?),
    };
    Ok(ExpenseFilter {
        plan_type,
        start_date: query.start_date,
        end_date: query.end_date,
    })
}

/// Record an expense.
#[utoipa::path(
    post,
    path = "/api/v1/workspaces/{id}/expenses",
    params(("id" = Uuid, Path, description = "Workspace id")),
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded", body = ExpenseResponse),
        (status = 400, description = "Invalid amount, note, or category", body = Error),
        (status = 403, description = "Not a participant", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "createExpense"
)]
#[post("/workspaces/{id}/expenses")]
pub async fn create_expense(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<CreateExpenseRequest>,
) -> Result<HttpResponse, Error> {
    let identity = authenticate(&state, &req)?;
    let workspace_id = WorkspaceId::from(path.into_inner());
    let body = body.into_inner();
    let expense = state
        .expenses
        .create(
            &identity,
            &workspace_id,
            ExpenseDraft {
                plan_type: body.plan_type,
                amount: body.amount,
                note: body.note,
                date: body.date,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(ExpenseResponse::from(expense)))
}

/// Filtered, paginated expense listing.
#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/expenses",
    params(("id" = Uuid, Path, description = "Workspace id"), ExpenseListQuery),
    responses(
        (status = 200, description = "One page of expenses", body = ExpensePageResponse),
        (status = 403, description = "Not a participant", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "listExpenses"
)]
#[get("/workspaces/{id}/expenses")]
pub async fn list_expenses(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    query: web::Query<ExpenseListQuery>,
) -> Result<web::Json<ExpensePageResponse>, Error> {
    let identity = authenticate(&state, &req)?;
    let workspace_id = WorkspaceId::from(path.into_inner());
    let filter = parse_filter(&query)?;
    let page = state
        .expenses
        .list(
            &identity,
            &workspace_id,
            filter,
            PageRequest::new(query.limit, query.offset),
        )
        .await?;
    Ok(web::Json(page.into()))
}

/// Aggregate totals for the workspace.
#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/expenses/summary",
    params(("id" = Uuid, Path, description = "Workspace id")),
    responses(
        (status = 200, description = "Workspace totals", body = ExpenseSummaryResponse),
        (status = 403, description = "Not a participant", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "expenseSummary"
)]
#[get("/workspaces/{id}/expenses/summary")]
pub async fn expense_summary(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<web::Json<ExpenseSummaryResponse>, Error> {
    let identity = authenticate(&state, &req)?;
    let workspace_id = WorkspaceId::from(path.into_inner());
    let summary = state.expenses.summary(&identity, &workspace_id).await?;
    Ok(web::Json(summary.into()))
}

/// Update an expense.
#[utoipa::path(
    put,
    path = "/api/v1/workspaces/{id}/expenses/{expenseId}",
    params(
        ("id" = Uuid, Path, description = "Workspace id"),
        ("expenseId" = Uuid, Path, description = "Expense id")
    ),
    request_body = UpdateExpenseRequest,
    responses(
        (status = 200, description = "Updated expense", body = ExpenseResponse),
        (status = 400, description = "Invalid amount, note, or category", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "No such expense in this workspace", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "updateExpense"
)]
#[put("/workspaces/{id}/expenses/{expenseId}")]
pub async fn update_expense(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<UpdateExpenseRequest>,
) -> Result<web::Json<ExpenseResponse>, Error> {
    let identity = authenticate(&state, &req)?;
    let (workspace_id, expense_id) = path.into_inner();
    let body = body.into_inner();
    let expense = state
        .expenses
        .update(
            &identity,
            &WorkspaceId::from(workspace_id),
            &ExpenseId::from(expense_id),
            ExpensePatch {
                plan_type: body.plan_type,
                amount: body.amount,
                note: body.note,
                date: body.date,
            },
        )
        .await?;
    Ok(web::Json(expense.into()))
}

/// Delete an expense; creator or owner only.
#[utoipa::path(
    delete,
    path = "/api/v1/workspaces/{id}/expenses/{expenseId}",
    params(
        ("id" = Uuid, Path, description = "Workspace id"),
        ("expenseId" = Uuid, Path, description = "Expense id")
    ),
    responses(
        (status = 204, description = "Expense deleted"),
        (status = 403, description = "Neither creator nor owner", body = Error),
        (status = 404, description = "No such expense in this workspace", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "deleteExpense"
)]
#[delete("/workspaces/{id}/expenses/{expenseId}")]
pub async fn delete_expense(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, Error> {
    let identity = authenticate(&state, &req)?;
    let (workspace_id, expense_id) = path.into_inner();
    state
        .expenses
        .delete(
            &identity,
            &WorkspaceId::from(workspace_id),
            &ExpenseId::from(expense_id),
        )
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
