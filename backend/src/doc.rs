//! OpenAPI document aggregation.

use utoipa::OpenApi;

use crate::api;
use crate::domain;

/// Public OpenAPI surface served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fundline API",
        description = "Multi-tenant research-fund tracking: workspaces, budget plans, expenses, and derived analytics."
    ),
    paths(
        api::auth::register,
        api::auth::login,
        api::auth::me,
        api::workspaces::create_workspace,
        api::workspaces::list_workspaces,
        api::workspaces::get_workspace,
        api::workspaces::update_workspace,
        api::workspaces::delete_workspace,
        api::members::list_members,
        api::members::invite_member,
        api::members::remove_member,
        api::plans::create_plan,
        api::plans::list_plans,
        api::plans::list_plan_types,
        api::plans::update_plan,
        api::plans::delete_plan,
        api::expenses::create_expense,
        api::expenses::list_expenses,
        api::expenses::expense_summary,
        api::expenses::update_expense,
        api::expenses::delete_expense,
        api::analytics::workspace_analytics,
        api::health::live,
        api::health::ready,
    ),
    components(schemas(
        domain::Error,
        domain::ErrorKind,
        domain::Role,
        domain::AnalyticsSnapshot,
        domain::BudgetSummary,
        domain::CategoryComparison,
        domain::CategoryStatus,
        domain::MonthlyTrendEntry,
        domain::Alert,
        domain::AlertSeverity,
        domain::AnalyticsTotals,
        api::auth::RegisterRequest,
        api::auth::LoginRequest,
        api::auth::UserProfileResponse,
        api::auth::AuthResponse,
        api::workspaces::CreateWorkspaceRequest,
        api::workspaces::UpdateWorkspaceRequest,
        api::workspaces::WorkspaceResponse,
        api::workspaces::WorkspaceDetailResponse,
        api::members::InviteMemberRequest,
        api::members::MemberResponse,
        api::plans::CreatePlanRequest,
        api::plans::UpdatePlanRequest,
        api::plans::PlanResponse,
        api::plans::PlanListResponse,
        api::expenses::CreateExpenseRequest,
        api::expenses::UpdateExpenseRequest,
        api::expenses::ExpenseResponse,
        api::expenses::ExpensePageResponse,
        api::expenses::PlanTypeTotalResponse,
        api::expenses::ExpenseSummaryResponse,
    )),
    tags(
        (name = "auth", description = "Registration and sign-in"),
        (name = "workspaces", description = "Workspace lifecycle"),
        (name = "members", description = "Workspace membership"),
        (name = "plans", description = "Budget plans"),
        (name = "expenses", description = "Expense ledger"),
        (name = "analytics", description = "Derived budget analytics"),
        (name = "health", description = "Probes"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn document_lists_every_operation_group() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).expect("document serialises");
        let paths = json["paths"].as_object().expect("paths object");
        assert!(paths.contains_key("/api/v1/auth/register"));
        assert!(paths.contains_key("/api/v1/workspaces/{id}/analytics"));
        assert!(paths.contains_key("/health/ready"));
    }
}
