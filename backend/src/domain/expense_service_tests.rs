//! Unit tests for the expense ledger service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use pagination::PageRequest;

use crate::domain::ports::{UserRepository, WorkspaceRepository};
use crate::domain::{
    EmailAddress, ErrorKind, ExpenseFilter, Identity, PlanDraft, PlanService, PlanType, User,
    Workspace, WorkspaceDraft,
};
use crate::store::MemoryStore;

use super::{ExpenseDraft, ExpensePatch, ExpenseService};

async fn register(store: &Arc<MemoryStore>, email: &str) -> Identity {
    let user = User::new(
        EmailAddress::parse(email).expect("valid email"),
        "$2b$12$hash".to_owned(),
        Utc::now(),
    );
    UserRepository::insert(store.as_ref(), &user)
        .await
        .expect("user inserted");
    Identity {
        user_id: user.id,
        email: user.email,
    }
}

struct Fixture {
    store: Arc<MemoryStore>,
    expenses: ExpenseService<MemoryStore, MemoryStore>,
    owner: Identity,
    member_a: Identity,
    member_b: Identity,
    ws: Workspace,
}

async fn setup() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let expenses = ExpenseService::new(Arc::clone(&store), Arc::clone(&store));
    let plans = PlanService::new(Arc::clone(&store), Arc::clone(&store));

    let owner = register(&store, "pi@lab.edu").await;
    let member_a = register(&store, "a@lab.edu").await;
    let member_b = register(&store, "b@lab.edu").await;

    let draft = WorkspaceDraft::new("Grant 42", "").expect("valid draft");
    let mut ws = Workspace::new(draft, owner.user_id, Utc::now());
    ws.member_ids.push(member_a.user_id);
    ws.member_ids.push(member_b.user_id);
    WorkspaceRepository::insert(store.as_ref(), &ws)
        .await
        .expect("workspace inserted");

    plans
        .create(
            &owner,
            &ws.id,
            PlanDraft {
                plan_type: "travel".to_owned(),
                planned_amount: 1000.0,
            },
        )
        .await
        .expect("plan created");

    Fixture {
        store,
        expenses,
        owner,
        member_a,
        member_b,
        ws,
    }
}

fn travel_expense(amount: f64) -> ExpenseDraft {
    ExpenseDraft {
        plan_type: Some("travel".to_owned()),
        amount,
        ..ExpenseDraft::default()
    }
}

#[tokio::test]
async fn create_defaults_category_date_and_creator() {
    let fx = setup().await;

    let before = Utc::now();
    let created = fx
        .expenses
        .create(
            &fx.member_a,
            &fx.ws.id,
            ExpenseDraft {
                amount: 12.5,
                note: Some("taxi".to_owned()),
                ..ExpenseDraft::default()
            },
        )
        .await
        .expect("create succeeds");

    assert!(created.plan_type.is_other());
    assert_eq!(created.created_by, fx.member_a.user_id);
    assert_eq!(created.note.as_deref(), Some("taxi"));
    assert!(created.date >= before);
}

#[tokio::test]
async fn create_rejects_unknown_plan_type_with_named_category() {
    let fx = setup().await;

    let err = fx
        .expenses
        .create(
            &fx.member_a,
            &fx.ws.id,
            ExpenseDraft {
                plan_type: Some("sequencing".to_owned()),
                amount: 10.0,
                ..ExpenseDraft::default()
            },
        )
        .await
        .expect_err("unknown type rejected");
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.message.contains("sequencing"));
    assert!(err
        .field_errors
        .expect("field errors")
        .contains_key("planType"));
}

#[tokio::test]
async fn create_rejects_non_positive_amounts() {
    let fx = setup().await;

    let err = fx
        .expenses
        .create(&fx.member_a, &fx.ws.id, travel_expense(0.0))
        .await
        .expect_err("zero amount rejected");
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err
        .field_errors
        .expect("field errors")
        .contains_key("amount"));
}

#[tokio::test]
async fn update_applies_patch_and_rechecks_category() {
    let fx = setup().await;

    let created = fx
        .expenses
        .create(&fx.member_a, &fx.ws.id, travel_expense(40.0))
        .await
        .expect("create");

    // Another member may edit.
    let updated = fx
        .expenses
        .update(
            &fx.member_b,
            &fx.ws.id,
            &created.id,
            ExpensePatch {
                amount: Some(55.0),
                note: Some("conference shuttle".to_owned()),
                ..ExpensePatch::default()
            },
        )
        .await
        .expect("update succeeds");
    assert_eq!(updated.amount, 55.0);
    assert_eq!(updated.note.as_deref(), Some("conference shuttle"));
    assert_eq!(updated.plan_type.as_str(), "travel");

    let err = fx
        .expenses
        .update(
            &fx.member_b,
            &fx.ws.id,
            &created.id,
            ExpensePatch {
                plan_type: Some("catering".to_owned()),
                ..ExpensePatch::default()
            },
        )
        .await
        .expect_err("unknown category rejected");
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn update_can_clear_the_note_with_an_empty_string() {
    let fx = setup().await;

    let created = fx
        .expenses
        .create(
            &fx.member_a,
            &fx.ws.id,
            ExpenseDraft {
                amount: 5.0,
                note: Some("temporary".to_owned()),
                ..ExpenseDraft::default()
            },
        )
        .await
        .expect("create");

    let updated = fx
        .expenses
        .update(
            &fx.member_a,
            &fx.ws.id,
            &created.id,
            ExpensePatch {
                note: Some(String::new()),
                ..ExpensePatch::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.note, None);
}

#[tokio::test]
async fn delete_is_restricted_to_creator_or_owner() {
    let fx = setup().await;

    let created = fx
        .expenses
        .create(&fx.member_a, &fx.ws.id, travel_expense(40.0))
        .await
        .expect("create");

    let err = fx
        .expenses
        .delete(&fx.member_b, &fx.ws.id, &created.id)
        .await
        .expect_err("non-creator member cannot delete");
    assert_eq!(err.kind, ErrorKind::Forbidden);

    // The owner may delete regardless of creator.
    fx.expenses
        .delete(&fx.owner, &fx.ws.id, &created.id)
        .await
        .expect("owner deletes");

    let second = fx
        .expenses
        .create(&fx.member_a, &fx.ws.id, travel_expense(10.0))
        .await
        .expect("create");
    fx.expenses
        .delete(&fx.member_a, &fx.ws.id, &second.id)
        .await
        .expect("creator deletes their own record");
}

#[tokio::test]
async fn listing_filters_by_category_and_window() {
    let fx = setup().await;
    let base = Utc::now();

    for (plan_type, amount, days_ago) in [
        ("travel", 10.0, 0_i64),
        ("travel", 20.0, 10),
        ("other", 30.0, 5),
    ] {
        fx.expenses
            .create(
                &fx.member_a,
                &fx.ws.id,
                ExpenseDraft {
                    plan_type: Some(plan_type.to_owned()),
                    amount,
                    date: Some(base - Duration::days(days_ago)),
                    ..ExpenseDraft::default()
                },
            )
            .await
            .expect("create");
    }

    let travel_only = fx
        .expenses
        .list(
            &fx.member_b,
            &fx.ws.id,
            ExpenseFilter {
                plan_type: Some(PlanType::parse("travel").expect("valid type")),
                ..ExpenseFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .expect("list");
    assert_eq!(travel_only.total, 2);
    // Date descending.
    assert_eq!(travel_only.items[0].amount, 10.0);
    assert_eq!(travel_only.items[1].amount, 20.0);

    let recent = fx
        .expenses
        .list(
            &fx.member_b,
            &fx.ws.id,
            ExpenseFilter {
                start_date: Some(base - Duration::days(6)),
                end_date: Some(base),
                ..ExpenseFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .expect("list");
    assert_eq!(recent.total, 2);
    assert_eq!(recent.items[0].amount, 10.0);
    assert_eq!(recent.items[1].amount, 30.0);
}

#[tokio::test]
async fn listing_paginates_with_clamped_limit() {
    let fx = setup().await;
    for n in 0..3 {
        fx.expenses
            .create(&fx.member_a, &fx.ws.id, travel_expense(1.0 + n as f64))
            .await
            .expect("create");
    }

    let page = fx
        .expenses
        .list(
            &fx.member_a,
            &fx.ws.id,
            ExpenseFilter::default(),
            PageRequest::new(Some(0), Some(1)),
        )
        .await
        .expect("list");
    // A zero limit clamps up to one row.
    assert_eq!(page.limit, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 3);
    assert!(page.has_more);
}

#[tokio::test]
async fn summary_reports_totals_by_category() {
    let fx = setup().await;

    fx.expenses
        .create(&fx.member_a, &fx.ws.id, travel_expense(100.0))
        .await
        .expect("create");
    fx.expenses
        .create(&fx.member_a, &fx.ws.id, travel_expense(50.0))
        .await
        .expect("create");
    fx.expenses
        .create(
            &fx.member_b,
            &fx.ws.id,
            ExpenseDraft {
                amount: 30.0,
                ..ExpenseDraft::default()
            },
        )
        .await
        .expect("create");

    let summary = fx
        .expenses
        .summary(&fx.owner, &fx.ws.id)
        .await
        .expect("summary");
    assert_eq!(summary.total_amount, 180.0);
    assert_eq!(summary.by_plan_type.len(), 2);
    assert_eq!(summary.by_plan_type[0].plan_type.as_str(), "travel");
    assert_eq!(summary.by_plan_type[0].total, 150.0);
    assert_eq!(summary.by_plan_type[0].count, 2);
    assert_eq!(summary.by_plan_type[1].plan_type.as_str(), "other");
    assert_eq!(summary.by_plan_type[1].total, 30.0);
}

#[tokio::test]
async fn operations_reject_non_participants() {
    let fx = setup().await;
    let stranger = register(&fx.store, "stranger@lab.edu").await;

    let err = fx
        .expenses
        .create(&stranger, &fx.ws.id, travel_expense(1.0))
        .await
        .expect_err("stranger cannot create");
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let err = fx
        .expenses
        .list(
            &stranger,
            &fx.ws.id,
            ExpenseFilter::default(),
            PageRequest::default(),
        )
        .await
        .expect_err("stranger cannot list");
    assert_eq!(err.kind, ErrorKind::Forbidden);
}
