//! Unit tests for the plan registry service.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::ports::{UserRepository, WorkspaceRepository};
use crate::domain::{
    EmailAddress, ErrorKind, Identity, User, Workspace, WorkspaceDraft,
};
use crate::store::MemoryStore;

use super::{PlanDraft, PlanPatch, PlanService};

fn service(store: &Arc<MemoryStore>) -> PlanService<MemoryStore, MemoryStore> {
    PlanService::new(Arc::clone(store), Arc::clone(store))
}

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

async fn setup() -> (Arc<MemoryStore>, PlanService<MemoryStore, MemoryStore>, Identity, Identity, Workspace)
{
    let store = Arc::new(MemoryStore::new());
    let plans = service(&store);
    let owner = register(&store, "pi@lab.edu").await;
    let member = register(&store, "postdoc@lab.edu").await;

    let draft = WorkspaceDraft::new("Grant 42", "").expect("valid draft");
    let mut ws = Workspace::new(draft, owner.user_id, Utc::now());
    ws.member_ids.push(member.user_id);
    WorkspaceRepository::insert(store.as_ref(), &ws)
        .await
        .expect("workspace inserted");

    (store, plans, owner, member, ws)
}

fn travel_draft(amount: f64) -> PlanDraft {
    PlanDraft {
        plan_type: "travel".to_owned(),
        planned_amount: amount,
    }
}

#[tokio::test]
async fn create_then_fetch_round_trips() {
    let (_store, plans, _owner, member, ws) = setup().await;

    let created = plans
        .create(&member, &ws.id, travel_draft(750.0))
        .await
        .expect("member creates plan");
    assert_eq!(created.plan_type.as_str(), "travel");
    assert_eq!(created.planned_amount, 750.0);

    let listing = plans.list(&member, &ws.id).await.expect("listing");
    assert_eq!(listing.plans.len(), 1);
    assert_eq!(listing.plans[0].id, created.id);
    assert_eq!(listing.plans[0].planned_amount, 750.0);
}

#[tokio::test]
async fn second_create_with_same_type_is_conflict() {
    let (_store, plans, owner, _member, ws) = setup().await;

    plans
        .create(&owner, &ws.id, travel_draft(100.0))
        .await
        .expect("first create");
    let err = plans
        .create(&owner, &ws.id, travel_draft(200.0))
        .await
        .expect_err("duplicate type rejected");
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.message.contains("travel"));
}

#[tokio::test]
async fn type_is_trimmed_and_validated() {
    let (_store, plans, owner, _member, ws) = setup().await;

    let created = plans
        .create(
            &owner,
            &ws.id,
            PlanDraft {
                plan_type: "  equipment  ".to_owned(),
                planned_amount: 0.0,
            },
        )
        .await
        .expect("zero planned amount is valid");
    assert_eq!(created.plan_type.as_str(), "equipment");

    let err = plans
        .create(
            &owner,
            &ws.id,
            PlanDraft {
                plan_type: "   ".to_owned(),
                planned_amount: 1.0,
            },
        )
        .await
        .expect_err("blank type rejected");
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.field_errors.expect("field errors").contains_key("type"));

    let err = plans
        .create(
            &owner,
            &ws.id,
            PlanDraft {
                plan_type: "consumables".to_owned(),
                planned_amount: -1.0,
            },
        )
        .await
        .expect_err("negative amount rejected");
    assert!(err
        .field_errors
        .expect("field errors")
        .contains_key("plannedAmount"));
}

#[tokio::test]
async fn update_rechecks_uniqueness_excluding_itself() {
    let (_store, plans, owner, _member, ws) = setup().await;

    let travel = plans
        .create(&owner, &ws.id, travel_draft(100.0))
        .await
        .expect("create travel");
    plans
        .create(
            &owner,
            &ws.id,
            PlanDraft {
                plan_type: "food".to_owned(),
                planned_amount: 50.0,
            },
        )
        .await
        .expect("create food");

    // Amount-only update keeps the type; no self-collision.
    let updated = plans
        .update(
            &owner,
            &ws.id,
            &travel.id,
            PlanPatch {
                plan_type: None,
                planned_amount: Some(300.0),
            },
        )
        .await
        .expect("amount update");
    assert_eq!(updated.planned_amount, 300.0);

    let listing = plans.list(&owner, &ws.id).await.expect("listing");
    let fetched = listing
        .plans
        .iter()
        .find(|plan| plan.id == travel.id)
        .expect("plan present");
    assert_eq!(fetched.planned_amount, 300.0);

    let err = plans
        .update(
            &owner,
            &ws.id,
            &travel.id,
            PlanPatch {
                plan_type: Some("food".to_owned()),
                planned_amount: None,
            },
        )
        .await
        .expect_err("rename onto sibling rejected");
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn delete_is_owner_gated() {
    let (_store, plans, owner, member, ws) = setup().await;

    let plan = plans
        .create(&owner, &ws.id, travel_draft(100.0))
        .await
        .expect("create");

    let err = plans
        .delete(&member, &ws.id, &plan.id)
        .await
        .expect_err("member cannot delete");
    assert_eq!(err.kind, ErrorKind::OwnerRequired);

    plans
        .delete(&owner, &ws.id, &plan.id)
        .await
        .expect("owner deletes");

    let listing = plans.list(&owner, &ws.id).await.expect("listing");
    assert!(listing.plans.is_empty());
}

#[tokio::test]
async fn listing_reports_totals_without_dividing_by_zero() {
    let (_store, plans, owner, _member, ws) = setup().await;

    let empty = plans.list(&owner, &ws.id).await.expect("empty listing");
    assert_eq!(empty.total_planned_amount, 0.0);
    assert_eq!(empty.average_amount, 0.0);

    plans
        .create(&owner, &ws.id, travel_draft(100.0))
        .await
        .expect("create");
    plans
        .create(
            &owner,
            &ws.id,
            PlanDraft {
                plan_type: "equipment".to_owned(),
                planned_amount: 300.0,
            },
        )
        .await
        .expect("create");

    let listing = plans.list(&owner, &ws.id).await.expect("listing");
    assert_eq!(listing.total_planned_amount, 400.0);
    assert_eq!(listing.average_amount, 200.0);
    // Sorted by type ascending.
    assert_eq!(listing.plans[0].plan_type.as_str(), "equipment");
    assert_eq!(listing.plans[1].plan_type.as_str(), "travel");
}

#[tokio::test]
async fn plan_types_always_include_other_and_stay_sorted() {
    let (_store, plans, owner, _member, ws) = setup().await;

    let empty_types = plans.plan_types(&owner, &ws.id).await.expect("types");
    assert_eq!(empty_types, vec!["other".to_owned()]);

    plans
        .create(&owner, &ws.id, travel_draft(100.0))
        .await
        .expect("create");
    plans
        .create(
            &owner,
            &ws.id,
            PlanDraft {
                plan_type: "equipment".to_owned(),
                planned_amount: 300.0,
            },
        )
        .await
        .expect("create");

    let types = plans.plan_types(&owner, &ws.id).await.expect("types");
    assert_eq!(
        types,
        vec!["equipment".to_owned(), "other".to_owned(), "travel".to_owned()],
    );

    // Idempotent without intervening mutation.
    let again = plans.plan_types(&owner, &ws.id).await.expect("types");
    assert_eq!(types, again);
}

#[tokio::test]
async fn operations_reject_non_participants() {
    let (store, plans, _owner, _member, ws) = setup().await;
    let stranger = register(&store, "stranger@lab.edu").await;

    let err = plans
        .create(&stranger, &ws.id, travel_draft(10.0))
        .await
        .expect_err("stranger cannot create");
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let err = plans
        .list(&stranger, &ws.id)
        .await
        .expect_err("stranger cannot list");
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn plan_ids_are_scoped_to_their_workspace() {
    let (store, plans, owner, _member, ws) = setup().await;

    // A plan that lives in a different workspace must be invisible here.
    let foreign_owner = register(&store, "other-pi@lab.edu").await;
    let draft = WorkspaceDraft::new("Other Grant", "").expect("valid draft");
    let other_ws = Workspace::new(draft, foreign_owner.user_id, Utc::now());
    WorkspaceRepository::insert(store.as_ref(), &other_ws)
        .await
        .expect("workspace inserted");
    let foreign_plan = plans
        .create(&foreign_owner, &other_ws.id, travel_draft(10.0))
        .await
        .expect("foreign plan");

    let err = plans
        .update(
            &owner,
            &ws.id,
            &foreign_plan.id,
            PlanPatch::default(),
        )
        .await
        .expect_err("cross-workspace access rejected");
    assert_eq!(err.kind, ErrorKind::NotFound);
}
