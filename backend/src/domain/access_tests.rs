//! Unit tests for the workspace access guard.

use std::sync::Arc;

use rstest::rstest;

use crate::domain::ports::{MockWorkspaceRepository, WorkspaceStoreError};
use crate::domain::{
    EmailAddress, Error, ErrorKind, Identity, Role, UserId, Workspace, WorkspaceDraft, WorkspaceId,
};

use super::AccessGuard;

fn identity_for(user_id: UserId) -> Identity {
    Identity {
        user_id,
        email: EmailAddress::parse("someone@lab.edu").expect("valid email"),
    }
}

fn workspace_owned_by(owner: UserId, members: &[UserId]) -> Workspace {
    let draft = WorkspaceDraft::new("Grant 42", "").expect("valid draft");
    let mut ws = Workspace::new(draft, owner, chrono::Utc::now());
    ws.member_ids.extend_from_slice(members);
    ws
}

fn guard_returning(workspace: Option<Workspace>) -> AccessGuard<MockWorkspaceRepository> {
    let mut repo = MockWorkspaceRepository::new();
    repo.expect_find_by_id()
        .returning(move |_| Ok(workspace.clone()));
    AccessGuard::new(Arc::new(repo))
}

#[tokio::test]
async fn unknown_workspace_is_not_found() {
    let guard = guard_returning(None);
    let err = guard
        .check_access(&WorkspaceId::random(), &identity_for(UserId::random()))
        .await
        .expect_err("missing workspace");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn owner_and_member_resolve_to_disjoint_roles() {
    let owner = UserId::random();
    let member = UserId::random();
    let ws = workspace_owned_by(owner, &[member]);
    let guard = guard_returning(Some(ws.clone()));

    let (_, role) = guard
        .check_access(&ws.id, &identity_for(owner))
        .await
        .expect("owner access resolves");
    assert_eq!(role, Some(Role::Owner));

    let (_, role) = guard
        .check_access(&ws.id, &identity_for(member))
        .await
        .expect("member access resolves");
    assert_eq!(role, Some(Role::Member));

    let (_, role) = guard
        .check_access(&ws.id, &identity_for(UserId::random()))
        .await
        .expect("stranger access resolves");
    assert_eq!(role, None);
}

#[tokio::test]
async fn require_participant_rejects_strangers() {
    let owner = UserId::random();
    let ws = workspace_owned_by(owner, &[]);
    let guard = guard_returning(Some(ws.clone()));

    let err = guard
        .require_participant(&ws.id, &identity_for(UserId::random()))
        .await
        .expect_err("stranger rejected");
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn require_owner_distinguishes_member_from_stranger() {
    let owner = UserId::random();
    let member = UserId::random();
    let ws = workspace_owned_by(owner, &[member]);
    let guard = guard_returning(Some(ws.clone()));

    let member_err = guard
        .require_owner(&ws.id, &identity_for(member))
        .await
        .expect_err("member lacks owner role");
    assert_eq!(member_err.kind, ErrorKind::OwnerRequired);
    assert!(member_err.message.contains("owner"));

    let stranger_err = guard
        .require_owner(&ws.id, &identity_for(UserId::random()))
        .await
        .expect_err("stranger rejected");
    assert_eq!(stranger_err.kind, ErrorKind::Forbidden);

    guard
        .require_owner(&ws.id, &identity_for(owner))
        .await
        .expect("owner passes");
}

#[tokio::test]
async fn store_failures_surface_as_internal() {
    let mut repo = MockWorkspaceRepository::new();
    repo.expect_find_by_id()
        .returning(|_| Err(WorkspaceStoreError::connection("store down")));
    let guard = AccessGuard::new(Arc::new(repo));

    let err = guard
        .check_access(&WorkspaceId::random(), &identity_for(UserId::random()))
        .await
        .expect_err("store failure propagates");
    assert_eq!(err.kind, ErrorKind::Internal);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(7)]
#[tokio::test]
async fn owner_never_resolves_as_member(#[case] member_count: usize) {
    // Randomised membership: the owner's role must stay Owner no matter how
    // many members the workspace has.
    let owner = UserId::random();
    let members: Vec<UserId> = (0..member_count).map(|_| UserId::random()).collect();
    let ws = workspace_owned_by(owner, &members);
    let guard = guard_returning(Some(ws.clone()));

    let (_, role) = guard
        .check_access(&ws.id, &identity_for(owner))
        .await
        .expect("owner access resolves");
    assert_eq!(role, Some(Role::Owner));
    assert_ne!(role, Some(Role::Member));
}

#[tokio::test]
async fn duplicate_name_maps_to_conflict() {
    let err: Error =
        super::map_workspace_store_error(WorkspaceStoreError::duplicate_name("Grant 42"));
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.message.contains("Grant 42"));
}
