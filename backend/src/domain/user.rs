//! User aggregate.

use chrono::{DateTime, Utc};

use super::{EmailAddress, UserId, WorkspaceId};

/// Registered account.
///
/// `workspace_ids` is a non-owning back-reference maintained for the
/// "list my workspaces" query only; authorization decisions always read the
/// workspace's own membership instead (see the access guard).
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Unique, lowercased email address.
    pub email: EmailAddress,
    /// Password hash produced by the credential service; never a raw secret.
    pub credential_hash: String,
    /// Workspaces this user owns or participates in, in join order.
    pub workspace_ids: Vec<WorkspaceId>,
    /// Account creation time; doubles as the joined-at time in member lists.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a fresh account with no workspace memberships.
    pub fn new(email: EmailAddress, credential_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::random(),
            email,
            credential_hash,
            workspace_ids: Vec::new(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_users_start_without_memberships() {
        let email = EmailAddress::parse("pi@lab.edu").expect("valid email");
        let user = User::new(email.clone(), "$2b$12$hash".to_owned(), Utc::now());
        assert_eq!(user.email, email);
        assert!(user.workspace_ids.is_empty());
    }
}
