//! Strongly typed identifiers for the domain aggregates.
//!
//! Each aggregate gets its own UUID-backed newtype so a plan id can never be
//! passed where a workspace id is expected. Serialisation is transparent: on
//! the wire an id is just its UUID string.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! declare_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

declare_id! {
    /// Stable identifier of a registered user.
    UserId
}

declare_id! {
    /// Stable identifier of a workspace (tenant boundary).
    WorkspaceId
}

declare_id! {
    /// Stable identifier of a budget plan.
    PlanId
}

declare_id! {
    /// Stable identifier of an expense record.
    ExpenseId
}
