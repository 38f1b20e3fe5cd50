//! Budget plan entity and its category key.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PlanId, WorkspaceId};

/// Longest acceptable plan category after trimming.
const MAX_TYPE_LEN: usize = 100;

/// Catch-all category for expenses not tied to a plan.
pub const OTHER_CATEGORY: &str = "other";

/// Validation errors returned by plan value constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanValidationError {
    /// Category was empty once trimmed.
    EmptyType,
    /// Category exceeds the length cap.
    TypeTooLong { max: usize },
    /// Planned amount is NaN or infinite.
    AmountNotFinite,
    /// Planned amount is below zero.
    AmountNegative,
}

impl fmt::Display for PlanValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyType => write!(f, "plan type must not be empty"),
            Self::TypeTooLong { max } => write!(f, "plan type must be at most {max} characters"),
            Self::AmountNotFinite => write!(f, "planned amount must be a finite number"),
            Self::AmountNegative => write!(f, "planned amount must not be negative"),
        }
    }
}

impl std::error::Error for PlanValidationError {}

impl PlanValidationError {
    /// Name of the input field this error applies to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyType | Self::TypeTooLong { .. } => "type",
            Self::AmountNotFinite | Self::AmountNegative => "plannedAmount",
        }
    }
}

/// Budget category key shared between plans and expenses.
///
/// ## Invariants
/// - Trimmed and 1..=100 characters.
///
/// The literal `"other"` is a valid plan type and also the synthetic
/// catch-all applied to expenses created without one.
///
/// # Examples
/// ```
/// use backend::domain::PlanType;
///
/// let t = PlanType::parse("  travel ").unwrap();
/// assert_eq!(t.as_str(), "travel");
/// assert!(PlanType::other().is_other());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlanType(String);

impl PlanType {
    /// Validate and trim a raw category string.
    pub fn parse(raw: &str) -> Result<Self, PlanValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PlanValidationError::EmptyType);
        }
        if trimmed.chars().count() > MAX_TYPE_LEN {
            return Err(PlanValidationError::TypeTooLong { max: MAX_TYPE_LEN });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The synthetic catch-all category.
    pub fn other() -> Self {
        Self(OTHER_CATEGORY.to_owned())
    }

    /// Whether this is the catch-all category.
    pub fn is_other(&self) -> bool {
        self.0 == OTHER_CATEGORY
    }

    /// Borrow the category key.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for PlanType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for PlanType {
    type Error = PlanValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlanType> for String {
    fn from(value: PlanType) -> Self {
        value.0
    }
}

/// Validate a planned amount: finite and non-negative (zero is allowed).
pub fn validate_planned_amount(amount: f64) -> Result<f64, PlanValidationError> {
    if !amount.is_finite() {
        return Err(PlanValidationError::AmountNotFinite);
    }
    if amount < 0.0 {
        return Err(PlanValidationError::AmountNegative);
    }
    Ok(amount)
}

/// Budget plan record.
///
/// ## Invariants
/// - `(workspace_id, plan_type)` is unique across the store.
/// - `planned_amount` is finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Stable identifier.
    pub id: PlanId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Budget category key.
    pub plan_type: PlanType,
    /// Target amount for the category.
    pub planned_amount: f64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// Create a plan in `workspace_id` with a validated type and amount.
    pub fn new(
        workspace_id: WorkspaceId,
        plan_type: PlanType,
        planned_amount: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PlanId::random(),
            workspace_id,
            plan_type,
            planned_amount,
            created_at: now,
            updated_at: now,
        }
    }
}
