//! Expense record entity and list filtering.

use std::fmt;

use chrono::{DateTime, Utc};

use super::{ExpenseId, PlanType, UserId, WorkspaceId};

/// Longest acceptable expense note.
const MAX_NOTE_LEN: usize = 500;

/// Validation errors returned by expense value constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseValidationError {
    /// Amount is NaN or infinite.
    AmountNotFinite,
    /// Amount is zero or below; expenses must be strictly positive.
    AmountNotPositive,
    /// Note exceeds the length cap.
    NoteTooLong { max: usize },
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmountNotFinite => write!(f, "amount must be a finite number"),
            Self::AmountNotPositive => write!(f, "amount must be greater than zero"),
            Self::NoteTooLong { max } => write!(f, "note must be at most {max} characters"),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

impl ExpenseValidationError {
    /// Name of the input field this error applies to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::AmountNotFinite | Self::AmountNotPositive => "amount",
            Self::NoteTooLong { .. } => "note",
        }
    }
}

/// Validate an expense amount: finite and strictly positive.
pub fn validate_amount(amount: f64) -> Result<f64, ExpenseValidationError> {
    if !amount.is_finite() {
        return Err(ExpenseValidationError::AmountNotFinite);
    }
    if amount <= 0.0 {
        return Err(ExpenseValidationError::AmountNotPositive);
    }
    Ok(amount)
}

/// Validate an optional note; an empty string collapses to `None`.
pub fn validate_note(note: Option<String>) -> Result<Option<String>, ExpenseValidationError> {
    match note {
        None => Ok(None),
        Some(text) if text.is_empty() => Ok(None),
        Some(text) if text.chars().count() > MAX_NOTE_LEN => {
            Err(ExpenseValidationError::NoteTooLong { max: MAX_NOTE_LEN })
        }
        Some(text) => Ok(Some(text)),
    }
}

/// Expense record.
///
/// ## Invariants
/// - `amount` is finite and strictly positive.
/// - A non-`"other"` `plan_type` names an existing plan in the workspace at
///   the moment of the write (enforced by the store).
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// Stable identifier.
    pub id: ExpenseId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Budget category the amount counts against; `"other"` when untied.
    pub plan_type: PlanType,
    /// Spent amount.
    pub amount: f64,
    /// Optional free-form note.
    pub note: Option<String>,
    /// When the expense occurred (defaults to the time of recording).
    pub date: DateTime<Utc>,
    /// The member who recorded the expense; only they or the owner may
    /// delete it.
    pub created_by: UserId,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create an expense attributed to `created_by`.
    #[allow(clippy::too_many_arguments, reason = "plain record constructor")]
    pub fn new(
        workspace_id: WorkspaceId,
        plan_type: PlanType,
        amount: f64,
        note: Option<String>,
        date: DateTime<Utc>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ExpenseId::random(),
            workspace_id,
            plan_type,
            amount,
            note,
            date,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filter applied when listing expenses.
///
/// The date window is inclusive on both ends; a window with `start > end`
/// simply matches nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Exact-match category restriction.
    pub plan_type: Option<PlanType>,
    /// Inclusive lower bound on `date`.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `date`.
    pub end_date: Option<DateTime<Utc>>,
}

impl ExpenseFilter {
    /// Whether `expense` satisfies every restriction in the filter.
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(plan_type) = &self.plan_type {
            if expense.plan_type != *plan_type {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if expense.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if expense.date > end {
                return false;
            }
        }
        true
    }
}
