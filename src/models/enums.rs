//! Shared domain enums for the borrowing lifecycle

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a borrowing request.
///
/// `Overdue` is a read-time view of an `Active` request whose required date
/// has passed with items still outstanding; it is never written to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Active,
    Returned,
    Overdue,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Active => "active",
            RequestStatus::Returned => "returned",
            RequestStatus::Overdue => "overdue",
        }
    }

    /// Whether a stored transition from `self` to `next` is legal.
    ///
    /// Transition table:
    /// pending -> approved | rejected
    /// approved -> active (first borrow transaction)
    /// active -> returned (close with zero outstanding balance)
    /// rejected, returned are terminal; overdue is derived, never stored.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
                | (RequestStatus::Approved, RequestStatus::Active)
                | (RequestStatus::Active, RequestStatus::Returned)
        )
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Rejected | RequestStatus::Returned)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            "active" => Ok(RequestStatus::Active),
            "returned" => Ok(RequestStatus::Returned),
            "overdue" => Ok(RequestStatus::Overdue),
            other => Err(format!("unknown request status '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Kind of ledger transaction recorded against a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Borrow,
    Return,
    PartialReturn,
}

impl TransactionType {
    /// Classify a return transaction from the balance it leaves behind.
    ///
    /// A call that zeroes every line's outstanding balance is a full return;
    /// anything less is a partial return. The type is derived here rather
    /// than accepted from callers so the ledger cannot be mislabeled.
    pub fn for_return(fully_settled: bool) -> TransactionType {
        if fully_settled {
            TransactionType::Return
        } else {
            TransactionType::PartialReturn
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Borrow => "borrow",
            TransactionType::Return => "return",
            TransactionType::PartialReturn => "partial_return",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConditionStatus
// ---------------------------------------------------------------------------

/// Condition a returned item came back in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConditionStatus {
    Good,
    Damaged,
    Lost,
}

impl ConditionStatus {
    /// Only damaged or lost returns may carry a damage report.
    pub fn is_reportable(&self) -> bool {
        matches!(self, ConditionStatus::Damaged | ConditionStatus::Lost)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::Good => "good",
            ConditionStatus::Damaged => "damaged",
            ConditionStatus::Lost => "lost",
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_only_be_approved_or_rejected() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Active));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Returned));
    }

    #[test]
    fn approved_only_activates() {
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::Active));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Returned));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Rejected));
    }

    #[test]
    fn active_only_closes() {
        assert!(RequestStatus::Active.can_transition_to(RequestStatus::Returned));
        assert!(!RequestStatus::Active.can_transition_to(RequestStatus::Approved));
    }

    #[test]
    fn terminal_statuses_transition_nowhere() {
        for terminal in [RequestStatus::Rejected, RequestStatus::Returned] {
            assert!(terminal.is_terminal());
            for next in [
                RequestStatus::Pending,
                RequestStatus::Approved,
                RequestStatus::Rejected,
                RequestStatus::Active,
                RequestStatus::Returned,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn overdue_is_never_a_stored_transition_target() {
        for from in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Active,
        ] {
            assert!(!from.can_transition_to(RequestStatus::Overdue));
        }
    }

    #[test]
    fn return_type_derived_from_settlement() {
        assert_eq!(TransactionType::for_return(true), TransactionType::Return);
        assert_eq!(TransactionType::for_return(false), TransactionType::PartialReturn);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Active,
            RequestStatus::Returned,
            RequestStatus::Overdue,
        ] {
            assert_eq!(status.as_str().parse::<RequestStatus>(), Ok(status));
        }
        assert!("unknown".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn status_parse_rejects_arbitrary_strings() {
        // Filter values reach SQL assembly only after parsing to the enum,
        // so anything outside the closed set must fail here
        assert!("Active".parse::<RequestStatus>().is_err());
        assert!("active' OR '1'='1".parse::<RequestStatus>().is_err());
        assert!("active; DROP TABLE borrowing_requests".parse::<RequestStatus>().is_err());
        assert!("".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn only_damaged_or_lost_are_reportable() {
        assert!(!ConditionStatus::Good.is_reportable());
        assert!(ConditionStatus::Damaged.is_reportable());
        assert!(ConditionStatus::Lost.is_reportable());
    }
}
