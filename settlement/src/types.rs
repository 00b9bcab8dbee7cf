//! Core types for the settlement engine

use crate::balance::{BalanceEntry, Balances};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Participant identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Generate a fresh participant ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Person sharing the costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant ID
    pub id: ParticipantId,

    /// Display name
    pub real_name: String,

    /// Payment-service username, if any
    #[serde(default)]
    pub payment_handle: Option<String>,
}

impl Participant {
    /// Create a participant with a fresh ID.
    ///
    /// An empty handle is stored as absent.
    pub fn new(real_name: impl Into<String>, payment_handle: Option<String>) -> Self {
        Self {
            id: ParticipantId::new(),
            real_name: real_name.into(),
            payment_handle: payment_handle.filter(|h| !h.is_empty()),
        }
    }

    /// Payment handle, treating an empty string as absent
    pub fn payment_handle(&self) -> Option<&str> {
        self.payment_handle.as_deref().filter(|h| !h.is_empty())
    }
}

/// Recorded cost paid by one participant on behalf of the group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Who paid
    pub payer: ParticipantId,

    /// Free text, not used in computation
    #[serde(default)]
    pub description: String,

    /// Amount paid
    pub amount: f64,
}

impl Expense {
    /// Create new expense
    pub fn new(payer: ParticipantId, description: impl Into<String>, amount: f64) -> Self {
        Self {
            payer,
            description: description.into(),
            amount,
        }
    }
}

/// Immutable input handed to the engine by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Participants, in registration order
    #[serde(default)]
    pub participants: Vec<Participant>,

    /// Expenses, in entry order
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl Snapshot {
    /// Create new snapshot
    pub fn new(participants: Vec<Participant>, expenses: Vec<Expense>) -> Self {
        Self {
            participants,
            expenses,
        }
    }

    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sum of all expense amounts
    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }
}

/// Single transfer from a debtor to a creditor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Debtor (pays)
    pub debtor: ParticipantId,

    /// Debtor display name
    pub debtor_name: String,

    /// Creditor (receives)
    pub creditor: ParticipantId,

    /// Creditor display name
    pub creditor_name: String,

    /// Amount to transfer, always > 0
    pub amount: f64,
}

/// Payment-collection URL for a creditor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentLink(String);

impl PaymentLink {
    /// Build a link from a base URL and a handle
    pub fn new(base_url: &str, handle: &str) -> Self {
        Self(format!("{}/{}", base_url.trim_end_matches('/'), handle))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction with the creditor's payment link resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedTransaction {
    /// Underlying transfer
    #[serde(flatten)]
    pub transaction: Transaction,

    /// Link for paying the creditor, absent when the creditor has no handle
    pub payment_link: Option<PaymentLink>,
}

/// Output of one settlement run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReport {
    /// Report ID
    pub report_id: Uuid,

    /// Generated timestamp
    pub generated_at: DateTime<Utc>,

    /// Number of expenses processed
    pub expense_count: usize,

    /// Sum of all expenses
    pub total_expenses: f64,

    /// Fair share per participant
    pub split_amount: f64,

    /// Net balance per participant
    pub balances: Balances,

    /// Transfers that settle the balances
    pub transactions: Vec<Transaction>,

    /// Transfers with payment links
    pub annotated: Vec<AnnotatedTransaction>,

    /// Balance holders left unsettled by floating-point drift
    pub residual: Vec<BalanceEntry>,
}

impl SettlementReport {
    /// Total amount moved by all transfers
    pub fn transfer_total(&self) -> f64 {
        self.transactions.iter().map(|t| t.amount).sum()
    }

    /// Upper bound on transfer count: debtors + creditors - 1
    pub fn max_transaction_bound(&self) -> usize {
        (self.balances.debtors().count() + self.balances.creditors().count()).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_handle_is_absent() {
        let p = Participant::new("Bob", Some(String::new()));
        assert_eq!(p.payment_handle, None);
        assert_eq!(p.payment_handle(), None);

        let mut q = Participant::new("Carol", None);
        q.payment_handle = Some(String::new());
        assert_eq!(q.payment_handle(), None);
    }

    #[test]
    fn test_payment_link_joins_base_once() {
        let link = PaymentLink::new("https://www.paypal.com/paypalme/", "alice123");
        assert_eq!(link.as_str(), "https://www.paypal.com/paypalme/alice123");

        let link = PaymentLink::new("https://www.paypal.com/paypalme", "alice123");
        assert_eq!(link.to_string(), "https://www.paypal.com/paypalme/alice123");
    }

    #[test]
    fn test_snapshot_deserializes_without_handles() {
        let id = ParticipantId::new();
        let json = format!(
            r#"{{"participants":[{{"id":"{id}","real_name":"A"}}],
                "expenses":[{{"payer":"{id}","amount":12.5}}]}}"#
        );
        let snapshot = Snapshot::from_json(&json).unwrap();

        assert_eq!(snapshot.participants[0].payment_handle(), None);
        assert_eq!(snapshot.expenses[0].description, "");
        assert_eq!(snapshot.total_expenses(), 12.5);
    }

    #[test]
    fn test_snapshot_from_malformed_json() {
        assert!(matches!(
            Snapshot::from_json(r#"{"participants": [{"real_name": "A"}]}"#),
            Err(crate::Error::Serialization(_))
        ));
        assert!(matches!(
            Snapshot::from_json("not json"),
            Err(crate::Error::Serialization(_))
        ));
    }
}
