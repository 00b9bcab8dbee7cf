//! Net balance computation
//!
//! Every participant is charged an equal share of the total and credited with
//! everything they paid:
//!
//! ```text
//! Expenses:  A paid 90, B paid 30   (total 120, 3 participants)
//! Split:     40 each
//!
//! Balances:
//!   A: 90 - 40 = +50  (is owed)
//!   B: 30 - 40 = -10  (owes)
//!   C:  0 - 40 = -40  (owes)
//! ```
//!
//! Balances keep insertion order (participants first, in input order), which
//! is the order the netting step falls back on for ties.

use crate::{
    config::UnknownPayerPolicy,
    types::{ParticipantId, Snapshot, Transaction},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Net position of one balance holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// Balance holder
    pub participant: ParticipantId,

    /// Display name
    pub name: String,

    /// Negative = owes, positive = is owed
    pub amount: f64,
}

impl BalanceEntry {
    /// Check if the holder owes money
    pub fn is_debtor(&self) -> bool {
        self.amount < 0.0
    }

    /// Check if the holder is owed money
    pub fn is_creditor(&self) -> bool {
        self.amount > 0.0
    }
}

/// Ordered mapping from participant to net balance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balances {
    entries: Vec<BalanceEntry>,
}

impl Balances {
    /// Build from entries, keeping their order
    pub fn from_entries(entries: Vec<BalanceEntry>) -> Self {
        Self { entries }
    }

    /// Balance for a participant
    pub fn get(&self, participant: &ParticipantId) -> Option<f64> {
        self.entry(participant).map(|e| e.amount)
    }

    /// Full entry for a participant
    pub fn entry(&self, participant: &ParticipantId) -> Option<&BalanceEntry> {
        self.entries.iter().find(|e| &e.participant == participant)
    }

    /// Entries in mapping order
    pub fn iter(&self) -> impl Iterator<Item = &BalanceEntry> {
        self.entries.iter()
    }

    /// Number of balance holders
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no balance holders
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all balances, zero up to rounding when every payer is known
    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|e| e.amount).sum()
    }

    /// Holders with a negative balance, in mapping order
    pub fn debtors(&self) -> impl Iterator<Item = &BalanceEntry> {
        self.entries.iter().filter(|e| e.is_debtor())
    }

    /// Holders with a positive balance, in mapping order
    pub fn creditors(&self) -> impl Iterator<Item = &BalanceEntry> {
        self.entries.iter().filter(|e| e.is_creditor())
    }

    /// Balances after executing the given transfers.
    ///
    /// Each transfer is added to the debtor and subtracted from the creditor,
    /// so a complete settlement leaves every balance near zero.
    pub fn apply(&self, transactions: &[Transaction]) -> Balances {
        let mut settled = self.clone();
        for tx in transactions {
            for entry in settled.entries.iter_mut() {
                if entry.participant == tx.debtor {
                    entry.amount += tx.amount;
                } else if entry.participant == tx.creditor {
                    entry.amount -= tx.amount;
                }
            }
        }
        settled
    }

    /// Check if every balance is within `epsilon` of zero
    pub fn is_settled(&self, epsilon: f64) -> bool {
        self.entries.iter().all(|e| e.amount.abs() <= epsilon)
    }

    /// Largest absolute balance, zero when empty
    pub fn max_magnitude(&self) -> f64 {
        self.entries.iter().map(|e| e.amount.abs()).fold(0.0, f64::max)
    }

    /// Settlement tolerance for these balances.
    ///
    /// `epsilon` is relative to the largest balance, with magnitudes below 1
    /// treated as 1 so small tabs keep an absolute floor.
    pub fn tolerance(&self, epsilon: f64) -> f64 {
        epsilon * self.max_magnitude().max(1.0)
    }
}

/// Balances together with the figures they were derived from
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSheet {
    /// Sum of all expenses
    pub total_expenses: f64,

    /// Fair share charged to each participant
    pub split_amount: f64,

    /// Net balance per holder
    pub balances: Balances,
}

/// Fair share per participant, zero when there are no participants
pub fn split_amount(total: f64, participant_count: usize) -> f64 {
    if participant_count == 0 {
        0.0
    } else {
        total / participant_count as f64
    }
}

/// Compute each participant's net balance.
///
/// Every participant starts at `-split` and each expense credits its payer
/// with the full amount. Under [`UnknownPayerPolicy::Reject`] an expense
/// whose payer is not a participant fails with [`Error::UnknownPayer`];
/// under [`UnknownPayerPolicy::Admit`] the payer gets an orphan entry that is
/// credited but never charged a share.
pub fn compute_balances(snapshot: &Snapshot, policy: UnknownPayerPolicy) -> Result<Balances> {
    compute_balance_sheet(snapshot, policy).map(|sheet| sheet.balances)
}

/// Compute balances along with the total and split they were built from.
///
/// Same rules and errors as [`compute_balances`].
pub fn compute_balance_sheet(
    snapshot: &Snapshot,
    policy: UnknownPayerPolicy,
) -> Result<BalanceSheet> {
    for expense in &snapshot.expenses {
        if !expense.amount.is_finite() {
            return Err(Error::InvalidAmount(format!(
                "expense '{}' has amount {}",
                expense.description, expense.amount
            )));
        }
    }

    let total_expenses = snapshot.total_expenses();
    let split = split_amount(total_expenses, snapshot.participants.len());

    let mut entries = Vec::with_capacity(snapshot.participants.len());
    let mut index: HashMap<ParticipantId, usize> = HashMap::new();

    for participant in &snapshot.participants {
        if index.insert(participant.id, entries.len()).is_some() {
            return Err(Error::DuplicateParticipant(participant.id));
        }
        entries.push(BalanceEntry {
            participant: participant.id,
            name: participant.real_name.clone(),
            amount: -split,
        });
    }

    for expense in &snapshot.expenses {
        let slot = match index.get(&expense.payer) {
            Some(&slot) => slot,
            None => match policy {
                UnknownPayerPolicy::Reject => {
                    return Err(Error::UnknownPayer {
                        payer: expense.payer,
                        description: expense.description.clone(),
                    });
                }
                UnknownPayerPolicy::Admit => {
                    warn!(payer = %expense.payer, "admitting expense from unknown payer");
                    let slot = entries.len();
                    index.insert(expense.payer, slot);
                    entries.push(BalanceEntry {
                        participant: expense.payer,
                        name: expense.payer.to_string(),
                        amount: 0.0,
                    });
                    slot
                }
            },
        };
        entries[slot].amount += expense.amount;
    }

    debug!(holders = entries.len(), split, "balances computed");

    Ok(BalanceSheet {
        total_expenses,
        split_amount: split,
        balances: Balances::from_entries(entries),
    })
}
