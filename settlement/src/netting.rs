//! Minimal-transfer netting
//!
//! Greedy matching of the largest debtor with the largest creditor.
//!
//! # Algorithm
//!
//! 1. Split balances into debtors (< 0) and creditors (> 0), dropping zeros
//! 2. Sort debtors by balance ascending, creditors by balance descending
//!    (largest magnitude first, ties keep mapping order)
//! 3. Match the fronts of both queues and transfer the smaller magnitude
//! 4. Whichever side has a remainder stays at the FRONT of its queue
//! 5. Stop when either queue is empty
//!
//! # Example
//!
//! ```text
//! Balances:   A: +50, B: -10, C: -40
//!
//! Debtors:    [C 40, B 10]
//! Creditors:  [A 50]
//!
//! C pays A 40   (C done, A has 10 left and stays at the front)
//! B pays A 10   (both done)
//! ```
//!
//! Remainders are not re-sorted, so later matches follow queue order rather
//! than a global ordering by magnitude. Every transfer exhausts at least one
//! side, which bounds the output at `debtors + creditors - 1` transfers.

use crate::{
    balance::{BalanceEntry, Balances},
    types::{ParticipantId, Transaction},
};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Outstanding magnitude of one side during matching
#[derive(Debug, Clone)]
struct Position {
    participant: ParticipantId,
    name: String,
    remaining: f64,
}

impl Position {
    fn from_entry(entry: &BalanceEntry) -> Self {
        Self {
            participant: entry.participant,
            name: entry.name.clone(),
            remaining: entry.amount.abs(),
        }
    }
}

/// Result of netting a set of balances
#[derive(Debug, Clone, Default)]
pub struct NettingOutcome {
    /// Transfers in emission order
    pub transactions: Vec<Transaction>,

    /// Entries left in either queue once the other ran dry
    pub residual: Vec<BalanceEntry>,
}

/// Netting engine
#[derive(Debug, Clone, Default)]
pub struct NettingEngine;

impl NettingEngine {
    /// Create new netting engine
    pub fn new() -> Self {
        Self
    }

    /// Generate the transfers that settle `balances`
    pub fn settle_debts(&self, balances: &Balances) -> NettingOutcome {
        let mut debtors: Vec<&BalanceEntry> = balances.debtors().collect();
        let mut creditors: Vec<&BalanceEntry> = balances.creditors().collect();

        // Stable sorts: equal balances keep mapping order
        debtors.sort_by(|a, b| a.amount.total_cmp(&b.amount));
        creditors.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        let mut debtors: VecDeque<Position> = debtors.into_iter().map(Position::from_entry).collect();
        let mut creditors: VecDeque<Position> =
            creditors.into_iter().map(Position::from_entry).collect();

        let mut transactions = Vec::new();

        // A side with a remainder stays at the front of its queue; an exhausted
        // side is popped.
        while let (Some(debtor), Some(creditor)) = (debtors.front_mut(), creditors.front_mut()) {
            let amount = debtor.remaining.min(creditor.remaining);

            debug!(
                debtor = %debtor.name,
                creditor = %creditor.name,
                amount,
                "transfer"
            );

            transactions.push(Transaction {
                debtor: debtor.participant,
                debtor_name: debtor.name.clone(),
                creditor: creditor.participant,
                creditor_name: creditor.name.clone(),
                amount,
            });

            debtor.remaining -= amount;
            creditor.remaining -= amount;

            if debtor.remaining > 0.0 {
                debug!(debtor = %debtor.name, remaining = debtor.remaining, "debtor keeps front");
            } else {
                debtors.pop_front();
            }

            if creditor.remaining > 0.0 {
                debug!(creditor = %creditor.name, remaining = creditor.remaining, "creditor keeps front");
            } else {
                creditors.pop_front();
            }
        }

        let residual: Vec<BalanceEntry> = debtors
            .into_iter()
            .map(|p| BalanceEntry {
                participant: p.participant,
                name: p.name,
                amount: -p.remaining,
            })
            .chain(creditors.into_iter().map(|p| BalanceEntry {
                participant: p.participant,
                name: p.name,
                amount: p.remaining,
            }))
            .collect();

        if !residual.is_empty() {
            let drift: f64 = residual.iter().map(|e| e.amount.abs()).sum();
            warn!(holders = residual.len(), drift, "unsettled residual left after netting");
        }

        NettingOutcome {
            transactions,
            residual,
        }
    }
}
