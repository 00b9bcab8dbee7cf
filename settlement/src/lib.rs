//! Tab Settlement Engine
//!
//! Settles a shared tab: computes each participant's net balance from the
//! recorded expenses and produces the transfers that zero every balance.
//!
//! # Architecture

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]
//!
//! Data flows one way, each stage consuming only the previous stage's output:
//!
//! 1. **Balances**: equal split of the total, credited with what each paid
//! 2. **Netting**: greedy largest-debtor / largest-creditor matching
//! 3. **Links**: creditor payment handle resolved to a payment URL
//!
//! The engine is pure: no I/O, no state kept between calls. Persistence and
//! presentation belong to the caller, which passes in a [`Snapshot`].
//!
//! # Example
//!
//! ```
//! use tab_settlement::{Expense, Participant, SettlementEngine, Snapshot};
//!
//! fn main() -> tab_settlement::Result<()> {
//!     let a = Participant::new("A", Some("a-pp".to_string()));
//!     let b = Participant::new("B", None);
//!     let c = Participant::new("C", Some("c-pp".to_string()));
//!     let expenses = vec![Expense::new(a.id, "hotel", 90.0), Expense::new(b.id, "food", 30.0)];
//!
//!     let engine = SettlementEngine::default();
//!     let report = engine.settle(&Snapshot::new(vec![a, b, c], expenses))?;
//!
//!     // C pays A 40, B pays A 10
//!     assert_eq!(report.transactions.len(), 2);
//!     Ok(())
//! }
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod balance;
pub mod netting;
pub mod links;
pub mod error;
pub mod config;
pub mod engine;

// Re-exports
pub use error::{Error, Result};
pub use types::*;
pub use balance::{compute_balance_sheet, compute_balances, BalanceEntry, BalanceSheet, Balances};
pub use config::{Config, UnknownPayerPolicy};
pub use engine::SettlementEngine;
pub use links::PaymentLinkResolver;
pub use netting::{NettingEngine, NettingOutcome};
