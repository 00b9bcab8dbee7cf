//! Main settlement engine
//!
//! Runs balance computation, netting and link annotation over a snapshot.

use crate::{
    balance::compute_balance_sheet,
    config::Config,
    links::PaymentLinkResolver,
    netting::NettingEngine,
    types::*,
    Result,
};
use chrono::Utc;
use uuid::Uuid;

/// Settlement engine.
///
/// Holds only configuration; every call to [`SettlementEngine::settle`] works
/// on the snapshot it is given, so one engine can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    /// Netting engine
    netting: NettingEngine,

    /// Payment link resolver
    links: PaymentLinkResolver,

    /// Configuration
    config: Config,
}

impl SettlementEngine {
    /// Create new settlement engine
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            netting: NettingEngine::new(),
            links: PaymentLinkResolver::new(config.links.base_url.clone()),
            config,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Settle a snapshot of participants and expenses
    pub fn settle(&self, snapshot: &Snapshot) -> Result<SettlementReport> {
        let sheet = compute_balance_sheet(snapshot, self.config.settlement.unknown_payer)?;
        let balances = sheet.balances;

        let outcome = self.netting.settle_debts(&balances);
        let annotated = self.links.annotate(&outcome.transactions, &snapshot.participants);

        tracing::info!(
            participants = snapshot.participants.len(),
            expenses = snapshot.expenses.len(),
            transfers = outcome.transactions.len(),
            "Settlement complete: {:.2} total, {:.2} per participant",
            sheet.total_expenses,
            sheet.split_amount
        );

        let tolerance = balances.tolerance(self.config.settlement.settled_epsilon);
        if !balances.apply(&outcome.transactions).is_settled(tolerance) {
            tracing::warn!(tolerance, "balances not settled within relative tolerance");
        }

        Ok(SettlementReport {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            expense_count: snapshot.expenses.len(),
            total_expenses: sheet.total_expenses,
            split_amount: sheet.split_amount,
            balances,
            transactions: outcome.transactions,
            annotated,
            residual: outcome.residual,
        })
    }
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self {
            netting: NettingEngine::new(),
            links: PaymentLinkResolver::default(),
            config: Config::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownPayerPolicy;
    use crate::Error;

    fn scenario() -> (Snapshot, [ParticipantId; 3]) {
        let a = Participant::new("A", Some("a-pp".to_string()));
        let b = Participant::new("B", Some(String::new()));
        let c = Participant::new("C", Some("c-pp".to_string()));
        let ids = [a.id, b.id, c.id];
        let expenses = vec![Expense::new(a.id, "hotel", 90.0), Expense::new(b.id, "food", 30.0)];
        (Snapshot::new(vec![a, b, c], expenses), ids)
    }

    #[test]
    fn test_concrete_scenario_report() {
        let (snapshot, [a, b, c]) = scenario();

        let report = SettlementEngine::default().settle(&snapshot).unwrap();

        assert_eq!(report.expense_count, 2);
        assert_eq!(report.total_expenses, 120.0);
        assert_eq!(report.split_amount, 40.0);
        assert_eq!(report.balances.get(&a), Some(50.0));
        assert_eq!(report.balances.get(&b), Some(-10.0));
        assert_eq!(report.balances.get(&c), Some(-40.0));

        let flows: Vec<(ParticipantId, ParticipantId, f64)> = report
            .transactions
            .iter()
            .map(|t| (t.debtor, t.creditor, t.amount))
            .collect();
        assert_eq!(flows, vec![(c, a, 40.0), (b, a, 10.0)]);

        assert_eq!(report.annotated.len(), 2);
        for annotated in &report.annotated {
            assert_eq!(
                annotated.payment_link.as_ref().map(PaymentLink::as_str),
                Some("https://www.paypal.com/paypalme/a-pp")
            );
        }

        assert!(report.residual.is_empty());
        assert_eq!(report.transfer_total(), 50.0);
        assert_eq!(report.max_transaction_bound(), 2);
    }

    #[test]
    fn test_empty_snapshot() {
        let report = SettlementEngine::default().settle(&Snapshot::default()).unwrap();

        assert!(report.balances.is_empty());
        assert!(report.transactions.is_empty());
        assert!(report.annotated.is_empty());
        assert_eq!(report.split_amount, 0.0);
        assert_eq!(report.max_transaction_bound(), 0);
    }

    #[test]
    fn test_unknown_payer_follows_policy() {
        let (mut snapshot, _) = scenario();
        let orphan = ParticipantId::new();
        snapshot.expenses.push(Expense::new(orphan, "mystery", 30.0));

        let strict = SettlementEngine::default();
        assert!(matches!(
            strict.settle(&snapshot),
            Err(Error::UnknownPayer { payer, .. }) if payer == orphan
        ));

        let mut config = Config::default();
        config.settlement.unknown_payer = UnknownPayerPolicy::Admit;
        let lenient = SettlementEngine::new(config).unwrap();

        let report = lenient.settle(&snapshot).unwrap();
        assert_eq!(report.balances.len(), 4);
        assert_eq!(report.split_amount, 50.0);
        assert_eq!(report.balances.get(&orphan), Some(30.0));

        // Orphan has no participant record, so transfers to it carry no link
        let to_orphan: Vec<&AnnotatedTransaction> = report
            .annotated
            .iter()
            .filter(|a| a.transaction.creditor == orphan)
            .collect();
        assert!(!to_orphan.is_empty());
        assert!(to_orphan.iter().all(|a| a.payment_link.is_none()));
        assert!(report.balances.apply(&report.transactions).is_settled(1e-9));
    }

    #[test]
    fn test_large_amounts_settle_within_tolerance() {
        let people: Vec<Participant> = ["A", "B", "C"]
            .iter()
            .map(|n| Participant::new(*n, None))
            .collect();
        let snapshot = Snapshot::new(
            people.clone(),
            vec![
                Expense::new(people[0].id, "house", 1e12),
                Expense::new(people[1].id, "boat", 1e12 / 7.0),
            ],
        );
        let engine = SettlementEngine::default();

        let report = engine.settle(&snapshot).unwrap();

        let tolerance = report
            .balances
            .tolerance(engine.config().settlement.settled_epsilon);
        assert!(tolerance > engine.config().settlement.settled_epsilon);
        assert!(report.balances.apply(&report.transactions).is_settled(tolerance));
        assert!(report.residual.iter().all(|e| e.amount.abs() <= tolerance));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.links.base_url = String::new();
        assert!(matches!(SettlementEngine::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_report_serializes() {
        let (snapshot, _) = scenario();
        let report = SettlementEngine::default().settle(&snapshot).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["split_amount"], 40.0);
        assert_eq!(json["balances"].as_array().unwrap().len(), 3);
        assert_eq!(json["annotated"][0]["creditor_name"], "A");
        assert_eq!(
            json["annotated"][0]["payment_link"],
            "https://www.paypal.com/paypalme/a-pp"
        );
    }
}
