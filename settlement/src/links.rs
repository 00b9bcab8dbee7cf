//! Payment link annotation
//!
//! Resolves each transfer's creditor to a payment-collection URL. A creditor
//! without a handle, or one missing from the participant list, gets no link.

use crate::types::{AnnotatedTransaction, Participant, ParticipantId, PaymentLink, Transaction};
use std::collections::HashMap;

/// Payment link resolver
#[derive(Debug, Clone)]
pub struct PaymentLinkResolver {
    base_url: String,
}

impl PaymentLinkResolver {
    /// Create resolver for links under `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Link for a participant, if they have a handle
    pub fn link_for(&self, participant: &Participant) -> Option<PaymentLink> {
        participant
            .payment_handle()
            .map(|handle| PaymentLink::new(&self.base_url, handle))
    }

    /// Attach creditor links to transfers, preserving order
    pub fn annotate(
        &self,
        transactions: &[Transaction],
        participants: &[Participant],
    ) -> Vec<AnnotatedTransaction> {
        let by_id: HashMap<ParticipantId, &Participant> =
            participants.iter().map(|p| (p.id, p)).collect();

        transactions
            .iter()
            .map(|tx| AnnotatedTransaction {
                transaction: tx.clone(),
                payment_link: by_id
                    .get(&tx.creditor)
                    .and_then(|creditor| self.link_for(creditor)),
            })
            .collect()
    }
}

impl Default for PaymentLinkResolver {
    fn default() -> Self {
        Self::new(crate::config::LinkConfig::default().base_url)
    }
}
