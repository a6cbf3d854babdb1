use crate::core::{PaymentDocument, PaymentType};

use super::posting::LedgerPosting;

/// Extension points of the GL map builder.
///
/// The builder owns the bank leg and the tax postings; everything else comes
/// from these hooks, called in order: party, deductions, regional.
pub trait LedgerHooks {
    /// Party-side postings for the gross amount settled with the party.
    fn party_entries(&self, doc: &PaymentDocument) -> Vec<LedgerPosting>;

    /// Non-tax deductions such as bank charges or write-offs.
    fn deduction_entries(&self, _doc: &PaymentDocument) -> Vec<LedgerPosting> {
        Vec::new()
    }

    /// Jurisdiction extensions appended after the tax postings.
    fn regional_entries(&self, _doc: &PaymentDocument) -> Vec<LedgerPosting> {
        Vec::new()
    }
}

/// Posts the gross party leg and nothing else.
///
/// `Pay` debits the paid-to account with the base paid amount, `Receive`
/// credits the paid-from account with the base received amount. Internal
/// transfers have no party leg.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardHooks;

impl LedgerHooks for StandardHooks {
    fn party_entries(&self, doc: &PaymentDocument) -> Vec<LedgerPosting> {
        let posting = match doc.payment_type {
            PaymentType::Pay => LedgerPosting::debit(
                &doc.paid_to,
                &doc.paid_to_account_currency,
                doc.base_paid_amount,
                doc.received_amount,
            )
            .against(&doc.paid_from),
            PaymentType::Receive => LedgerPosting::credit(
                &doc.paid_from,
                &doc.paid_from_account_currency,
                doc.base_received_amount,
                doc.paid_amount,
            )
            .against(&doc.paid_to),
            PaymentType::InternalTransfer => return Vec::new(),
        };

        vec![
            posting
                .party(doc.party_type.clone(), doc.party.clone())
                .cost_center(doc.cost_center.clone()),
        ]
    }
}
