use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::PartyType;

/// One general-ledger line.
///
/// `debit`/`credit` are in company currency; the `_in_currency` columns are
/// in the account's own currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerPosting {
    pub account: String,
    pub account_currency: String,
    /// Currency of the payment as a whole.
    pub transaction_currency: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub debit_in_currency: Decimal,
    pub credit_in_currency: Decimal,
    /// Counterparty: the party if any, else a cash account of the payment.
    pub against: String,
    pub cost_center: Option<String>,
    pub party_type: Option<PartyType>,
    pub party: Option<String>,
}

impl LedgerPosting {
    pub fn debit(
        account: impl Into<String>,
        account_currency: impl Into<String>,
        base: Decimal,
        in_currency: Decimal,
    ) -> Self {
        Self::new(account, account_currency, base, Decimal::ZERO, in_currency, Decimal::ZERO)
    }

    pub fn credit(
        account: impl Into<String>,
        account_currency: impl Into<String>,
        base: Decimal,
        in_currency: Decimal,
    ) -> Self {
        Self::new(account, account_currency, Decimal::ZERO, base, Decimal::ZERO, in_currency)
    }

    fn new(
        account: impl Into<String>,
        account_currency: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
        debit_in_currency: Decimal,
        credit_in_currency: Decimal,
    ) -> Self {
        Self {
            account: account.into(),
            account_currency: account_currency.into(),
            transaction_currency: String::new(),
            debit,
            credit,
            debit_in_currency,
            credit_in_currency,
            against: String::new(),
            cost_center: None,
            party_type: None,
            party: None,
        }
    }

    pub fn against(mut self, against: impl Into<String>) -> Self {
        self.against = against.into();
        self
    }

    pub fn cost_center(mut self, cost_center: Option<String>) -> Self {
        self.cost_center = cost_center;
        self
    }

    pub fn party(mut self, party_type: Option<PartyType>, party: Option<String>) -> Self {
        self.party_type = party_type;
        self.party = party;
        self
    }

    /// Debit minus credit in company currency.
    pub fn net(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// Column sums of a posting set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostingTotals {
    pub debit: Decimal,
    pub credit: Decimal,
    pub debit_in_currency: Decimal,
    pub credit_in_currency: Decimal,
}

impl PostingTotals {
    pub fn of(postings: &[LedgerPosting]) -> Self {
        postings.iter().fold(Self::default(), |acc, p| Self {
            debit: acc.debit + p.debit,
            credit: acc.credit + p.credit,
            debit_in_currency: acc.debit_in_currency + p.debit_in_currency,
            credit_in_currency: acc.credit_in_currency + p.credit_in_currency,
        })
    }
}

/// Company-currency debit minus credit. Zero for a balanced set.
pub fn imbalance(postings: &[LedgerPosting]) -> Decimal {
    postings.iter().map(LedgerPosting::net).sum()
}

/// Whether debits equal credits in company currency.
pub fn is_balanced(postings: &[LedgerPosting]) -> bool {
    imbalance(postings).is_zero()
}
