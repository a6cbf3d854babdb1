use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sales or purchase side of a taxable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Outgoing invoice (Annex C).
    SalesInvoice,
    /// Incoming invoice (Annex A).
    PurchaseInvoice,
}

impl DocumentKind {
    /// Host platform doctype name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SalesInvoice => "Sales Invoice",
            Self::PurchaseInvoice => "Purchase Invoice",
        }
    }

    /// Label of the return variant (credit note on sales, debit note on purchases).
    pub fn return_label(&self) -> &'static str {
        match self {
            Self::SalesInvoice => "Credit Note",
            Self::PurchaseInvoice => "Debit Note",
        }
    }

    /// Document type label as printed on FBR annexures.
    pub fn document_type(&self, is_return: bool) -> &'static str {
        if is_return {
            self.return_label()
        } else {
            self.label()
        }
    }
}

/// Tax category tag carried by tax rows and template lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxTag {
    /// Sales tax on supplies (Sales Tax Act 1990, s.3).
    SalesTax,
    /// Further tax on supplies to unregistered persons (s.3(1A)).
    FurtherSalesTax,
    /// Advance income tax collected at sale (Income Tax Ordinance s.236G).
    AdvanceTax236G,
    /// Freight charged on the invoice.
    Freight,
    /// Income tax withheld on payment.
    Withholding,
}

impl TaxTag {
    /// Tag string used by the host platform.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SalesTax => "Sales Tax",
            Self::FurtherSalesTax => "Further Sales Tax",
            Self::AdvanceTax236G => "236G",
            Self::Freight => "Freight",
            Self::Withholding => "Withholding Tax",
        }
    }

    /// Parse from the host platform tag string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Sales Tax" => Some(Self::SalesTax),
            "Further Sales Tax" => Some(Self::FurtherSalesTax),
            "236G" => Some(Self::AdvanceTax236G),
            "Freight" => Some(Self::Freight),
            "Withholding Tax" => Some(Self::Withholding),
            _ => None,
        }
    }
}

/// How a tax row amount is derived by the host totals engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeType {
    /// Fixed amount; every row this crate generates uses it.
    Actual,
    /// Percentage of the net total.
    OnNetTotal,
    /// Percentage of the previous row amount.
    OnPreviousRowAmount,
    /// Percentage of the previous row total.
    OnPreviousRowTotal,
}

impl ChargeType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Actual => "Actual",
            Self::OnNetTotal => "On Net Total",
            Self::OnPreviousRowAmount => "On Previous Row Amount",
            Self::OnPreviousRowTotal => "On Previous Row Total",
        }
    }
}

/// Whether a tax row adds to or deducts from the document total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddDeduct {
    Add,
    Deduct,
}

/// What a tax row counts towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowCategory {
    Total,
    Valuation,
    ValuationAndTotal,
}

/// A document-level tax row. Always derived; rebuilt on every recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRow {
    pub charge_type: ChargeType,
    /// Ledger account the tax is posted to.
    pub account_head: String,
    pub description: String,
    /// Template rate, informational for `Actual` rows.
    pub rate: Decimal,
    /// Signed amount in document currency.
    pub tax_amount: Decimal,
    /// Amount in company currency (set by the payment tax recompute).
    pub base_tax_amount: Decimal,
    pub tag: Option<TaxTag>,
    pub category: RowCategory,
    pub add_deduct: AddDeduct,
    pub cost_center: Option<String>,
}

impl TaxRow {
    /// An `Actual` row counted in the total and added to it.
    pub fn actual(
        account_head: impl Into<String>,
        description: impl Into<String>,
        tax_amount: Decimal,
        tag: TaxTag,
    ) -> Self {
        Self {
            charge_type: ChargeType::Actual,
            account_head: account_head.into(),
            description: description.into(),
            rate: Decimal::ZERO,
            tax_amount,
            base_tax_amount: tax_amount,
            tag: Some(tag),
            category: RowCategory::Total,
            add_deduct: AddDeduct::Add,
            cost_center: None,
        }
    }

    pub fn with_cost_center(mut self, cost_center: Option<String>) -> Self {
        self.cost_center = cost_center;
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.rate = rate;
        self
    }

    pub fn deducted(mut self) -> Self {
        self.add_deduct = AddDeduct::Deduct;
        self
    }
}

/// Local purchase or import (imports are assessed at customs, not on the invoice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseType {
    Local,
    Import,
}

/// Who bears freight on the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreightRule {
    PaidByCustomer,
    PaidByCompany,
}

/// Sales-tax registration of a party with FBR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Registered,
    Unregistered,
}

impl RegistrationStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Registered => "Registered",
            Self::Unregistered => "Unregistered",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Registered" => Some(Self::Registered),
            "Unregistered" => Some(Self::Unregistered),
            _ => None,
        }
    }
}

/// Valuation schedule of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GoodsSchedule {
    /// Taxed on transaction value.
    #[default]
    Standard,
    /// Third Schedule goods, taxed on notified or printed retail price.
    ThirdSchedule,
}

/// An invoice line with its item-level tax fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_code: String,
    /// Item group, reported as the sale/purchase type.
    pub item_group: Option<String>,
    /// PCT / HS classification code, e.g. "8517.6200".
    pub hs_code: Option<String>,
    pub schedule: GoodsSchedule,
    pub qty: Decimal,
    pub uom: String,
    /// Unit price.
    pub rate: Decimal,
    /// Net amount excluding tax (signed, negative on returns).
    pub amount: Decimal,
    pub st_rate: Decimal,
    /// Sales tax amount.
    pub st: Decimal,
    pub ft_rate: Decimal,
    pub further_tax: Decimal,
    pub total_incl_tax: Decimal,
    pub fixed_notified_value: Option<Decimal>,
    pub retail_price: Option<Decimal>,
    pub item_tax_template: Option<String>,
}

/// A sales or purchase invoice (or its return).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxableDocument {
    pub name: String,
    pub kind: DocumentKind,
    pub posting_date: NaiveDate,
    pub is_return: bool,
    /// Submitted documents are final and eligible for annexures.
    pub submitted: bool,
    pub company: String,
    pub company_address: Option<String>,
    /// Customer or supplier name.
    pub party: String,
    /// Registration of the counterparty as captured on the document.
    pub party_status: Option<RegistrationStatus>,
    pub purchase_type: Option<PurchaseType>,
    /// Whether the document is issued as a sales-tax invoice.
    pub sales_tax_invoice: bool,
    /// Sales taxes and charges template carrying the 236G line.
    pub tax_template: Option<String>,
    pub freight_amount: Decimal,
    pub freight_rule: Option<FreightRule>,
    pub items: Vec<LineItem>,
    pub tax_rows: Vec<TaxRow>,
}

impl TaxableDocument {
    /// -1 for credit/debit notes, +1 otherwise.
    pub fn multiplier(&self) -> Decimal {
        if self.is_return {
            Decimal::NEGATIVE_ONE
        } else {
            Decimal::ONE
        }
    }

    /// Sum of all tax row amounts.
    pub fn total_taxes(&self) -> Decimal {
        self.tax_rows.iter().map(|r| r.tax_amount).sum()
    }
}

/// Direction of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    Pay,
    Receive,
    InternalTransfer,
}

/// Kind of counterparty on a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyType {
    Supplier,
    Customer,
    Employee,
    Shareholder,
    Other(String),
}

impl PartyType {
    /// Only supplier and customer payments carry withholding tax.
    pub fn is_wht_subject(&self) -> bool {
        matches!(self, Self::Supplier | Self::Customer)
    }
}

/// Filer status on the FBR Active Taxpayers List.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilerStatus {
    Active,
    InActive,
}

impl FilerStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::InActive => "InActive",
        }
    }

    /// Parse from the ATL status string. Anything else is an unknown status.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Active" => Some(Self::Active),
            "InActive" => Some(Self::InActive),
            _ => None,
        }
    }
}

/// Document type a payment reference points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceDoctype {
    PurchaseInvoice,
    SalesInvoice,
    PurchaseOrder,
    SalesOrder,
    JournalEntry,
}

impl ReferenceDoctype {
    /// Invoices are the only references withholding applies to.
    pub fn is_invoice(&self) -> bool {
        matches!(self, Self::PurchaseInvoice | Self::SalesInvoice)
    }
}

/// Allocation of a payment against one referenced document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRef {
    pub reference_doctype: ReferenceDoctype,
    pub reference_name: String,
    pub allocated_amount: Decimal,
    pub wht_section: Option<String>,
    pub wht_amount: Option<Decimal>,
    pub wht_rate: Option<Decimal>,
}

impl AllocationRef {
    pub fn new(
        reference_doctype: ReferenceDoctype,
        reference_name: impl Into<String>,
        allocated_amount: Decimal,
    ) -> Self {
        Self {
            reference_doctype,
            reference_name: reference_name.into(),
            allocated_amount,
            wht_section: None,
            wht_amount: None,
            wht_rate: None,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.wht_section = Some(section.into());
        self
    }
}

/// A cash movement: supplier payment, customer receipt or internal transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDocument {
    pub name: String,
    pub payment_type: PaymentType,
    pub posting_date: NaiveDate,
    pub company: String,
    pub company_currency: String,
    pub party_type: Option<PartyType>,
    pub party: Option<String>,
    pub party_filer_status: Option<FilerStatus>,
    pub paid_from: String,
    pub paid_from_account_currency: String,
    pub paid_to: String,
    pub paid_to_account_currency: String,
    pub paid_amount: Decimal,
    pub received_amount: Decimal,
    pub base_paid_amount: Decimal,
    pub base_received_amount: Decimal,
    /// Paid-from currency to company currency.
    pub source_exchange_rate: Decimal,
    /// Paid-to currency to company currency.
    pub target_exchange_rate: Decimal,
    /// Net tax withheld from the cash movement, in paid currency.
    pub total_taxes_and_charges: Decimal,
    pub base_total_taxes_and_charges: Decimal,
    pub cost_center: Option<String>,
    pub references: Vec<AllocationRef>,
    pub tax_rows: Vec<TaxRow>,
}

impl PaymentDocument {
    /// Recompute base amounts and tax totals after the tax rows changed.
    ///
    /// The total is the net amount withheld from the cash movement:
    /// deducted rows count positive, added rows negative.
    pub fn calculate_taxes(&mut self) {
        let mut net = Decimal::ZERO;
        for row in &mut self.tax_rows {
            row.base_tax_amount = row.tax_amount;
            match row.add_deduct {
                AddDeduct::Deduct => net += row.tax_amount,
                AddDeduct::Add => net -= row.tax_amount,
            }
        }

        let rate = match self.payment_type {
            PaymentType::Receive => self.target_exchange_rate,
            PaymentType::Pay | PaymentType::InternalTransfer => self.source_exchange_rate,
        };
        self.base_total_taxes_and_charges = net;
        self.total_taxes_and_charges = if rate.is_zero() || rate == Decimal::ONE {
            net
        } else {
            round_half_up(net / rate, 2)
        };
    }

    /// Transaction currency: the first cash account not in company currency,
    /// paid-from checked first.
    pub fn document_currency(&self) -> &str {
        if self.paid_from_account_currency != self.company_currency {
            &self.paid_from_account_currency
        } else if self.paid_to_account_currency != self.company_currency {
            &self.paid_to_account_currency
        } else {
            &self.company_currency
        }
    }
}

pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tax_tag_codes_roundtrip() {
        for tag in [
            TaxTag::SalesTax,
            TaxTag::FurtherSalesTax,
            TaxTag::AdvanceTax236G,
            TaxTag::Freight,
            TaxTag::Withholding,
        ] {
            assert_eq!(TaxTag::from_code(tag.code()), Some(tag));
        }
        assert_eq!(TaxTag::from_code("236 G"), None);
    }

    #[test]
    fn document_type_labels() {
        assert_eq!(DocumentKind::SalesInvoice.document_type(false), "Sales Invoice");
        assert_eq!(DocumentKind::SalesInvoice.document_type(true), "Credit Note");
        assert_eq!(DocumentKind::PurchaseInvoice.document_type(true), "Debit Note");
    }

    #[test]
    fn filer_status_unknown_is_none() {
        assert_eq!(FilerStatus::from_code("InActive"), Some(FilerStatus::InActive));
        assert_eq!(FilerStatus::from_code("inactive"), None);
        assert_eq!(FilerStatus::from_code(""), None);
    }

    #[test]
    fn only_supplier_and_customer_are_wht_subject() {
        assert!(PartyType::Supplier.is_wht_subject());
        assert!(PartyType::Customer.is_wht_subject());
        assert!(!PartyType::Employee.is_wht_subject());
        assert!(!PartyType::Other("Member".into()).is_wht_subject());
    }

    #[test]
    fn round_half_up_away_from_zero() {
        assert_eq!(round_half_up(dec!(2.345), 2), dec!(2.35));
        assert_eq!(round_half_up(dec!(-2.345), 2), dec!(-2.35));
    }
}
