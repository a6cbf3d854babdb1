use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::MahsoolError;
use super::types::*;

/// Builder for sales and purchase invoices.
///
/// ```
/// use mahsool::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let doc = TaxableDocumentBuilder::new(
///     "ACC-SINV-2025-00001",
///     DocumentKind::SalesInvoice,
///     NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
///     "ACME Traders",
///     "Karachi Retail",
/// )
/// .add_item(LineItemBuilder::new("SOAP-100", dec!(10), "Nos", dec!(100))
///     .hs_code("3401.1100")
///     .taxes(dec!(18), dec!(180), dec!(0), dec!(0))
///     .build())
/// .build()
/// .unwrap();
/// assert_eq!(doc.items[0].total_incl_tax, dec!(1180));
/// ```
pub struct TaxableDocumentBuilder {
    name: String,
    kind: DocumentKind,
    posting_date: NaiveDate,
    is_return: bool,
    submitted: bool,
    company: String,
    company_address: Option<String>,
    party: String,
    party_status: Option<RegistrationStatus>,
    purchase_type: Option<PurchaseType>,
    sales_tax_invoice: bool,
    tax_template: Option<String>,
    freight_amount: Decimal,
    freight_rule: Option<FreightRule>,
    items: Vec<LineItem>,
}

impl TaxableDocumentBuilder {
    pub fn new(
        name: impl Into<String>,
        kind: DocumentKind,
        posting_date: NaiveDate,
        company: impl Into<String>,
        party: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            posting_date,
            is_return: false,
            submitted: false,
            company: company.into(),
            company_address: None,
            party: party.into(),
            party_status: None,
            purchase_type: match kind {
                DocumentKind::PurchaseInvoice => Some(PurchaseType::Local),
                DocumentKind::SalesInvoice => None,
            },
            sales_tax_invoice: true,
            tax_template: None,
            freight_amount: Decimal::ZERO,
            freight_rule: None,
            items: Vec::new(),
        }
    }

    /// Mark as credit note (sales) or debit note (purchase).
    pub fn is_return(mut self, is_return: bool) -> Self {
        self.is_return = is_return;
        self
    }

    pub fn submitted(mut self) -> Self {
        self.submitted = true;
        self
    }

    pub fn company_address(mut self, address: impl Into<String>) -> Self {
        self.company_address = Some(address.into());
        self
    }

    pub fn party_status(mut self, status: RegistrationStatus) -> Self {
        self.party_status = Some(status);
        self
    }

    pub fn purchase_type(mut self, purchase_type: PurchaseType) -> Self {
        self.purchase_type = Some(purchase_type);
        self
    }

    pub fn sales_tax_invoice(mut self, flag: bool) -> Self {
        self.sales_tax_invoice = flag;
        self
    }

    pub fn tax_template(mut self, template: impl Into<String>) -> Self {
        self.tax_template = Some(template.into());
        self
    }

    pub fn freight(mut self, amount: Decimal, rule: Option<FreightRule>) -> Self {
        self.freight_amount = amount;
        self.freight_rule = rule;
        self
    }

    pub fn add_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn build(self) -> Result<TaxableDocument, MahsoolError> {
        if self.name.trim().is_empty() {
            return Err(MahsoolError::Builder("document name is required".into()));
        }
        if self.company.trim().is_empty() {
            return Err(MahsoolError::Builder("company is required".into()));
        }
        if self.items.len() > 10_000 {
            return Err(MahsoolError::Builder(
                "document cannot have more than 10,000 items".into(),
            ));
        }
        if self.freight_amount.is_sign_negative() {
            return Err(MahsoolError::Builder(
                "freight amount must not be negative".into(),
            ));
        }

        Ok(TaxableDocument {
            name: self.name,
            kind: self.kind,
            posting_date: self.posting_date,
            is_return: self.is_return,
            submitted: self.submitted,
            company: self.company,
            company_address: self.company_address,
            party: self.party,
            party_status: self.party_status,
            purchase_type: self.purchase_type,
            sales_tax_invoice: self.sales_tax_invoice,
            tax_template: self.tax_template,
            freight_amount: self.freight_amount,
            freight_rule: self.freight_rule,
            items: self.items,
            tax_rows: Vec::new(),
        })
    }
}

/// Builder for LineItem. Net amount defaults to `qty * rate`.
pub struct LineItemBuilder {
    item_code: String,
    item_group: Option<String>,
    hs_code: Option<String>,
    schedule: GoodsSchedule,
    qty: Decimal,
    uom: String,
    rate: Decimal,
    amount: Option<Decimal>,
    st_rate: Decimal,
    st: Decimal,
    ft_rate: Decimal,
    further_tax: Decimal,
    fixed_notified_value: Option<Decimal>,
    retail_price: Option<Decimal>,
    item_tax_template: Option<String>,
}

impl LineItemBuilder {
    pub fn new(
        item_code: impl Into<String>,
        qty: Decimal,
        uom: impl Into<String>,
        rate: Decimal,
    ) -> Self {
        Self {
            item_code: item_code.into(),
            item_group: None,
            hs_code: None,
            schedule: GoodsSchedule::Standard,
            qty,
            uom: uom.into(),
            rate,
            amount: None,
            st_rate: Decimal::ZERO,
            st: Decimal::ZERO,
            ft_rate: Decimal::ZERO,
            further_tax: Decimal::ZERO,
            fixed_notified_value: None,
            retail_price: None,
            item_tax_template: None,
        }
    }

    pub fn item_group(mut self, group: impl Into<String>) -> Self {
        self.item_group = Some(group.into());
        self
    }

    pub fn hs_code(mut self, code: impl Into<String>) -> Self {
        self.hs_code = Some(code.into());
        self
    }

    /// Override the net amount computed from quantity and rate.
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set already-computed item-level taxes.
    pub fn taxes(
        mut self,
        st_rate: Decimal,
        st: Decimal,
        ft_rate: Decimal,
        further_tax: Decimal,
    ) -> Self {
        self.st_rate = st_rate;
        self.st = st;
        self.ft_rate = ft_rate;
        self.further_tax = further_tax;
        self
    }

    /// Third Schedule goods with their notified value and printed retail price.
    pub fn third_schedule(
        mut self,
        fixed_notified_value: Option<Decimal>,
        retail_price: Option<Decimal>,
    ) -> Self {
        self.schedule = GoodsSchedule::ThirdSchedule;
        self.fixed_notified_value = fixed_notified_value;
        self.retail_price = retail_price;
        self
    }

    pub fn item_tax_template(mut self, template: impl Into<String>) -> Self {
        self.item_tax_template = Some(template.into());
        self
    }

    pub fn build(self) -> LineItem {
        let amount = self.amount.unwrap_or(self.qty * self.rate);
        LineItem {
            item_code: self.item_code,
            item_group: self.item_group,
            hs_code: self.hs_code,
            schedule: self.schedule,
            qty: self.qty,
            uom: self.uom,
            rate: self.rate,
            amount,
            st_rate: self.st_rate,
            st: self.st,
            ft_rate: self.ft_rate,
            further_tax: self.further_tax,
            total_incl_tax: amount + self.st + self.further_tax,
            fixed_notified_value: self.fixed_notified_value,
            retail_price: self.retail_price,
            item_tax_template: self.item_tax_template,
        }
    }
}

/// Builder for payments. Base amounts are derived from the exchange rates.
///
/// ```
/// use mahsool::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let pe = PaymentDocumentBuilder::new(
///     "ACC-PAY-2025-00001",
///     PaymentType::Pay,
///     NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
///     "ACME Traders",
///     "PKR",
/// )
/// .party(PartyType::Supplier, "Lahore Steel")
/// .paid_from("Meezan Bank - AT", "PKR")
/// .paid_to("Creditors - AT", "PKR")
/// .amounts(dec!(10000), dec!(10000))
/// .build()
/// .unwrap();
/// assert_eq!(pe.base_paid_amount, dec!(10000));
/// ```
pub struct PaymentDocumentBuilder {
    name: String,
    payment_type: PaymentType,
    posting_date: NaiveDate,
    company: String,
    company_currency: String,
    party_type: Option<PartyType>,
    party: Option<String>,
    party_filer_status: Option<FilerStatus>,
    paid_from: Option<(String, String)>,
    paid_to: Option<(String, String)>,
    paid_amount: Decimal,
    received_amount: Decimal,
    source_exchange_rate: Decimal,
    target_exchange_rate: Decimal,
    cost_center: Option<String>,
    references: Vec<AllocationRef>,
    tax_rows: Vec<TaxRow>,
}

impl PaymentDocumentBuilder {
    pub fn new(
        name: impl Into<String>,
        payment_type: PaymentType,
        posting_date: NaiveDate,
        company: impl Into<String>,
        company_currency: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            payment_type,
            posting_date,
            company: company.into(),
            company_currency: company_currency.into(),
            party_type: None,
            party: None,
            party_filer_status: None,
            paid_from: None,
            paid_to: None,
            paid_amount: Decimal::ZERO,
            received_amount: Decimal::ZERO,
            source_exchange_rate: Decimal::ONE,
            target_exchange_rate: Decimal::ONE,
            cost_center: None,
            references: Vec::new(),
            tax_rows: Vec::new(),
        }
    }

    pub fn party(mut self, party_type: PartyType, party: impl Into<String>) -> Self {
        self.party_type = Some(party_type);
        self.party = Some(party.into());
        self
    }

    pub fn filer_status(mut self, status: FilerStatus) -> Self {
        self.party_filer_status = Some(status);
        self
    }

    pub fn paid_from(mut self, account: impl Into<String>, currency: impl Into<String>) -> Self {
        self.paid_from = Some((account.into(), currency.into()));
        self
    }

    pub fn paid_to(mut self, account: impl Into<String>, currency: impl Into<String>) -> Self {
        self.paid_to = Some((account.into(), currency.into()));
        self
    }

    pub fn amounts(mut self, paid: Decimal, received: Decimal) -> Self {
        self.paid_amount = paid;
        self.received_amount = received;
        self
    }

    pub fn exchange_rates(mut self, source: Decimal, target: Decimal) -> Self {
        self.source_exchange_rate = source;
        self.target_exchange_rate = target;
        self
    }

    pub fn cost_center(mut self, cost_center: impl Into<String>) -> Self {
        self.cost_center = Some(cost_center.into());
        self
    }

    pub fn add_reference(mut self, reference: AllocationRef) -> Self {
        self.references.push(reference);
        self
    }

    pub fn add_tax_row(mut self, row: TaxRow) -> Self {
        self.tax_rows.push(row);
        self
    }

    /// Build the payment and compute its tax totals.
    pub fn build(self) -> Result<PaymentDocument, MahsoolError> {
        let (paid_from, paid_from_account_currency) = self
            .paid_from
            .ok_or_else(|| MahsoolError::Builder("paid_from account is required".into()))?;
        let (paid_to, paid_to_account_currency) = self
            .paid_to
            .ok_or_else(|| MahsoolError::Builder("paid_to account is required".into()))?;

        if self.paid_amount.is_sign_negative() || self.received_amount.is_sign_negative() {
            return Err(MahsoolError::Builder(
                "paid and received amounts must not be negative".into(),
            ));
        }
        if self.source_exchange_rate <= Decimal::ZERO
            || self.target_exchange_rate <= Decimal::ZERO
        {
            return Err(MahsoolError::Builder(
                "exchange rates must be positive".into(),
            ));
        }
        if matches!(self.payment_type, PaymentType::Pay | PaymentType::Receive)
            && self.party.is_none()
        {
            return Err(MahsoolError::Builder(
                "party is required for Pay and Receive".into(),
            ));
        }

        let mut doc = PaymentDocument {
            name: self.name,
            payment_type: self.payment_type,
            posting_date: self.posting_date,
            company: self.company,
            company_currency: self.company_currency,
            party_type: self.party_type,
            party: self.party,
            party_filer_status: self.party_filer_status,
            paid_from,
            paid_from_account_currency,
            paid_to,
            paid_to_account_currency,
            paid_amount: self.paid_amount,
            received_amount: self.received_amount,
            base_paid_amount: round_half_up(self.paid_amount * self.source_exchange_rate, 2),
            base_received_amount: round_half_up(
                self.received_amount * self.target_exchange_rate,
                2,
            ),
            source_exchange_rate: self.source_exchange_rate,
            target_exchange_rate: self.target_exchange_rate,
            total_taxes_and_charges: Decimal::ZERO,
            base_total_taxes_and_charges: Decimal::ZERO,
            cost_center: self.cost_center,
            references: self.references,
            tax_rows: self.tax_rows,
        };
        doc.calculate_taxes();
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn line_amount_defaults_to_qty_times_rate() {
        let line = LineItemBuilder::new("A", dec!(3), "Kg", dec!(12.5)).build();
        assert_eq!(line.amount, dec!(37.5));
        assert_eq!(line.total_incl_tax, dec!(37.5));
    }

    #[test]
    fn purchase_defaults_to_local() {
        let doc =
            TaxableDocumentBuilder::new("P-1", DocumentKind::PurchaseInvoice, date(), "C", "S")
                .build()
                .unwrap();
        assert_eq!(doc.purchase_type, Some(PurchaseType::Local));
        assert!(doc.sales_tax_invoice);
    }

    #[test]
    fn empty_name_rejected() {
        let err = TaxableDocumentBuilder::new(" ", DocumentKind::SalesInvoice, date(), "C", "B")
            .build()
            .unwrap_err();
        assert!(matches!(err, MahsoolError::Builder(_)));
    }

    #[test]
    fn payment_requires_accounts() {
        let err =
            PaymentDocumentBuilder::new("PE-1", PaymentType::InternalTransfer, date(), "C", "PKR")
                .paid_to("Cash - C", "PKR")
                .build()
                .unwrap_err();
        assert!(err.to_string().contains("paid_from"));
    }

    #[test]
    fn payment_base_amounts_follow_exchange_rate() {
        let pe = PaymentDocumentBuilder::new("PE-2", PaymentType::Receive, date(), "C", "PKR")
            .party(PartyType::Customer, "Buyer")
            .paid_from("Debtors - C", "PKR")
            .paid_to("USD Bank - C", "USD")
            .amounts(dec!(280000), dec!(1000))
            .exchange_rates(dec!(1), dec!(280))
            .build()
            .unwrap();
        assert_eq!(pe.base_received_amount, dec!(280000));
        assert_eq!(pe.document_currency(), "USD");
    }

    #[test]
    fn deducted_rows_count_positive_in_tax_total() {
        let pe = PaymentDocumentBuilder::new("PE-3", PaymentType::Pay, date(), "C", "PKR")
            .party(PartyType::Supplier, "S")
            .paid_from("Bank - C", "PKR")
            .paid_to("Creditors - C", "PKR")
            .amounts(dec!(10000), dec!(10000))
            .add_tax_row(
                TaxRow::actual("WHT - C", "153", dec!(500), TaxTag::Withholding).deducted(),
            )
            .add_tax_row(TaxRow::actual("Charges - C", "bank", dec!(50), TaxTag::Withholding))
            .build()
            .unwrap();
        assert_eq!(pe.total_taxes_and_charges, dec!(450));
        assert_eq!(pe.base_total_taxes_and_charges, dec!(450));
    }
}
