//! Jurisdiction configuration: company account heads, tax templates,
//! withholding sections, and the read-only source they are looked up from.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{FilerStatus, PaymentType, TaxTag};

/// Tax-related settings of a company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanySettings {
    pub name: String,
    /// ISO 4217 company currency, normally "PKR".
    pub default_currency: String,
    /// Sales tax input/output account.
    pub sales_tax_account: Option<String>,
    pub further_tax_account: Option<String>,
    /// Freight charged to customers on sales invoices.
    pub freight_expense_account: Option<String>,
    /// Freight borne on purchase invoices.
    pub freight_on_purchase_account: Option<String>,
    pub cost_center: Option<String>,
}

/// Builder for [`CompanySettings`].
///
/// ```
/// use mahsool::core::CompanySettingsBuilder;
///
/// let company = CompanySettingsBuilder::new("ACME Traders")
///     .sales_tax_account("Sales Tax Payable - AT")
///     .cost_center("Main - AT")
///     .build();
/// assert_eq!(company.default_currency, "PKR");
/// ```
pub struct CompanySettingsBuilder {
    settings: CompanySettings,
}

impl CompanySettingsBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            settings: CompanySettings {
                name: name.into(),
                default_currency: "PKR".into(),
                ..Default::default()
            },
        }
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.settings.default_currency = code.into();
        self
    }

    pub fn sales_tax_account(mut self, account: impl Into<String>) -> Self {
        self.settings.sales_tax_account = Some(account.into());
        self
    }

    pub fn further_tax_account(mut self, account: impl Into<String>) -> Self {
        self.settings.further_tax_account = Some(account.into());
        self
    }

    pub fn freight_expense_account(mut self, account: impl Into<String>) -> Self {
        self.settings.freight_expense_account = Some(account.into());
        self
    }

    pub fn freight_on_purchase_account(mut self, account: impl Into<String>) -> Self {
        self.settings.freight_on_purchase_account = Some(account.into());
        self
    }

    pub fn cost_center(mut self, cost_center: impl Into<String>) -> Self {
        self.settings.cost_center = Some(cost_center.into());
        self
    }

    pub fn build(self) -> CompanySettings {
        self.settings
    }
}

/// A withholding tax section of the Income Tax Ordinance, e.g. "153(1)(a)".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhtSection {
    pub name: String,
    /// Payable (collection) account head.
    pub account_head: String,
    pub tax_receivable_account_head: String,
    pub active_tax_payer_rate: Decimal,
    pub inactive_tax_payer_rate: Decimal,
}

impl WhtSection {
    /// Rate for a filer status; an unknown status withholds nothing.
    pub fn rate_for(&self, status: Option<FilerStatus>) -> Decimal {
        match status {
            Some(FilerStatus::Active) => self.active_tax_payer_rate,
            Some(FilerStatus::InActive) => self.inactive_tax_payer_rate,
            None => Decimal::ZERO,
        }
    }

    /// Account the withheld amount is booked to.
    pub fn account_for(&self, payment_type: PaymentType) -> &str {
        match payment_type {
            PaymentType::Pay => &self.tax_receivable_account_head,
            PaymentType::Receive | PaymentType::InternalTransfer => &self.account_head,
        }
    }
}

/// A sales taxes and charges template line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLine {
    pub account_head: String,
    pub rate: Decimal,
    pub tag: Option<TaxTag>,
    pub description: Option<String>,
}

/// Document-level taxes and charges template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxTemplate {
    pub name: String,
    pub lines: Vec<TemplateLine>,
}

impl TaxTemplate {
    /// First line carrying `tag`.
    pub fn line_for(&self, tag: TaxTag) -> Option<&TemplateLine> {
        self.lines.iter().find(|l| l.tag == Some(tag))
    }
}

/// Item-level tax template line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTaxLine {
    /// Account the tax is booked to.
    pub tax_type: String,
    pub tax_rate: Decimal,
    pub tag: Option<TaxTag>,
}

/// Item tax template, attached to an item or item group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTaxTemplate {
    pub name: String,
    pub lines: Vec<ItemTaxLine>,
}

/// Read-only lookups into host configuration.
///
/// Every method is a pure lookup by name; a missing record is `None` (or an
/// empty list), never an error.
pub trait ConfigSource {
    fn company(&self, name: &str) -> Option<CompanySettings>;

    fn tax_template(&self, name: &str) -> Option<TaxTemplate>;

    fn item_tax_template(&self, name: &str) -> Option<ItemTaxTemplate>;

    /// Batch lookup. Unknown names are left out of the result.
    fn wht_sections(&self, names: &[&str]) -> Vec<WhtSection>;

    /// Default withholding section configured on a supplier.
    fn supplier_wht_section(&self, supplier: &str) -> Option<String>;

    /// Currency an account is denominated in.
    fn account_currency(&self, account: &str) -> Option<String>;
}

/// In-memory configuration, loadable with serde.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryConfig {
    pub companies: BTreeMap<String, CompanySettings>,
    pub tax_templates: BTreeMap<String, TaxTemplate>,
    pub item_tax_templates: BTreeMap<String, ItemTaxTemplate>,
    pub wht_sections: BTreeMap<String, WhtSection>,
    /// Supplier name to default withholding section.
    pub supplier_wht_sections: BTreeMap<String, String>,
    /// Account name to currency.
    pub account_currencies: BTreeMap<String, String>,
}

impl InMemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_company(mut self, company: CompanySettings) -> Self {
        self.companies.insert(company.name.clone(), company);
        self
    }

    pub fn with_tax_template(mut self, template: TaxTemplate) -> Self {
        self.tax_templates.insert(template.name.clone(), template);
        self
    }

    pub fn with_item_tax_template(mut self, template: ItemTaxTemplate) -> Self {
        self.item_tax_templates.insert(template.name.clone(), template);
        self
    }

    pub fn with_wht_section(mut self, section: WhtSection) -> Self {
        self.wht_sections.insert(section.name.clone(), section);
        self
    }

    pub fn with_supplier_section(
        mut self,
        supplier: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        self.supplier_wht_sections
            .insert(supplier.into(), section.into());
        self
    }

    pub fn with_account_currency(
        mut self,
        account: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        self.account_currencies
            .insert(account.into(), currency.into());
        self
    }
}

impl ConfigSource for InMemoryConfig {
    fn company(&self, name: &str) -> Option<CompanySettings> {
        self.companies.get(name).cloned()
    }

    fn tax_template(&self, name: &str) -> Option<TaxTemplate> {
        self.tax_templates.get(name).cloned()
    }

    fn item_tax_template(&self, name: &str) -> Option<ItemTaxTemplate> {
        self.item_tax_templates.get(name).cloned()
    }

    fn wht_sections(&self, names: &[&str]) -> Vec<WhtSection> {
        names
            .iter()
            .filter_map(|n| self.wht_sections.get(*n).cloned())
            .collect()
    }

    fn supplier_wht_section(&self, supplier: &str) -> Option<String> {
        self.supplier_wht_sections.get(supplier).cloned()
    }

    fn account_currency(&self, account: &str) -> Option<String> {
        self.account_currencies.get(account).cloned()
    }
}
