//! Rate and account resolution on top of a [`ConfigSource`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::config::{ConfigSource, TemplateLine, WhtSection};
use super::error::SkipReason;
use super::types::{FilerStatus, TaxTag};

/// Company account heads relevant to tax rows. `None` means the feature is
/// inactive for the company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyAccounts {
    pub sales_tax: Option<String>,
    pub further_tax: Option<String>,
    pub freight_on_sales: Option<String>,
    pub freight_on_purchase: Option<String>,
    pub cost_center: Option<String>,
}

impl CompanyAccounts {
    /// Account configured for a tag, if any.
    pub fn account_for(&self, tag: TaxTag) -> Option<&str> {
        match tag {
            TaxTag::SalesTax => self.sales_tax.as_deref(),
            TaxTag::FurtherSalesTax => self.further_tax.as_deref(),
            TaxTag::AdvanceTax236G | TaxTag::Freight | TaxTag::Withholding => None,
        }
    }
}

/// Pure lookups used by the builders. Never mutates, never fails.
pub struct Resolver<'a, C: ConfigSource + ?Sized> {
    config: &'a C,
}

impl<'a, C: ConfigSource + ?Sized> Resolver<'a, C> {
    pub fn new(config: &'a C) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a C {
        self.config
    }

    /// Account heads of a company. A company missing from configuration
    /// yields all-`None` accounts.
    pub fn company_accounts(&self, company: &str) -> CompanyAccounts {
        let Some(settings) = self.config.company(company) else {
            log::warn!("company '{company}' has no tax configuration; tax rows disabled");
            return CompanyAccounts::default();
        };
        CompanyAccounts {
            sales_tax: non_empty(settings.sales_tax_account),
            further_tax: non_empty(settings.further_tax_account),
            freight_on_sales: non_empty(settings.freight_expense_account),
            freight_on_purchase: non_empty(settings.freight_on_purchase_account),
            cost_center: non_empty(settings.cost_center),
        }
    }

    pub fn company_currency(&self, company: &str) -> Option<String> {
        self.config
            .company(company)
            .map(|c| c.default_currency)
            .filter(|c| !c.is_empty())
    }

    /// The 236G line of a taxes and charges template. Lines with a zero rate
    /// or no account do not count.
    pub fn advance_tax_line(&self, template: &str) -> Result<TemplateLine, SkipReason> {
        let Some(tpl) = self.config.tax_template(template) else {
            return Err(SkipReason::TemplateNotFound {
                template: template.to_string(),
            });
        };
        tpl.line_for(TaxTag::AdvanceTax236G)
            .filter(|l| !l.rate.is_zero() && !l.account_head.is_empty())
            .cloned()
            .ok_or(SkipReason::TemplateLineMissing {
                template: template.to_string(),
                tag: TaxTag::AdvanceTax236G,
            })
    }

    /// Default withholding section of a supplier.
    pub fn supplier_default_section(&self, supplier: &str) -> Option<String> {
        non_empty(self.config.supplier_wht_section(supplier))
    }

    /// Batch-resolve withholding sections by name.
    pub fn wht_sections<'n, I>(&self, names: I) -> BTreeMap<String, WhtSection>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let mut wanted: Vec<&str> = names.into_iter().collect();
        wanted.sort_unstable();
        wanted.dedup();
        if wanted.is_empty() {
            return BTreeMap::new();
        }
        self.config
            .wht_sections(&wanted)
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect()
    }

    /// Rate applicable to a party of the given filer status. Unknown status
    /// resolves to zero.
    pub fn applicable_rate(&self, section: &WhtSection, status: Option<FilerStatus>) -> Decimal {
        section.rate_for(status)
    }

    /// Currency of an account; accounts unknown to configuration are taken
    /// to be in `company_currency`.
    pub fn account_currency(&self, account: &str, company_currency: &str) -> String {
        self.config
            .account_currency(account)
            .unwrap_or_else(|| company_currency.to_string())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
