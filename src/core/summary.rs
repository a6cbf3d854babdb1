//! Document-level tax summary from item-level tax fields.
//!
//! Replaces a document's tax rows with one row per tax kind:
//! Sales Tax, Further Sales Tax, 236G advance income tax and freight.
//! Running it twice on unchanged input yields identical rows.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::config::ConfigSource;
use super::error::SkipReason;
use super::resolver::{CompanyAccounts, Resolver};
use super::types::*;

/// Item-level totals a summary is built from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemTaxTotals {
    pub sales_tax: Decimal,
    pub further_tax: Decimal,
    pub tax_inclusive: Decimal,
}

impl ItemTaxTotals {
    pub fn from_items(items: &[LineItem]) -> Self {
        items.iter().fold(Self::default(), |acc, item| Self {
            sales_tax: acc.sales_tax + item.st,
            further_tax: acc.further_tax + item.further_tax,
            tax_inclusive: acc.tax_inclusive + item.total_incl_tax,
        })
    }
}

/// What a summary run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryOutcome {
    /// Tags of the rows written, in order.
    pub emitted: Vec<TaxTag>,
    /// Rows left out because configuration was missing.
    pub skipped: Vec<SkipReason>,
}

/// Rebuild `doc.tax_rows` from its items and company configuration.
///
/// Return documents negate every computed row. Freight is never negated and is
/// truncated to whole rupees. On purchase invoices, 236G rows already on the
/// document are carried forward untouched; on sales invoices 236G is computed
/// from the document's taxes and charges template.
///
/// The caller recomputes document totals afterwards.
pub fn apply_tax_summary<C: ConfigSource + ?Sized>(
    doc: &mut TaxableDocument,
    resolver: &Resolver<'_, C>,
) -> SummaryOutcome {
    let totals = ItemTaxTotals::from_items(&doc.items);
    let multiplier = doc.multiplier();
    let accounts = resolver.company_accounts(&doc.company);

    let mut rows = Vec::new();
    let mut outcome = SummaryOutcome::default();
    if resolver.config().company(&doc.company).is_none() {
        outcome.skipped.push(SkipReason::CompanyNotConfigured {
            company: doc.company.clone(),
        });
    }

    item_level_row(
        &mut rows,
        &mut outcome,
        &accounts,
        TaxTag::SalesTax,
        "Sales Tax (Item Level)",
        totals.sales_tax * multiplier,
    );
    item_level_row(
        &mut rows,
        &mut outcome,
        &accounts,
        TaxTag::FurtherSalesTax,
        "Further Tax (Item Level)",
        totals.further_tax * multiplier,
    );

    match doc.kind {
        DocumentKind::SalesInvoice => {
            if let Some(template) = &doc.tax_template {
                match resolver.advance_tax_line(template) {
                    Ok(line) => {
                        let amount = line.rate * dec!(0.01) * totals.tax_inclusive * multiplier;
                        rows.push(
                            TaxRow::actual(
                                line.account_head,
                                "Advance Income Tax (236G)",
                                amount,
                                TaxTag::AdvanceTax236G,
                            )
                            .with_cost_center(accounts.cost_center.clone()),
                        );
                        outcome.emitted.push(TaxTag::AdvanceTax236G);
                    }
                    Err(reason) => {
                        log::debug!("{}: 236G skipped: {reason}", doc.name);
                        outcome.skipped.push(reason);
                    }
                }
            }
        }
        DocumentKind::PurchaseInvoice => {
            for row in doc
                .tax_rows
                .iter()
                .filter(|r| r.tag == Some(TaxTag::AdvanceTax236G))
            {
                let mut kept = row.clone();
                if kept.cost_center.is_none() {
                    kept.cost_center = accounts.cost_center.clone();
                }
                rows.push(kept);
                outcome.emitted.push(TaxTag::AdvanceTax236G);
            }
        }
    }

    freight_row(doc, &accounts, &mut rows, &mut outcome);

    doc.tax_rows = rows;
    outcome
}

fn item_level_row(
    rows: &mut Vec<TaxRow>,
    outcome: &mut SummaryOutcome,
    accounts: &CompanyAccounts,
    tag: TaxTag,
    description: &str,
    amount: Decimal,
) {
    if amount.is_zero() {
        return;
    }
    match accounts.account_for(tag) {
        Some(account) => {
            rows.push(TaxRow::actual(account, description, amount, tag));
            outcome.emitted.push(tag);
        }
        None => {
            log::debug!("{} row skipped: no account configured", tag.code());
            outcome
                .skipped
                .push(SkipReason::AccountNotConfigured { tag });
        }
    }
}

fn freight_row(
    doc: &TaxableDocument,
    accounts: &CompanyAccounts,
    rows: &mut Vec<TaxRow>,
    outcome: &mut SummaryOutcome,
) {
    if doc.freight_amount <= Decimal::ZERO {
        return;
    }

    let (account, description) = match doc.kind {
        DocumentKind::SalesInvoice => {
            if doc.freight_rule != Some(FreightRule::PaidByCustomer) {
                outcome.skipped.push(SkipReason::FreightNotApplicable);
                return;
            }
            (
                accounts.freight_on_sales.as_deref(),
                "Freight (Paid by Customer)".to_string(),
            )
        }
        DocumentKind::PurchaseInvoice => (
            accounts.freight_on_purchase.as_deref(),
            format!("Freight (Paid by {})", doc.company),
        ),
    };

    let Some(account) = account else {
        outcome.skipped.push(SkipReason::AccountNotConfigured {
            tag: TaxTag::Freight,
        });
        return;
    };

    rows.push(
        TaxRow::actual(
            account,
            description,
            doc.freight_amount.trunc(),
            TaxTag::Freight,
        )
        .with_cost_center(accounts.cost_center.clone()),
    );
    outcome.emitted.push(TaxTag::Freight);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::*;
    use chrono::NaiveDate;

    fn config() -> InMemoryConfig {
        InMemoryConfig::new()
            .with_company(
                CompanySettingsBuilder::new("ACME")
                    .sales_tax_account("Sales Tax - A")
                    .further_tax_account("Further Tax - A")
                    .freight_expense_account("Freight Out - A")
                    .freight_on_purchase_account("Freight In - A")
                    .cost_center("Main - A")
                    .build(),
            )
            .with_tax_template(TaxTemplate {
                name: "Distributor".into(),
                lines: vec![TemplateLine {
                    account_head: "Advance Tax 236G - A".into(),
                    rate: dec!(0.5),
                    tag: Some(TaxTag::AdvanceTax236G),
                    description: None,
                }],
            })
    }

    fn item(amount: Decimal, st: Decimal, ft: Decimal) -> LineItem {
        LineItemBuilder::new("ITEM", dec!(1), "Nos", amount)
            .taxes(dec!(18), st, dec!(4), ft)
            .build()
    }

    fn sales_doc() -> TaxableDocument {
        TaxableDocumentBuilder::new(
            "SINV-0001",
            DocumentKind::SalesInvoice,
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            "ACME",
            "Buyer",
        )
        .tax_template("Distributor")
        .add_item(item(dec!(1000), dec!(180), dec!(40)))
        .build()
        .unwrap()
    }

    #[test]
    fn sales_rows_in_order() {
        let cfg = config();
        let mut doc = sales_doc();
        let outcome = apply_tax_summary(&mut doc, &Resolver::new(&cfg));

        assert_eq!(
            outcome.emitted,
            vec![
                TaxTag::SalesTax,
                TaxTag::FurtherSalesTax,
                TaxTag::AdvanceTax236G
            ]
        );
        assert_eq!(doc.tax_rows[0].tax_amount, dec!(180));
        assert_eq!(doc.tax_rows[1].tax_amount, dec!(40));
        // 0.5% of 1220
        assert_eq!(doc.tax_rows[2].tax_amount, dec!(6.1));
        assert_eq!(doc.tax_rows[2].cost_center.as_deref(), Some("Main - A"));
        assert!(doc.tax_rows.iter().all(|r| r.category == RowCategory::Total));
        assert!(doc.tax_rows.iter().all(|r| r.add_deduct == AddDeduct::Add));
    }

    #[test]
    fn zero_totals_emit_nothing() {
        let cfg = config();
        let mut doc = sales_doc();
        doc.tax_template = None;
        doc.items = vec![item(dec!(1000), dec!(0), dec!(0))];
        let outcome = apply_tax_summary(&mut doc, &Resolver::new(&cfg));
        assert!(doc.tax_rows.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn missing_account_is_skipped_not_failed() {
        let cfg = InMemoryConfig::new()
            .with_company(CompanySettingsBuilder::new("ACME").build());
        let mut doc = sales_doc();
        doc.tax_template = None;
        let outcome = apply_tax_summary(&mut doc, &Resolver::new(&cfg));
        assert!(doc.tax_rows.is_empty());
        assert_eq!(
            outcome.skipped,
            vec![
                SkipReason::AccountNotConfigured {
                    tag: TaxTag::SalesTax
                },
                SkipReason::AccountNotConfigured {
                    tag: TaxTag::FurtherSalesTax
                },
            ]
        );
    }

    #[test]
    fn freight_truncated_and_not_negated() {
        let cfg = config();
        let mut doc = sales_doc();
        doc.is_return = true;
        doc.freight_amount = dec!(250.75);
        doc.freight_rule = Some(FreightRule::PaidByCustomer);
        apply_tax_summary(&mut doc, &Resolver::new(&cfg));

        let freight = doc
            .tax_rows
            .iter()
            .find(|r| r.tag == Some(TaxTag::Freight))
            .unwrap();
        assert_eq!(freight.tax_amount, dec!(250));
        assert_eq!(freight.account_head, "Freight Out - A");
        assert_eq!(freight.description, "Freight (Paid by Customer)");
    }

    #[test]
    fn sales_freight_needs_customer_rule() {
        let cfg = config();
        let mut doc = sales_doc();
        doc.freight_amount = dec!(300);
        doc.freight_rule = Some(FreightRule::PaidByCompany);
        let outcome = apply_tax_summary(&mut doc, &Resolver::new(&cfg));
        assert!(!outcome.emitted.contains(&TaxTag::Freight));
        assert!(outcome.skipped.contains(&SkipReason::FreightNotApplicable));
    }

    #[test]
    fn purchase_preserves_manual_236g_and_ignores_template() {
        let cfg = config();
        let mut doc = TaxableDocumentBuilder::new(
            "PINV-0001",
            DocumentKind::PurchaseInvoice,
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            "ACME",
            "Supplier",
        )
        .tax_template("Distributor")
        .freight(dec!(99.9), None)
        .add_item(item(dec!(1000), dec!(180), dec!(0)))
        .build()
        .unwrap();
        doc.tax_rows.push(
            TaxRow::actual("Advance Tax 236G - A", "manual", dec!(12.34), TaxTag::AdvanceTax236G)
                .with_rate(dec!(1)),
        );

        apply_tax_summary(&mut doc, &Resolver::new(&cfg));
        assert_eq!(doc.tax_rows.len(), 3);
        assert_eq!(doc.tax_rows[1].tax_amount, dec!(12.34));
        assert_eq!(doc.tax_rows[1].description, "manual");
        assert_eq!(doc.tax_rows[1].cost_center.as_deref(), Some("Main - A"));
        assert_eq!(doc.tax_rows[2].tax_amount, dec!(99));
        assert_eq!(doc.tax_rows[2].description, "Freight (Paid by ACME)");
    }

    #[test]
    fn rerun_is_idempotent() {
        let cfg = config();
        let resolver = Resolver::new(&cfg);
        let mut doc = sales_doc();
        apply_tax_summary(&mut doc, &resolver);
        let first = doc.tax_rows.clone();
        apply_tax_summary(&mut doc, &resolver);
        assert_eq!(doc.tax_rows, first);
    }
}
