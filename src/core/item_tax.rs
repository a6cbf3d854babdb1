//! Item-level sales tax and further tax.
//!
//! Computes each line's `st`, `further_tax` and `total_incl_tax` from its
//! item tax template. Standard goods are taxed on `qty * rate`; Third Schedule
//! goods on `qty * max(notified value, retail price)`. Further tax is only
//! charged on sales to unregistered buyers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::config::{ConfigSource, ItemTaxTemplate};
use super::types::*;

/// A manual edit made on the line, recomputed from instead of the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOverride {
    /// The sales tax amount was typed in; the rate is derived from it.
    SalesTaxAmount,
    /// The sales tax rate was typed in.
    SalesTaxRate,
    /// The further tax rate was typed in.
    FurtherTaxRate,
}

/// Outcome of computing one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTaxOutcome {
    /// Taxes were computed.
    Computed,
    /// Taxes were cleared (unregistered supplier, non sales-tax invoice,
    /// or no template).
    Cleared,
    /// Line was not touched (imports).
    Untouched,
}

/// Compute taxes for every line of `doc`, looking up item tax templates
/// through `config`.
pub fn apply_item_taxes<C: ConfigSource + ?Sized>(
    doc: &mut TaxableDocument,
    config: &C,
) -> Vec<LineTaxOutcome> {
    let ctx = LineContext::of(doc);
    doc.items
        .iter_mut()
        .map(|line| {
            let template = line
                .item_tax_template
                .as_deref()
                .and_then(|t| config.item_tax_template(t));
            compute_line_taxes(&ctx, line, template.as_ref(), None)
        })
        .collect()
}

/// Document facts a line computation depends on.
#[derive(Debug, Clone, Copy)]
pub struct LineContext {
    pub kind: DocumentKind,
    pub is_return: bool,
    pub party_status: Option<RegistrationStatus>,
    pub purchase_type: Option<PurchaseType>,
    pub sales_tax_invoice: bool,
}

impl LineContext {
    pub fn of(doc: &TaxableDocument) -> Self {
        Self {
            kind: doc.kind,
            is_return: doc.is_return,
            party_status: doc.party_status,
            purchase_type: doc.purchase_type,
            sales_tax_invoice: doc.sales_tax_invoice,
        }
    }

    fn charges_further_tax(&self) -> bool {
        self.kind == DocumentKind::SalesInvoice
            && self.party_status == Some(RegistrationStatus::Unregistered)
    }

    fn multiplier(&self, line: &LineItem) -> Decimal {
        if self.is_return || line.qty.is_sign_negative() {
            Decimal::NEGATIVE_ONE
        } else {
            Decimal::ONE
        }
    }
}

/// Compute one line in place.
pub fn compute_line_taxes(
    ctx: &LineContext,
    line: &mut LineItem,
    template: Option<&ItemTaxTemplate>,
    manual: Option<LineOverride>,
) -> LineTaxOutcome {
    if ctx.purchase_type == Some(PurchaseType::Import) {
        return LineTaxOutcome::Untouched;
    }

    let multiplier = ctx.multiplier(line);
    let qty = line.qty.abs();
    let base_amount = qty * line.rate;

    let unregistered_supplier = ctx.kind == DocumentKind::PurchaseInvoice
        && ctx.party_status == Some(RegistrationStatus::Unregistered);
    if unregistered_supplier || !ctx.sales_tax_invoice {
        clear(line, multiplier * base_amount);
        return LineTaxOutcome::Cleared;
    }

    if line.schedule == GoodsSchedule::ThirdSchedule {
        return third_schedule(ctx, line, template, multiplier, qty, base_amount);
    }

    match manual {
        Some(LineOverride::SalesTaxAmount) => {
            let st = round_half_up(line.st, 2);
            line.st_rate = if base_amount.is_zero() {
                Decimal::ZERO
            } else {
                round_half_up(st / (multiplier * base_amount) * dec!(100), 2)
            };
            let ft = template_further_tax(ctx, template, multiplier, base_amount);
            finish(line, multiplier * base_amount, st, ft);
            LineTaxOutcome::Computed
        }
        Some(LineOverride::SalesTaxRate) => {
            let st = round_half_up(multiplier * line.st_rate * dec!(0.01) * base_amount, 2);
            let ft = template_further_tax(ctx, template, multiplier, base_amount);
            finish(line, multiplier * base_amount, st, ft);
            LineTaxOutcome::Computed
        }
        Some(LineOverride::FurtherTaxRate) => {
            let ft = round_half_up(multiplier * line.ft_rate * dec!(0.01) * base_amount, 2);
            let st = round_half_up(line.st, 2);
            finish(line, multiplier * base_amount, st, ft);
            LineTaxOutcome::Computed
        }
        None => {
            let Some(template) = template else {
                clear(line, multiplier * base_amount);
                return LineTaxOutcome::Cleared;
            };

            let mut st = Decimal::ZERO;
            let mut st_rate = Decimal::ZERO;
            let mut ft = Decimal::ZERO;
            let mut ft_rate = Decimal::ZERO;
            for rate in &template.lines {
                match rate.tag {
                    Some(TaxTag::SalesTax) => {
                        st += multiplier * rate.tax_rate * dec!(0.01) * base_amount;
                        st_rate += rate.tax_rate;
                    }
                    Some(TaxTag::FurtherSalesTax) if ctx.charges_further_tax() => {
                        ft += multiplier * rate.tax_rate * dec!(0.01) * base_amount;
                        ft_rate = rate.tax_rate;
                    }
                    _ => {}
                }
            }
            line.st_rate = st_rate;
            line.ft_rate = ft_rate;
            line.st = round_half_up(st, 2);
            line.further_tax = round_half_up(ft, 2);
            line.total_incl_tax = round_half_up(multiplier * base_amount + st + ft, 2);
            LineTaxOutcome::Computed
        }
    }
}

fn third_schedule(
    ctx: &LineContext,
    line: &mut LineItem,
    template: Option<&ItemTaxTemplate>,
    multiplier: Decimal,
    qty: Decimal,
    base_amount: Decimal,
) -> LineTaxOutcome {
    let notified = line.fixed_notified_value.unwrap_or_default();
    let retail = line.retail_price.unwrap_or_default();
    let taxable_base = notified.max(retail);

    let (Some(template), true) = (template, taxable_base > Decimal::ZERO) else {
        log::debug!(
            "{}: third schedule item without template or retail/notified value",
            line.item_code
        );
        clear(line, multiplier * base_amount);
        return LineTaxOutcome::Cleared;
    };

    let taxable = qty * taxable_base;
    let st_rate = template
        .lines
        .iter()
        .filter(|l| l.tag == Some(TaxTag::SalesTax))
        .map(|l| l.tax_rate)
        .last()
        .unwrap_or_default();
    let st = round_half_up(multiplier * taxable * st_rate / dec!(100), 2);

    let (ft, ft_rate) = if ctx.charges_further_tax() {
        template
            .lines
            .iter()
            .filter(|l| l.tag == Some(TaxTag::FurtherSalesTax))
            .map(|l| {
                (
                    round_half_up(multiplier * taxable * l.tax_rate / dec!(100), 2),
                    l.tax_rate,
                )
            })
            .last()
            .unwrap_or_default()
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    line.st_rate = st_rate;
    line.ft_rate = ft_rate;
    finish(line, multiplier * base_amount, st, ft);
    LineTaxOutcome::Computed
}

fn template_further_tax(
    ctx: &LineContext,
    template: Option<&ItemTaxTemplate>,
    multiplier: Decimal,
    base_amount: Decimal,
) -> Decimal {
    if !ctx.charges_further_tax() {
        return Decimal::ZERO;
    }
    template
        .map(|t| {
            t.lines
                .iter()
                .filter(|l| l.tag == Some(TaxTag::FurtherSalesTax))
                .map(|l| multiplier * l.tax_rate * dec!(0.01) * base_amount)
                .sum()
        })
        .unwrap_or_default()
}

fn finish(line: &mut LineItem, signed_base: Decimal, st: Decimal, ft: Decimal) {
    line.st = st;
    line.further_tax = round_half_up(ft, 2);
    line.total_incl_tax = round_half_up(signed_base + st + ft, 2);
}

fn clear(line: &mut LineItem, signed_base: Decimal) {
    line.st_rate = Decimal::ZERO;
    line.st = Decimal::ZERO;
    line.ft_rate = Decimal::ZERO;
    line.further_tax = Decimal::ZERO;
    line.total_incl_tax = round_half_up(signed_base, 2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ItemTaxLine;
    use crate::core::LineItemBuilder;

    fn template() -> ItemTaxTemplate {
        ItemTaxTemplate {
            name: "GST 18%".into(),
            lines: vec![
                ItemTaxLine {
                    tax_type: "Sales Tax - A".into(),
                    tax_rate: dec!(18),
                    tag: Some(TaxTag::SalesTax),
                },
                ItemTaxLine {
                    tax_type: "Further Tax - A".into(),
                    tax_rate: dec!(4),
                    tag: Some(TaxTag::FurtherSalesTax),
                },
            ],
        }
    }

    fn ctx(kind: DocumentKind, status: Option<RegistrationStatus>) -> LineContext {
        LineContext {
            kind,
            is_return: false,
            party_status: status,
            purchase_type: None,
            sales_tax_invoice: true,
        }
    }

    fn line() -> LineItem {
        LineItemBuilder::new("A", dec!(10), "Nos", dec!(100)).build()
    }

    #[test]
    fn registered_buyer_pays_sales_tax_only() {
        let mut l = line();
        let out = compute_line_taxes(
            &ctx(DocumentKind::SalesInvoice, Some(RegistrationStatus::Registered)),
            &mut l,
            Some(&template()),
            None,
        );
        assert_eq!(out, LineTaxOutcome::Computed);
        assert_eq!(l.st, dec!(180));
        assert_eq!(l.st_rate, dec!(18));
        assert_eq!(l.further_tax, dec!(0));
        assert_eq!(l.total_incl_tax, dec!(1180));
    }

    #[test]
    fn unregistered_buyer_pays_further_tax() {
        let mut l = line();
        compute_line_taxes(
            &ctx(DocumentKind::SalesInvoice, Some(RegistrationStatus::Unregistered)),
            &mut l,
            Some(&template()),
            None,
        );
        assert_eq!(l.further_tax, dec!(40));
        assert_eq!(l.ft_rate, dec!(4));
        assert_eq!(l.total_incl_tax, dec!(1220));
    }

    #[test]
    fn return_negates_taxes() {
        let mut c = ctx(DocumentKind::SalesInvoice, Some(RegistrationStatus::Registered));
        c.is_return = true;
        let mut l = line();
        compute_line_taxes(&c, &mut l, Some(&template()), None);
        assert_eq!(l.st, dec!(-180));
        assert_eq!(l.total_incl_tax, dec!(-1180));
    }

    #[test]
    fn unregistered_supplier_clears_taxes() {
        let mut l = LineItemBuilder::new("A", dec!(10), "Nos", dec!(100))
            .taxes(dec!(18), dec!(180), dec!(0), dec!(0))
            .build();
        let out = compute_line_taxes(
            &ctx(DocumentKind::PurchaseInvoice, Some(RegistrationStatus::Unregistered)),
            &mut l,
            Some(&template()),
            None,
        );
        assert_eq!(out, LineTaxOutcome::Cleared);
        assert_eq!(l.st, dec!(0));
        assert_eq!(l.total_incl_tax, dec!(1000));
    }

    #[test]
    fn imports_are_untouched() {
        let mut c = ctx(DocumentKind::PurchaseInvoice, None);
        c.purchase_type = Some(PurchaseType::Import);
        let mut l = line();
        l.st = dec!(999);
        assert_eq!(
            compute_line_taxes(&c, &mut l, Some(&template()), None),
            LineTaxOutcome::Untouched
        );
        assert_eq!(l.st, dec!(999));
    }

    #[test]
    fn third_schedule_uses_higher_of_retail_and_notified() {
        let mut l = LineItemBuilder::new("JUICE", dec!(10), "Nos", dec!(80))
            .third_schedule(Some(dec!(90)), Some(dec!(120)))
            .build();
        compute_line_taxes(
            &ctx(DocumentKind::SalesInvoice, Some(RegistrationStatus::Registered)),
            &mut l,
            Some(&template()),
            None,
        );
        // 10 * 120 * 18%
        assert_eq!(l.st, dec!(216));
        assert_eq!(l.total_incl_tax, dec!(1016));
    }

    #[test]
    fn manual_sales_tax_amount_derives_rate() {
        let mut l = line();
        l.st = dec!(170);
        compute_line_taxes(
            &ctx(DocumentKind::SalesInvoice, Some(RegistrationStatus::Registered)),
            &mut l,
            Some(&template()),
            Some(LineOverride::SalesTaxAmount),
        );
        assert_eq!(l.st_rate, dec!(17));
        assert_eq!(l.total_incl_tax, dec!(1170));
    }

    #[test]
    fn manual_further_tax_rate() {
        let mut l = line();
        l.ft_rate = dec!(3);
        compute_line_taxes(
            &ctx(DocumentKind::SalesInvoice, Some(RegistrationStatus::Unregistered)),
            &mut l,
            None,
            Some(LineOverride::FurtherTaxRate),
        );
        assert_eq!(l.further_tax, dec!(30));
        assert_eq!(l.total_incl_tax, dec!(1030));
    }

    #[test]
    fn no_template_clears() {
        let mut l = line();
        l.st = dec!(5);
        let out = compute_line_taxes(
            &ctx(DocumentKind::SalesInvoice, None),
            &mut l,
            None,
            None,
        );
        assert_eq!(out, LineTaxOutcome::Cleared);
        assert_eq!(l.st, dec!(0));
    }
}
