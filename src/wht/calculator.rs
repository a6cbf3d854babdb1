use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::core::{
    ConfigSource, PartyType, PaymentDocument, ReferenceDoctype, Resolver, SkipReason, TaxRow,
    TaxTag,
};

/// Amount withheld under one section across all references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTotal {
    pub section: String,
    pub rate: Decimal,
    /// Accumulated amount before whole-unit truncation.
    pub amount: Decimal,
}

/// Result of a withholding run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhtOutcome {
    /// Per-section totals in order of first appearance.
    pub sections: Vec<SectionTotal>,
    pub skipped: Vec<SkipReason>,
}

impl WhtOutcome {
    /// Sum withheld across sections, untruncated.
    pub fn total(&self) -> Decimal {
        self.sections.iter().map(|s| s.amount).sum()
    }
}

/// Compute withholding on a payment's invoice references and rebuild its
/// tax rows.
///
/// Does nothing unless the party is a supplier or customer. Otherwise
/// `tax_rows` is replaced with one `Actual`/`Deduct` row per section, the
/// amount truncated to whole currency units, and payment tax totals are
/// refreshed. References whose section is missing, unknown or carries no
/// rate for the party's filer status are skipped and left untouched.
pub fn calculate_withholding_tax<C: ConfigSource + ?Sized>(
    doc: &mut PaymentDocument,
    resolver: &Resolver<'_, C>,
) -> WhtOutcome {
    let mut outcome = WhtOutcome::default();

    let Some(party_type) = doc.party_type.clone().filter(PartyType::is_wht_subject) else {
        outcome.skipped.push(SkipReason::PartyNotSubjectToWht);
        return outcome;
    };

    if party_type == PartyType::Supplier {
        fill_supplier_default(doc, resolver);
    }

    let sections = resolver.wht_sections(
        doc.references
            .iter()
            .filter(|r| r.reference_doctype.is_invoice())
            .filter_map(|r| r.wht_section.as_deref())
            .filter(|name| !name.trim().is_empty()),
    );

    for reference in doc
        .references
        .iter_mut()
        .filter(|r| r.reference_doctype.is_invoice())
    {
        let Some(name) = reference
            .wht_section
            .as_deref()
            .filter(|name| !name.trim().is_empty())
        else {
            log::debug!("{}: no withholding section", reference.reference_name);
            outcome.skipped.push(SkipReason::NoWhtSection {
                reference: reference.reference_name.clone(),
            });
            continue;
        };
        let Some(section) = sections.get(name) else {
            log::debug!(
                "{}: withholding section '{name}' not configured",
                reference.reference_name
            );
            outcome.skipped.push(SkipReason::UnknownWhtSection {
                reference: reference.reference_name.clone(),
                section: name.to_string(),
            });
            continue;
        };

        let rate = resolver.applicable_rate(section, doc.party_filer_status);
        if rate.is_zero() {
            log::debug!(
                "{}: no rate in section '{name}' for filer status {:?}",
                reference.reference_name,
                doc.party_filer_status
            );
            outcome.skipped.push(SkipReason::RateNotApplicable {
                reference: reference.reference_name.clone(),
                section: name.to_string(),
            });
            continue;
        }

        let amount = reference.allocated_amount * rate / dec!(100);
        reference.wht_amount = Some(amount);
        reference.wht_rate = Some(rate);

        match outcome.sections.iter_mut().find(|s| s.section == name) {
            Some(total) => total.amount += amount,
            None => outcome.sections.push(SectionTotal {
                section: name.to_string(),
                rate,
                amount,
            }),
        }
    }

    doc.tax_rows.clear();
    for total in outcome.sections.iter().filter(|s| !s.amount.is_zero()) {
        let Some(section) = sections.get(&total.section) else {
            continue;
        };
        doc.tax_rows.push(
            TaxRow::actual(
                section.account_for(doc.payment_type),
                total.section.as_str(),
                total.amount.trunc(),
                TaxTag::Withholding,
            )
            .with_rate(total.rate)
            .with_cost_center(doc.cost_center.clone())
            .deducted(),
        );
    }
    doc.calculate_taxes();

    outcome
}

/// Give supplier purchase-invoice references without a section the
/// supplier's default. A blank section counts as missing; explicit sections
/// are never overwritten.
fn fill_supplier_default<C: ConfigSource + ?Sized>(
    doc: &mut PaymentDocument,
    resolver: &Resolver<'_, C>,
) {
    let Some(party) = doc.party.as_deref() else {
        return;
    };
    let Some(default) = resolver.supplier_default_section(party) else {
        return;
    };
    for reference in doc.references.iter_mut().filter(|r| {
        r.reference_doctype == ReferenceDoctype::PurchaseInvoice
            && r.wht_section.as_deref().is_none_or(|s| s.trim().is_empty())
    }) {
        reference.wht_section = Some(default.clone());
    }
}
