use crate::core::{
    AddDeduct, ConfigSource, MahsoolError, PaymentDocument, PaymentType, Resolver, TaxRow,
};

use super::hooks::{LedgerHooks, StandardHooks};
use super::posting::LedgerPosting;

/// Build the GL postings of a payment with [`StandardHooks`].
pub fn build_gl_entries<C: ConfigSource + ?Sized>(
    doc: &PaymentDocument,
    resolver: &Resolver<'_, C>,
) -> Result<Vec<LedgerPosting>, MahsoolError> {
    build_gl_map(doc, resolver, &StandardHooks)
}

/// Build the ordered GL postings of a payment whose tax rows are final.
///
/// Order: party entries, bank leg, deduction entries, one posting per tax
/// row, regional entries. The bank leg is reduced by the payment's net tax
/// total so the set balances in company currency.
///
/// # Errors
///
/// [`MahsoolError::CurrencyMismatch`] if a tax row's account is not in
/// company currency. Nothing is posted in that case.
pub fn build_gl_map<C, H>(
    doc: &PaymentDocument,
    resolver: &Resolver<'_, C>,
    hooks: &H,
) -> Result<Vec<LedgerPosting>, MahsoolError>
where
    C: ConfigSource + ?Sized,
    H: LedgerHooks + ?Sized,
{
    check_tax_currencies(doc, resolver)?;

    let mut postings = hooks.party_entries(doc);
    bank_entries(doc, &mut postings);
    postings.extend(hooks.deduction_entries(doc));
    postings.extend(doc.tax_rows.iter().map(|row| tax_entry(doc, row)));
    postings.extend(hooks.regional_entries(doc));

    let currency = doc.document_currency();
    for posting in &mut postings {
        posting.transaction_currency = currency.to_string();
    }

    log::debug!(
        "{}: {} GL postings in {currency}",
        doc.name,
        postings.len()
    );
    Ok(postings)
}

fn check_tax_currencies<C: ConfigSource + ?Sized>(
    doc: &PaymentDocument,
    resolver: &Resolver<'_, C>,
) -> Result<(), MahsoolError> {
    for row in &doc.tax_rows {
        let found = resolver.account_currency(&row.account_head, &doc.company_currency);
        if found != doc.company_currency {
            return Err(MahsoolError::CurrencyMismatch {
                account: row.account_head.clone(),
                expected: doc.company_currency.clone(),
                found,
            });
        }
    }
    Ok(())
}

fn bank_entries(doc: &PaymentDocument, postings: &mut Vec<LedgerPosting>) {
    let tax = doc.total_taxes_and_charges;
    let base_tax = doc.base_total_taxes_and_charges;

    if matches!(
        doc.payment_type,
        PaymentType::Pay | PaymentType::InternalTransfer
    ) {
        postings.push(
            LedgerPosting::credit(
                &doc.paid_from,
                &doc.paid_from_account_currency,
                doc.base_paid_amount - base_tax,
                doc.paid_amount - tax,
            )
            .against(doc.party.as_deref().unwrap_or(&doc.paid_to))
            .cost_center(doc.cost_center.clone()),
        );
    }

    match doc.payment_type {
        PaymentType::Receive => postings.push(
            LedgerPosting::debit(
                &doc.paid_to,
                &doc.paid_to_account_currency,
                doc.base_received_amount - base_tax,
                doc.received_amount - tax,
            )
            .against(doc.party.as_deref().unwrap_or(&doc.paid_from))
            .cost_center(doc.cost_center.clone()),
        ),
        // Tax already came off the paid-from leg.
        PaymentType::InternalTransfer => postings.push(
            LedgerPosting::debit(
                &doc.paid_to,
                &doc.paid_to_account_currency,
                doc.base_received_amount,
                doc.received_amount,
            )
            .against(&doc.paid_from)
            .cost_center(doc.cost_center.clone()),
        ),
        PaymentType::Pay => {}
    }
}

fn tax_entry(doc: &PaymentDocument, row: &TaxRow) -> LedgerPosting {
    let is_debit = match (doc.payment_type, row.add_deduct) {
        (PaymentType::Pay | PaymentType::InternalTransfer, AddDeduct::Add) => true,
        (PaymentType::Pay | PaymentType::InternalTransfer, AddDeduct::Deduct) => false,
        (PaymentType::Receive, AddDeduct::Add) => false,
        (PaymentType::Receive, AddDeduct::Deduct) => true,
    };

    let amount = row.base_tax_amount;
    let posting = if is_debit {
        LedgerPosting::debit(&row.account_head, &doc.company_currency, amount, amount)
    } else {
        LedgerPosting::credit(&row.account_head, &doc.company_currency, amount, amount)
    };

    let fallback = match doc.payment_type {
        PaymentType::Receive => &doc.paid_to,
        PaymentType::Pay | PaymentType::InternalTransfer => &doc.paid_from,
    };
    posting
        .against(doc.party.as_deref().unwrap_or(fallback))
        .cost_center(row.cost_center.clone().or_else(|| doc.cost_center.clone()))
}
