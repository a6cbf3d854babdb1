use super::error::{MahsoolError, ValidationError};
use super::types::*;

/// Validate a taxable document before its summary is built or reported.
/// Returns all validation errors found (not just the first).
pub fn validate_document(doc: &TaxableDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if doc.name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "name",
            "document name must not be empty",
            "PK-DOC-01",
        ));
    }

    if doc.party.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "party",
            format!("{} must name a party", doc.kind.label()),
            "PK-DOC-02",
        ));
    }

    if doc.items.is_empty() {
        errors.push(ValidationError::with_rule(
            "items",
            "document must have at least one item",
            "PK-DOC-03",
        ));
    }

    if doc.kind == DocumentKind::SalesInvoice && doc.purchase_type.is_some() {
        errors.push(ValidationError::new(
            "purchase_type",
            "purchase type only applies to purchase invoices",
        ));
    }

    for (i, item) in doc.items.iter().enumerate() {
        validate_item(doc, item, i, &mut errors);
    }

    errors
}

fn validate_item(
    doc: &TaxableDocument,
    item: &LineItem,
    index: usize,
    errors: &mut Vec<ValidationError>,
) {
    let prefix = format!("items[{index}]");

    match &item.hs_code {
        Some(code) if !is_valid_hs_code(code) => {
            errors.push(ValidationError::with_rule(
                format!("{prefix}.hs_code"),
                format!("'{code}' is not a PCT code of the form NNNN.NNNN"),
                "PK-HS-01",
            ));
        }
        None if doc.sales_tax_invoice && doc.purchase_type != Some(PurchaseType::Import) => {
            errors.push(ValidationError::with_rule(
                format!("{prefix}.hs_code"),
                "sales tax invoice lines must carry a PCT code",
                "PK-HS-02",
            ));
        }
        _ => {}
    }

    if item.st_rate.is_sign_negative() || item.ft_rate.is_sign_negative() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.st_rate"),
            "tax rates must not be negative",
            "PK-RATE-01",
        ));
    }

    if item.qty.is_zero() {
        errors.push(ValidationError::new(
            format!("{prefix}.qty"),
            "quantity must not be zero",
        ));
    }

    // Returns carry negative quantities; originals positive.
    if !item.qty.is_zero() && item.qty.is_sign_negative() != doc.is_return {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.qty"),
            if doc.is_return {
                "return document lines must have negative quantity"
            } else {
                "only return documents may have negative quantity"
            },
            "PK-RET-01",
        ));
    }
}

/// Like [`validate_document`], but folds all failures into one error.
pub fn ensure_valid(doc: &TaxableDocument) -> Result<(), MahsoolError> {
    let errors = validate_document(doc);
    if errors.is_empty() {
        return Ok(());
    }
    let msg = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    Err(MahsoolError::Validation(msg))
}

/// Check a Pakistan Customs Tariff code: four digits, a dot, four digits.
pub fn is_valid_hs_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 9
        && bytes[4] == b'.'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
}
