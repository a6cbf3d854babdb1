#![cfg(feature = "wht")]

use chrono::NaiveDate;
use mahsool::core::*;
use mahsool::wht::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn config() -> InMemoryConfig {
    InMemoryConfig::new()
        .with_wht_section(WhtSection {
            name: "153(1)(a) Goods".into(),
            account_head: "WHT Payable Goods - IF".into(),
            tax_receivable_account_head: "WHT Deducted Goods - IF".into(),
            active_tax_payer_rate: dec!(4),
            inactive_tax_payer_rate: dec!(10),
        })
        .with_wht_section(WhtSection {
            name: "153(1)(b) Services".into(),
            account_head: "WHT Payable Services - IF".into(),
            tax_receivable_account_head: "WHT Deducted Services - IF".into(),
            active_tax_payer_rate: dec!(8),
            inactive_tax_payer_rate: dec!(16),
        })
        .with_supplier_section("Lahore Steel", "153(1)(a) Goods")
}

fn supplier_payment(status: FilerStatus) -> PaymentDocumentBuilder {
    PaymentDocumentBuilder::new(
        "ACC-PAY-25-0001",
        PaymentType::Pay,
        date(2025, 3, 5),
        "Indus Foods",
        "PKR",
    )
    .party(PartyType::Supplier, "Lahore Steel")
    .filer_status(status)
    .paid_from("Meezan Bank - IF", "PKR")
    .paid_to("Creditors - IF", "PKR")
    .cost_center("Main - IF")
}

#[test]
fn inactive_filer_scenario() {
    let cfg = config();
    let mut pe = supplier_payment(FilerStatus::InActive)
        .amounts(dec!(2000), dec!(2000))
        .add_reference(AllocationRef::new(
            ReferenceDoctype::PurchaseInvoice,
            "ACC-PINV-25-0007",
            dec!(2000),
        ))
        .build()
        .unwrap();

    calculate_withholding_tax(&mut pe, &Resolver::new(&cfg));

    assert_eq!(pe.references[0].wht_amount, Some(dec!(200)));
    assert_eq!(pe.references[0].wht_rate, Some(dec!(10)));
}

#[test]
fn one_row_per_section_in_first_seen_order() {
    let cfg = config();
    let mut pe = supplier_payment(FilerStatus::Active)
        .amounts(dec!(30000), dec!(30000))
        .add_reference(
            AllocationRef::new(ReferenceDoctype::PurchaseInvoice, "PINV-1", dec!(10000))
                .with_section("153(1)(b) Services"),
        )
        .add_reference(AllocationRef::new(
            ReferenceDoctype::PurchaseInvoice,
            "PINV-2",
            dec!(5000),
        ))
        .add_reference(
            AllocationRef::new(ReferenceDoctype::PurchaseInvoice, "PINV-3", dec!(15000))
                .with_section("153(1)(b) Services"),
        )
        .build()
        .unwrap();

    let outcome = calculate_withholding_tax(&mut pe, &Resolver::new(&cfg));

    assert_eq!(outcome.sections.len(), 2);
    assert_eq!(pe.tax_rows.len(), 2);

    let services = &pe.tax_rows[0];
    assert_eq!(services.description, "153(1)(b) Services");
    assert_eq!(services.account_head, "WHT Deducted Services - IF");
    assert_eq!(services.tax_amount, dec!(2000));
    assert_eq!(services.charge_type, ChargeType::Actual);
    assert_eq!(services.add_deduct, AddDeduct::Deduct);
    assert_eq!(services.cost_center.as_deref(), Some("Main - IF"));

    let goods = &pe.tax_rows[1];
    assert_eq!(goods.description, "153(1)(a) Goods");
    assert_eq!(goods.tax_amount, dec!(200));

    assert_eq!(pe.total_taxes_and_charges, dec!(2200));
    assert_eq!(pe.base_total_taxes_and_charges, dec!(2200));
}

#[test]
fn customer_receipt_uses_payable_head() {
    let cfg = config();
    let mut pe = PaymentDocumentBuilder::new(
        "ACC-PAY-25-0002",
        PaymentType::Receive,
        date(2025, 3, 6),
        "Indus Foods",
        "PKR",
    )
    .party(PartyType::Customer, "Karachi Traders")
    .filer_status(FilerStatus::Active)
    .paid_from("Debtors - IF", "PKR")
    .paid_to("Meezan Bank - IF", "PKR")
    .amounts(dec!(12345), dec!(12345))
    .add_reference(
        AllocationRef::new(ReferenceDoctype::SalesInvoice, "SINV-9", dec!(12345))
            .with_section("153(1)(a) Goods"),
    )
    .build()
    .unwrap();

    calculate_withholding_tax(&mut pe, &Resolver::new(&cfg));

    // 4% of 12345 = 493.8, truncated
    assert_eq!(pe.references[0].wht_amount, Some(dec!(493.8)));
    assert_eq!(pe.tax_rows[0].account_head, "WHT Payable Goods - IF");
    assert_eq!(pe.tax_rows[0].tax_amount, dec!(493));
}

#[test]
fn customer_references_get_no_supplier_default() {
    let cfg = config().with_supplier_section("Karachi Traders", "153(1)(a) Goods");
    let mut pe = PaymentDocumentBuilder::new(
        "ACC-PAY-25-0003",
        PaymentType::Receive,
        date(2025, 3, 6),
        "Indus Foods",
        "PKR",
    )
    .party(PartyType::Customer, "Karachi Traders")
    .filer_status(FilerStatus::Active)
    .paid_from("Debtors - IF", "PKR")
    .paid_to("Meezan Bank - IF", "PKR")
    .amounts(dec!(1000), dec!(1000))
    .add_reference(AllocationRef::new(
        ReferenceDoctype::SalesInvoice,
        "SINV-10",
        dec!(1000),
    ))
    .build()
    .unwrap();

    let outcome = calculate_withholding_tax(&mut pe, &Resolver::new(&cfg));
    assert_eq!(pe.references[0].wht_section, None);
    assert_eq!(
        outcome.skipped,
        vec![SkipReason::NoWhtSection {
            reference: "SINV-10".into()
        }]
    );
}

#[test]
fn unresolvable_section_is_silent() {
    let cfg = config();
    let mut pe = supplier_payment(FilerStatus::Active)
        .amounts(dec!(3000), dec!(3000))
        .add_reference(
            AllocationRef::new(ReferenceDoctype::PurchaseInvoice, "PINV-1", dec!(1000))
                .with_section("Repealed 153(1)(c)"),
        )
        .add_reference(AllocationRef::new(
            ReferenceDoctype::PurchaseInvoice,
            "PINV-2",
            dec!(2000),
        ))
        .build()
        .unwrap();

    let outcome = calculate_withholding_tax(&mut pe, &Resolver::new(&cfg));

    assert_eq!(pe.references[0].wht_amount, None);
    assert_eq!(pe.references[1].wht_amount, Some(dec!(80)));
    assert_eq!(pe.tax_rows.len(), 1);
    assert_eq!(pe.tax_rows[0].description, "153(1)(a) Goods");
    assert_eq!(outcome.skipped.len(), 1);
}

#[test]
fn rerun_replaces_rows() {
    let cfg = config();
    let resolver = Resolver::new(&cfg);
    let mut pe = supplier_payment(FilerStatus::Active)
        .amounts(dec!(5000), dec!(5000))
        .add_reference(AllocationRef::new(
            ReferenceDoctype::PurchaseInvoice,
            "PINV-1",
            dec!(5000),
        ))
        .build()
        .unwrap();

    calculate_withholding_tax(&mut pe, &resolver);
    let first = pe.tax_rows.clone();
    calculate_withholding_tax(&mut pe, &resolver);
    assert_eq!(pe.tax_rows, first);
    assert_eq!(pe.total_taxes_and_charges, dec!(200));
}

#[test]
fn blank_section_takes_supplier_default() {
    let cfg = config();
    let mut pe = supplier_payment(FilerStatus::InActive)
        .amounts(dec!(2000), dec!(2000))
        .add_reference(
            AllocationRef::new(ReferenceDoctype::PurchaseInvoice, "ACC-PINV-25-0008", dec!(2000))
                .with_section(""),
        )
        .build()
        .unwrap();

    let outcome = calculate_withholding_tax(&mut pe, &Resolver::new(&cfg));

    assert_eq!(pe.references[0].wht_section.as_deref(), Some("153(1)(a) Goods"));
    assert_eq!(pe.references[0].wht_amount, Some(dec!(200)));
    assert!(outcome.skipped.is_empty());
}

#[test]
fn blank_section_without_default_is_missing() {
    let cfg = config();
    let mut pe = PaymentDocumentBuilder::new(
        "ACC-PAY-25-0004",
        PaymentType::Receive,
        date(2025, 3, 6),
        "Indus Foods",
        "PKR",
    )
    .party(PartyType::Customer, "Karachi Traders")
    .filer_status(FilerStatus::Active)
    .paid_from("Debtors - IF", "PKR")
    .paid_to("Meezan Bank - IF", "PKR")
    .amounts(dec!(1000), dec!(1000))
    .add_reference(
        AllocationRef::new(ReferenceDoctype::SalesInvoice, "SINV-11", dec!(1000))
            .with_section("  "),
    )
    .build()
    .unwrap();

    let outcome = calculate_withholding_tax(&mut pe, &Resolver::new(&cfg));

    assert_eq!(pe.references[0].wht_amount, None);
    assert!(pe.tax_rows.is_empty());
    assert_eq!(
        outcome.skipped,
        vec![SkipReason::NoWhtSection {
            reference: "SINV-11".into()
        }]
    );
}
