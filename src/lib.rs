//! # mahsool
//!
//! Pakistan sales-tax and withholding-tax engine: document tax summaries,
//! withholding on payments, balanced general-ledger postings and the FBR
//! Annex A / Annex C sales tax return exports.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Host configuration (accounts, templates, withholding sections) is read
//! through the [`core::ConfigSource`] trait; an in-memory implementation
//! is provided.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use mahsool::core::*;
//! use rust_decimal_macros::dec;
//!
//! let config = InMemoryConfig::new().with_company(
//!     CompanySettingsBuilder::new("ACME")
//!         .sales_tax_account("Sales Tax Payable - ACME")
//!         .further_tax_account("Further Tax Payable - ACME")
//!         .build(),
//! );
//!
//! let mut invoice = TaxableDocumentBuilder::new(
//!     "SINV-0001",
//!     DocumentKind::SalesInvoice,
//!     NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
//!     "ACME",
//!     "Karachi Traders",
//! )
//! .add_item(
//!     LineItemBuilder::new("SOAP-100", dec!(10), "Nos", dec!(100))
//!         .hs_code("3401.1100")
//!         .taxes(dec!(18), dec!(180), dec!(4), dec!(40))
//!         .build(),
//! )
//! .build()
//! .unwrap();
//!
//! apply_tax_summary(&mut invoice, &Resolver::new(&config));
//! assert_eq!(invoice.tax_rows.len(), 2);
//! assert_eq!(invoice.total_taxes(), dec!(220));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Document types, configuration, item taxes, tax summary |
//! | `wht` | Withholding tax on payment allocations |
//! | `ledger` | Balanced GL postings for payments |
//! | `annex` | FBR Annex A (purchases) / Annex C (sales) reports |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "wht")]
pub mod wht;

#[cfg(feature = "ledger")]
pub mod ledger;

#[cfg(feature = "annex")]
pub mod annex;

#[cfg(feature = "core")]
pub use crate::core::*;
