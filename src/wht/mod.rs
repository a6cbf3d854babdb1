//! Withholding tax on payment allocations.
//!
//! Resolves the Income Tax Ordinance section of every invoice a payment is
//! allocated against, applies the active or inactive filer rate of the
//! payment's party, and rebuilds the payment's tax rows with one `Deduct`
//! row per section.
//!
//! # Example
//!
//! ```ignore
//! use mahsool::core::*;
//! use mahsool::wht::*;
//!
//! let outcome = calculate_withholding_tax(&mut payment, &Resolver::new(&config));
//! assert!(outcome.skipped.is_empty());
//! ```

mod calculator;

pub use calculator::{SectionTotal, WhtOutcome, calculate_withholding_tax};
