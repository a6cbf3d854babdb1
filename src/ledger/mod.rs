//! General-ledger postings for payments.
//!
//! Turns a payment with final tax rows into a balanced, ordered posting set:
//! party leg, bank leg net of tax, one posting per tax row. Party, deduction
//! and regional postings can be replaced through [`LedgerHooks`].
//!
//! # Example
//!
//! ```ignore
//! use mahsool::core::*;
//! use mahsool::ledger::*;
//!
//! let postings = build_gl_entries(&payment, &Resolver::new(&config))?;
//! assert!(is_balanced(&postings));
//! ```

mod gl_map;
mod hooks;
mod posting;

pub use gl_map::{build_gl_entries, build_gl_map};
pub use hooks::{LedgerHooks, StandardHooks};
pub use posting::{LedgerPosting, PostingTotals, imbalance, is_balanced};
