//! FBR sales tax return annexures.
//!
//! Aggregates submitted invoices into Annex A (purchases) and Annex C
//! (sales) rows, one per invoice and PCT code, with summary totals. Party,
//! address and code lookups are batched through a [`ComplianceSource`].
//!
//! # Example
//!
//! ```ignore
//! use mahsool::annex::*;
//!
//! let filters = ReportFilters::new()
//!     .between(from, to)
//!     .company("ACME");
//! let report = annex_c(&source, &filters);
//! std::fs::write("annex_c.csv", report.to_csv())?;
//! ```

mod aggregate;
mod report;
mod source;

pub use aggregate::{ReportFilters, annex_a, annex_c};
pub use report::{Column, ExportRow, FieldType, Indicator, Report, ReportValue, SummaryCard};
pub use source::{
    AddressRecord, ComplianceSource, DocumentQuery, HsCodeRecord, InMemorySource, PartyRecord,
};
