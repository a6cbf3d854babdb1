//! Core document types, configuration lookups, and the tax summary.
//!
//! This module provides the shared model for sales and purchase invoices
//! and payments, the [`Resolver`] over host configuration, and the
//! document-level tax summary built from item-level Sales Tax fields.

mod builder;
mod config;
mod error;
mod item_tax;
mod provinces;
mod resolver;
mod summary;
mod types;
mod validation;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use item_tax::*;
pub use provinces::*;
pub use resolver::*;
pub use summary::*;
pub use types::*;
pub use validation::*;
