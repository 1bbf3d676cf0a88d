//! Sales reporting over stored orders.
//!
//! - [`SalesReport`] computes top-selling products, all-time or restricted
//!   to delivered orders in a date range or a category
//! - [`DateRange`] parses and validates the report window

pub mod error;
pub mod range;
pub mod sales;
mod tally;

pub use error::{ReportError, Result};
pub use range::DateRange;
pub use sales::{ProductSales, SalesReport, TopSellingItem};
