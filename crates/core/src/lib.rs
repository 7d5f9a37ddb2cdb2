//! `spendbook-core` — pure primitives shared across the workspace.
//!
//! This crate has no knowledge of HTTP, tokens or storage. It turns raw query
//! parameters into range predicates that a persistence layer can apply.

pub mod error;
pub mod filter;

pub use error::{FilterError, FilterResult};
pub use filter::{
    AmountRangeFilter, DateRangeFilter, RangeFilter, RangeFilters, RangeQuery, Timestamp,
    build_amount_filter, build_date_filter, build_filters,
};
