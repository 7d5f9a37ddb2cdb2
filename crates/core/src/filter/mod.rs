//! Inclusive range predicates built from read-endpoint query parameters.
//!
//! Builders are pure: they validate the raw strings and return value objects
//! that are handed to the persistence layer and discarded afterwards.

mod amount;
mod date;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::FilterResult;

pub use amount::build_amount_filter;
pub use date::build_date_filter;

/// Raw range parameters as received in a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RangeQuery {
    pub date: Option<String>,
    pub from: Option<String>,
    #[serde(rename = "upTo")]
    pub up_to: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
}

/// Inclusive `{gte?, lte?}` range over an ordered field.
///
/// A missing bound leaves that side of the range open; a filter with neither
/// bound places no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeFilter<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<T>,
}

impl<T> Default for RangeFilter<T> {
    fn default() -> Self {
        Self { gte: None, lte: None }
    }
}

impl<T: PartialOrd> RangeFilter<T> {
    pub fn new(gte: Option<T>, lte: Option<T>) -> Self {
        Self { gte, lte }
    }

    pub fn is_empty(&self) -> bool {
        self.gte.is_none() && self.lte.is_none()
    }

    /// Whether `value` satisfies both bounds (inclusive).
    pub fn contains(&self, value: &T) -> bool {
        let above = self.gte.as_ref().is_none_or(|gte| value >= gte);
        let below = self.lte.as_ref().is_none_or(|lte| value <= lte);
        above && below
    }
}

/// UTC instant that serializes with millisecond precision (`2023-01-01T00:00:00.000Z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(value: Timestamp) -> Self {
        value.0
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub type DateRangeFilter = RangeFilter<Timestamp>;
pub type AmountRangeFilter = RangeFilter<f64>;

/// Both predicates a transaction listing can be narrowed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RangeFilters {
    pub date: DateRangeFilter,
    pub amount: AmountRangeFilter,
}

/// Build the date and amount filters for one read request.
///
/// The date parameters are validated first, so a request that is wrong on
/// both counts reports the date problem.
pub fn build_filters(query: &RangeQuery) -> FilterResult<RangeFilters> {
    Ok(RangeFilters {
        date: build_date_filter(query)?,
        amount: build_amount_filter(query)?,
    })
}
