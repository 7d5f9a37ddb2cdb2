use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use super::{DateRangeFilter, RangeFilter, RangeQuery, Timestamp};
use crate::error::{FilterError, FilterResult};

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

const END_OF_DAY: NaiveTime = NaiveTime::from_hms_opt(23, 59, 59).expect("23:59:59 is a valid time");

/// Build an inclusive date range from `date`, `from` and `upTo`.
///
/// `date` selects one whole UTC day and cannot be combined with `from` or
/// `upTo`. The upper bound of a day is `23:59:59.000`, not the last
/// millisecond.
pub fn build_date_filter(query: &RangeQuery) -> FilterResult<DateRangeFilter> {
    if query.date.is_some() && (query.from.is_some() || query.up_to.is_some()) {
        return Err(FilterError::DateConflict);
    }

    if let Some(date) = query.date.as_deref() {
        let day = parse_day(date)?;
        return Ok(RangeFilter::new(Some(start_of_day(day)), Some(end_of_day(day))));
    }

    let gte = query.from.as_deref().map(parse_day).transpose()?.map(start_of_day);
    let lte = query.up_to.as_deref().map(parse_day).transpose()?.map(end_of_day);

    Ok(RangeFilter::new(gte, lte))
}

fn parse_day(raw: &str) -> FilterResult<NaiveDate> {
    if !DATE_PATTERN.is_match(raw) {
        return Err(FilterError::InvalidDate);
    }
    // The pattern admits impossible days such as 2023-02-30.
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| FilterError::InvalidDate)
}

fn start_of_day(day: NaiveDate) -> Timestamp {
    day.and_time(NaiveTime::MIN).and_utc().into()
}

fn end_of_day(day: NaiveDate) -> Timestamp {
    day.and_time(END_OF_DAY).and_utc().into()
}
