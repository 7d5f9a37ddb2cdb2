use super::{AmountRangeFilter, RangeFilter, RangeQuery};
use crate::error::{FilterError, FilterResult};

/// Build an inclusive amount range from `min` and `max`.
///
/// `min` is validated before `max`. Bounds are not checked against each
/// other: an inverted range simply matches nothing.
pub fn build_amount_filter(query: &RangeQuery) -> FilterResult<AmountRangeFilter> {
    let gte = query
        .min
        .as_deref()
        .map(|raw| parse_amount(raw).ok_or(FilterError::InvalidMin))
        .transpose()?;
    let lte = query
        .max
        .as_deref()
        .map(|raw| parse_amount(raw).ok_or(FilterError::InvalidMax))
        .transpose()?;

    Ok(RangeFilter::new(gte, lte))
}

fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
