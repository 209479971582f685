//! American-odds conversions.
//!
//! Price → implied probability for single offers, and combined
//! probability → equivalent American price for parlays. Unparsable prices
//! yield `None` instead of an error so one bad cell never aborts a run.

/// Parse a raw price cell ("-110", "+150", " 105 ") into a number.
/// Non-numeric and non-finite values are undefined.
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Implied win probability of an American price.
///
/// Negative (favourite): `-p / (-p + 100)`. Non-negative (underdog):
/// `100 / (p + 100)`. The ±100 magnitude floor is assumed, not checked.
pub fn american_to_prob(price: f64) -> f64 {
    if price < 0.0 {
        -price / (-price + 100.0)
    } else {
        100.0 / (price + 100.0)
    }
}

/// Implied probability straight from a raw price cell.
pub fn implied_probability(raw: &str) -> Option<f64> {
    parse_price(raw).map(american_to_prob)
}

/// Equivalent American price for a win probability.
///
/// Decimal odds `1/p` of 2.0 or more give a positive price
/// `(dec − 1) × 100`; shorter odds give a negative price `−100 / (dec − 1)`.
/// Probabilities outside the open interval (0, 1) have no price, nor do
/// ones so small the price would not fit in an `i64`.
pub fn prob_to_american(prob: f64) -> Option<i64> {
    if !(prob > 0.0 && prob < 1.0) {
        return None;
    }
    let decimal = 1.0 / prob;
    let price = if decimal >= 2.0 {
        (decimal - 1.0) * 100.0
    } else {
        -100.0 / (decimal - 1.0)
    };
    let rounded = price.round_ties_even();
    // i64::MAX as f64 rounds up to 2^63, itself out of range
    if !(rounded >= i64::MIN as f64 && rounded < i64::MAX as f64) {
        return None;
    }
    Some(rounded as i64)
}

/// Whether a raw price lies within `[min, max]`. Unparsable ⇒ false.
pub fn in_band(raw: &str, min: f64, max: f64) -> bool {
    parse_price(raw).is_some_and(|p| p >= min && p <= max)
}

/// Signed display form of a raw price ("+150", "-110").
/// Fractional prices are truncated; unparsable text is echoed as-is.
pub fn format_american(raw: &str) -> String {
    match parse_price(raw) {
        Some(p) => format_signed(p.trunc() as i64),
        None => raw.to_string(),
    }
}

/// "+N" for non-negative prices, "-N" otherwise.
pub fn format_signed(price: i64) -> String {
    if price >= 0 {
        format!("+{price}")
    } else {
        price.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
