//! Conversion between scraped price text and decimal amounts.
//!
//! The platform renders prices with a decimal comma and a currency suffix,
//! e.g. `"119,40 MAD"`. Only one currency is supported.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serializer;

pub const CURRENCY_LABEL: &str = "MAD";

/// Largest amount [`parse_price`] accepts. Anything above parses as zero, so
/// sums over a catalog of bounded amounts cannot overflow `Decimal`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

static DECIMAL_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)[,.]([0-9]+)").expect("valid decimal amount regex"));

static INTEGER_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid integer amount regex"));

/// Extracts the first amount found in `text`.
///
/// Tries `digits[,.]digits` first, then a bare run of digits. Anything else,
/// including empty text or an amount above [`MAX_AMOUNT`], yields zero.
#[must_use]
pub fn parse_price(text: &str) -> Decimal {
    let decimal = DECIMAL_AMOUNT
        .captures(text)
        .and_then(|caps| Decimal::from_str(&format!("{}.{}", &caps[1], &caps[2])).ok());
    let amount = decimal.or_else(|| {
        INTEGER_AMOUNT
            .find(text)
            .and_then(|m| Decimal::from_str(m.as_str()).ok())
    });

    match amount {
        Some(value) if value <= MAX_AMOUNT => value,
        _ => Decimal::ZERO,
    }
}

/// Formats an amount as `"1234,50 MAD"`: two decimals, comma separator.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2} {CURRENCY_LABEL}").replace('.', ",")
}

/// `serialize_with` helper emitting the [`format_price`] text.
pub(crate) fn serialize_formatted<S: Serializer>(amount: &Decimal, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_price(*amount))
}
