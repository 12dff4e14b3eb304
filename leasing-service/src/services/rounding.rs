//! Monetary rounding.

use rust_decimal::Decimal;

/// Nudge added before rounding so values that are a hair under a half cent
/// after a division still round up.
pub const ROUNDING_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 10);

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
const HALF: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Round half up to two decimal places.
///
/// `floor((x + ε) * 100 + 0.5) / 100`, so halves round toward positive
/// infinity for negative values too. The result always has scale 2.
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = ((value + ROUNDING_EPSILON) * HUNDRED + HALF).floor() / HUNDRED;
    rounded.rescale(2);
    rounded
}

/// [`round2`] that returns `None` instead of overflowing near `Decimal::MAX`.
pub fn checked_round2(value: Decimal) -> Option<Decimal> {
    let mut rounded = value
        .checked_add(ROUNDING_EPSILON)?
        .checked_mul(HUNDRED)?
        .checked_add(HALF)?
        .floor()
        .checked_div(HUNDRED)?;
    rounded.rescale(2);
    Some(rounded)
}
