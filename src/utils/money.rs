// Conversions between major currency units and the processor's minor units

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// `round(major * 100)`, midpoint away from zero. `None` when the result
/// does not fit the wire type.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

pub fn format_minor_units(amount: i64, currency: &str) -> String {
    let major = Decimal::new(amount, 2);
    format!("{:.2} {}", major, currency.to_uppercase())
}
