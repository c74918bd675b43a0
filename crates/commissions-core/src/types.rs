use rust_decimal::{Decimal, RoundingStrategy};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Quantize a monetary value for emission: two fractional digits, half-up.
///
/// Intermediate pipeline arithmetic keeps full precision; this is applied
/// once per emitted field when the response is assembled. The rescale pads
/// trailing zeros so serialized values always carry two fractional digits.
pub fn quantize_money(value: Money) -> Money {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
