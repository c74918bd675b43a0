use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{FeeBreakdown, ProcessingContext};

/// FINRA/SIPC pass-through rate (0.4732%).
pub const FINRA_RATE: Decimal = dec!(0.004732);
/// Distribution fee rate when the deal was distributed.
pub const DISTRIBUTION_RATE: Decimal = dec!(0.10);
/// Sourcing fee rate when the deal was sourced.
pub const SOURCING_RATE: Decimal = dec!(0.10);

/// Compute the fixed regulatory and service fees on the fee basis.
///
/// These are deducted from the broker's gross at payout time; they never
/// feed debt collection or credit generation.
pub fn apply(mut ctx: ProcessingContext) -> ProcessingContext {
    let base = ctx.deal.retainer_base();

    ctx.fees = FeeBreakdown {
        finra_fee: if ctx.deal.has_finra_fee {
            base * FINRA_RATE
        } else {
            Decimal::ZERO
        },
        distribution_fee: if ctx.deal.is_distribution_fee_true {
            base * DISTRIBUTION_RATE
        } else {
            Decimal::ZERO
        },
        sourcing_fee: if ctx.deal.is_sourcing_fee_true {
            base * SOURCING_RATE
        } else {
            Decimal::ZERO
        },
    };
    ctx
}
