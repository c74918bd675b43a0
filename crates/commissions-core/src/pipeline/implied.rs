use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{ImpliedCost, ProcessingContext};
use crate::error::CommissionsError;
use crate::model::{Contract, Deal, LehmanTier, RateType};
use crate::types::{Money, Rate};
use crate::CommissionsResult;

/// Flat rate applied to exempt deals (1.5%).
pub const EXEMPT_RATE: Decimal = dec!(0.015);

/// The rate configuration that governs one deal, resolved by priority:
/// preferred override, exemption, Lehman schedule, fixed rate.
#[derive(Debug, Clone)]
pub enum EffectiveRate<'a> {
    Preferred(Rate),
    Exempt,
    Lehman {
        tiers: &'a [LehmanTier],
        accumulated: Money,
    },
    Fixed(Rate),
}

impl<'a> EffectiveRate<'a> {
    /// Pick the applicable rate kind for a deal. First match wins.
    pub fn resolve(deal: &Deal, contract: &'a Contract) -> CommissionsResult<EffectiveRate<'a>> {
        if deal.has_preferred_rate {
            let rate = deal.preferred_rate.ok_or_else(|| {
                CommissionsError::Internal("preferred rate missing after validation".into())
            })?;
            return Ok(EffectiveRate::Preferred(rate));
        }
        if deal.is_deal_exempt {
            return Ok(EffectiveRate::Exempt);
        }
        match contract.rate_type {
            RateType::Lehman => Ok(EffectiveRate::Lehman {
                tiers: &contract.lehman_tiers,
                accumulated: contract.accumulated_success_fees,
            }),
            RateType::Fixed => {
                let rate = contract.fixed_rate.ok_or_else(|| {
                    CommissionsError::Internal("fixed rate missing after validation".into())
                })?;
                Ok(EffectiveRate::Fixed(rate))
            }
        }
    }

    /// Evaluate the implied broker-dealer cost on the given basis.
    pub fn implied_cost(&self, basis: Money) -> Money {
        match self {
            EffectiveRate::Preferred(rate) => basis * rate,
            EffectiveRate::Exempt => basis * EXEMPT_RATE,
            EffectiveRate::Lehman { tiers, accumulated } => {
                lehman_implied(tiers, *accumulated, basis)
            }
            EffectiveRate::Fixed(rate) => basis * rate,
        }
    }
}

/// Derive the implied cost for the deal and store it in the context.
pub fn apply(mut ctx: ProcessingContext) -> CommissionsResult<ProcessingContext> {
    let rate = EffectiveRate::resolve(&ctx.deal, &ctx.contract)?;
    ctx.implied = ImpliedCost {
        implied_total: rate.implied_cost(ctx.deal.retainer_base()),
    };
    Ok(ctx)
}

// ---------------------------------------------------------------------------
// Lehman traversal
// ---------------------------------------------------------------------------

/// Walk the progressive tier schedule, consuming the deal's basis from the
/// cursor position set by historical volume.
///
/// A cursor that falls in a gap between tiers jumps to the next tier's lower
/// bound without consuming any of the deal. When the schedule is exhausted
/// before the basis is, the remainder accrues at rate zero; schedules are
/// expected to end in an unbounded terminal tier.
fn lehman_implied(tiers: &[LehmanTier], accumulated: Money, basis: Money) -> Money {
    let mut cursor = accumulated;
    let mut remaining = basis;
    let mut implied = Decimal::ZERO;

    for tier in tiers {
        if remaining <= Decimal::ZERO {
            break;
        }
        // tier fully consumed by historical volume
        if let Some(upper) = tier.upper_bound {
            if cursor >= upper {
                continue;
            }
        }
        if cursor < tier.lower_bound {
            cursor = tier.lower_bound;
        }
        let take = match tier.upper_bound {
            Some(upper) => remaining.min(upper - cursor),
            None => remaining,
        };
        implied += take * tier.rate;
        cursor += take;
        remaining -= take;
    }
    implied
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
