use rust_decimal::Decimal;

use super::{CommissionOutcome, ProcessingContext};

/// Classify the residual implied cost into commissions.
///
/// Standard contracts: whatever survived credit and subscription prepayment
/// is charged as commission, and a positive residual graduates the contract
/// into commissions mode.
///
/// Pay-As-You-Go contracts: the implied cost first fills the ARR bucket;
/// only the excess beyond the ARR target is commission. Crossing the target
/// flips the contract into commissions mode.
pub fn apply(mut ctx: ProcessingContext) -> ProcessingContext {
    ctx.commission = if ctx.contract.is_pay_as_you_go {
        calculate_payg(&ctx)
    } else {
        calculate_standard(&ctx)
    };
    ctx
}

fn calculate_standard(ctx: &ProcessingContext) -> CommissionOutcome {
    let commissions = ctx.subscription.implied_after_subscription;
    CommissionOutcome {
        finalis_commissions: commissions,
        arr_contribution: Decimal::ZERO,
        amount_not_charged_due_to_cap: Decimal::ZERO,
        entered_commissions_mode: commissions > Decimal::ZERO
            || ctx.initial_state.is_in_commissions_mode,
    }
}

fn calculate_payg(ctx: &ProcessingContext) -> CommissionOutcome {
    let implied_total = ctx.implied.implied_total;
    let arr_target = ctx.contract.annual_subscription;
    let accumulated = ctx.initial_state.payg_commissions_accumulated;

    if ctx.initial_state.is_in_commissions_mode {
        // ARR already settled in a previous deal; everything is excess
        return CommissionOutcome {
            finalis_commissions: implied_total,
            arr_contribution: Decimal::ZERO,
            amount_not_charged_due_to_cap: Decimal::ZERO,
            entered_commissions_mode: accumulated >= arr_target,
        };
    }

    let remaining_arr = (arr_target - accumulated).max(Decimal::ZERO);
    let arr_contribution = implied_total.min(remaining_arr);
    CommissionOutcome {
        finalis_commissions: implied_total - arr_contribution,
        arr_contribution,
        amount_not_charged_due_to_cap: Decimal::ZERO,
        entered_commissions_mode: accumulated + arr_contribution >= arr_target,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
