use rust_decimal::Decimal;

use super::ProcessingContext;
use crate::error::CommissionsError;
use crate::types::Money;
use crate::CommissionsResult;

/// Compute the net payout and roll the contract state forward.
///
/// Net payout is the deal's gross minus every deduction: service fees, debt
/// collected, advance subscription fees, commissions and the ARR
/// contribution. Clamped at zero defensively. The payment counters grow by
/// the post-cap chargeable amounts only.
pub fn apply(mut ctx: ProcessingContext) -> CommissionsResult<ProcessingContext> {
    check_invariants(&ctx)?;

    let deductions = ctx.fees.finra_fee
        + ctx.fees.distribution_fee
        + ctx.fees.sourcing_fee
        + ctx.debt.total_collected
        + ctx.subscription.advance_fees_created
        + ctx.commission.finalis_commissions
        + ctx.commission.arr_contribution;
    ctx.net_payout = (ctx.deal.success_fees - deductions).max(Decimal::ZERO);

    let charged = ctx.subscription.advance_fees_created
        + ctx.commission.finalis_commissions
        + ctx.commission.arr_contribution;
    ctx.state.total_paid_this_contract_year += charged;
    ctx.state.total_paid_all_time += charged;
    ctx.state.is_in_commissions_mode =
        ctx.initial_state.is_in_commissions_mode || ctx.commission.entered_commissions_mode;
    if ctx.contract.is_pay_as_you_go {
        // the running PAYG tracker carries ARR coverage plus excess
        ctx.state.payg_commissions_accumulated +=
            ctx.commission.arr_contribution + ctx.commission.finalis_commissions;
    }
    Ok(ctx)
}

/// Guard the arithmetic invariants every stage is supposed to preserve.
/// A violation here is a bug in the pipeline, not a caller error.
fn check_invariants(ctx: &ProcessingContext) -> CommissionsResult<()> {
    let non_negative: [(&str, Money); 8] = [
        ("implied_total", ctx.implied.implied_total),
        ("debt_collected", ctx.debt.total_collected),
        ("credit_used", ctx.credit.credit_used),
        ("advance_fees_created", ctx.subscription.advance_fees_created),
        ("finalis_commissions", ctx.commission.finalis_commissions),
        ("arr_contribution", ctx.commission.arr_contribution),
        ("current_credit", ctx.state.current_credit),
        ("current_debt", ctx.state.current_debt),
    ];
    for (name, value) in non_negative {
        if value < Decimal::ZERO {
            return Err(CommissionsError::Internal(format!(
                "{name} went negative while processing '{}'",
                ctx.deal.deal_name
            )));
        }
    }
    if ctx.implied.implied_total < ctx.credit.implied_after_credit
        || ctx.credit.implied_after_credit < ctx.subscription.implied_after_subscription
    {
        return Err(CommissionsError::Internal(format!(
            "implied cost increased along the pipeline for '{}'",
            ctx.deal.deal_name
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
