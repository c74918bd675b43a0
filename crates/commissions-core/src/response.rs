//! Response assembly.
//!
//! Every monetary field is quantized to two fractional digits (half-up) as
//! it is copied out of the processing context, so serialized responses carry
//! exact money strings while the pipeline itself keeps full precision.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{DeferredScheduleEntry, SubscriptionPayment};
use crate::pipeline::ProcessingContext;
use crate::types::{quantize_money, Money};

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealSummary {
    pub deal_name: String,
    pub success_fees: Money,
    pub deal_date: String,
    pub contract_year: i32,
}

/// The full fee and commission breakdown for one deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calculations {
    pub finra_fee: Money,
    pub distribution_fee: Money,
    pub sourcing_fee: Money,
    pub implied_total: Money,
    pub debt_collected: Money,
    pub credit_used: Money,
    pub implied_after_credit: Money,
    pub advance_fees_created: Money,
    pub implied_after_subscription: Money,
    pub finalis_commissions: Money,
    pub amount_not_charged_due_to_cap: Money,
    pub net_payout: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChanges {
    pub debt_collected: Money,
    pub debt_remaining: Money,
    pub credit_generated: Money,
    pub credit_used: Money,
    pub credit_remaining: Money,
    pub entered_commissions_mode: bool,
    pub is_now_in_commissions_mode: bool,
}

/// The successor contract state the caller persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatedContractState {
    pub current_credit: Money,
    pub current_debt: Money,
    pub is_in_commissions_mode: bool,
    pub deferred_schedule: Vec<DeferredScheduleEntry>,
    pub deferred_subscription_fee: Money,
    pub total_paid_this_contract_year: Money,
    pub total_paid_all_time: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payg_commissions_accumulated: Option<Money>,
}

/// ARR progress for Pay-As-You-Go contracts.
///
/// `finalis_commissions_this_deal` is the excess beyond the ARR target only;
/// add `arr_contribution_this_deal` for the total charged to the member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaygTracking {
    pub arr_target: Money,
    pub arr_contribution_this_deal: Money,
    pub finalis_commissions_this_deal: Money,
    pub commissions_accumulated: Money,
    pub remaining_to_cover_arr: Money,
    /// Percent of the ARR target covered so far, two decimals.
    pub arr_coverage_percentage: Decimal,
}

/// Final output of deal processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealResult {
    pub deal_summary: DealSummary,
    pub calculations: Calculations,
    pub state_changes: StateChanges,
    pub updated_future_payments: Vec<SubscriptionPayment>,
    pub updated_contract_state: UpdatedContractState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payg_tracking: Option<PaygTracking>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assemble the response from a fully processed context.
pub fn build(ctx: &ProcessingContext) -> DealResult {
    DealResult {
        deal_summary: DealSummary {
            deal_name: ctx.deal.deal_name.clone(),
            success_fees: quantize_money(ctx.deal.success_fees),
            deal_date: ctx.deal.deal_date.clone(),
            contract_year: ctx.contract_year,
        },
        calculations: Calculations {
            finra_fee: quantize_money(ctx.fees.finra_fee),
            distribution_fee: quantize_money(ctx.fees.distribution_fee),
            sourcing_fee: quantize_money(ctx.fees.sourcing_fee),
            implied_total: quantize_money(ctx.implied.implied_total),
            debt_collected: quantize_money(ctx.debt.total_collected),
            credit_used: quantize_money(ctx.credit.credit_used),
            implied_after_credit: quantize_money(ctx.credit.implied_after_credit),
            advance_fees_created: quantize_money(ctx.subscription.advance_fees_created),
            implied_after_subscription: quantize_money(
                ctx.subscription.implied_after_subscription,
            ),
            finalis_commissions: quantize_money(ctx.commission.finalis_commissions),
            amount_not_charged_due_to_cap: quantize_money(
                ctx.commission.amount_not_charged_due_to_cap,
            ),
            net_payout: quantize_money(ctx.net_payout),
        },
        state_changes: StateChanges {
            debt_collected: quantize_money(ctx.debt.total_collected),
            debt_remaining: quantize_money(ctx.state.current_debt),
            credit_generated: quantize_money(ctx.debt.credit_generated),
            credit_used: quantize_money(ctx.credit.credit_used),
            credit_remaining: quantize_money(ctx.state.current_credit),
            entered_commissions_mode: ctx.commission.entered_commissions_mode,
            is_now_in_commissions_mode: ctx.state.is_in_commissions_mode,
        },
        updated_future_payments: ctx
            .state
            .future_subscription_fees
            .iter()
            .map(|p| SubscriptionPayment {
                payment_id: p.payment_id.clone(),
                due_date: p.due_date.clone(),
                amount_due: quantize_money(p.amount_due),
                amount_paid: quantize_money(p.amount_paid),
            })
            .collect(),
        updated_contract_state: UpdatedContractState {
            current_credit: quantize_money(ctx.state.current_credit),
            current_debt: quantize_money(ctx.state.current_debt),
            is_in_commissions_mode: ctx.state.is_in_commissions_mode,
            deferred_schedule: ctx
                .state
                .deferred_schedule
                .iter()
                .map(|e| DeferredScheduleEntry {
                    year: e.year,
                    amount: quantize_money(e.amount),
                })
                .collect(),
            deferred_subscription_fee: quantize_money(ctx.state.deferred_subscription_fee),
            total_paid_this_contract_year: quantize_money(ctx.state.total_paid_this_contract_year),
            total_paid_all_time: quantize_money(ctx.state.total_paid_all_time),
            payg_commissions_accumulated: ctx
                .contract
                .is_pay_as_you_go
                .then(|| quantize_money(ctx.state.payg_commissions_accumulated)),
        },
        payg_tracking: build_payg_tracking(ctx),
    }
}

fn build_payg_tracking(ctx: &ProcessingContext) -> Option<PaygTracking> {
    if !ctx.contract.is_pay_as_you_go {
        return None;
    }

    let arr_target = ctx.contract.annual_subscription;
    // rolled forward by the payout stage: prior + ARR contribution + excess
    let accumulated = ctx.state.payg_commissions_accumulated;
    let coverage = if arr_target > Decimal::ZERO {
        quantize_money(accumulated / arr_target * dec!(100))
    } else {
        quantize_money(Decimal::ZERO)
    };

    Some(PaygTracking {
        arr_target: quantize_money(arr_target),
        arr_contribution_this_deal: quantize_money(ctx.commission.arr_contribution),
        finalis_commissions_this_deal: quantize_money(ctx.commission.finalis_commissions),
        commissions_accumulated: quantize_money(accumulated),
        remaining_to_cover_arr: quantize_money((arr_target - accumulated).max(Decimal::ZERO)),
        arr_coverage_percentage: coverage,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contract, ContractState, Deal, DealRequest, RateType};
    use crate::pipeline::ProcessingContext;
    use rust_decimal_macros::dec;

    fn context(payg: bool) -> ProcessingContext {
        let request = DealRequest {
            deal: Deal {
                deal_name: "Response".into(),
                success_fees: dec!(100_000),
                deal_date: "2025-06-01".into(),
                is_distribution_fee_true: false,
                is_sourcing_fee_true: false,
                is_deal_exempt: false,
                has_finra_fee: true,
                external_retainer: dec!(0),
                has_external_retainer: false,
                include_retainer_in_fees: None,
                has_preferred_rate: false,
                preferred_rate: None,
            },
            contract: Contract {
                rate_type: RateType::Fixed,
                fixed_rate: Some(dec!(0.05)),
                lehman_tiers: vec![],
                accumulated_success_fees: dec!(0),
                contract_start_date: None,
                is_pay_as_you_go: payg,
                annual_subscription: dec!(10_000),
                cost_cap_type: None,
                cost_cap_amount: None,
            },
            state: ContractState::default(),
        };
        ProcessingContext::new(&request).unwrap()
    }

    #[test]
    fn test_monetary_fields_quantized_to_two_digits() {
        let mut ctx = context(false);
        ctx.fees.finra_fee = dec!(473.2);
        ctx.implied.implied_total = dec!(5000);
        let result = build(&ctx);
        assert_eq!(result.calculations.finra_fee.to_string(), "473.20");
        assert_eq!(result.calculations.implied_total.to_string(), "5000.00");
        assert_eq!(result.deal_summary.success_fees.to_string(), "100000.00");
    }

    #[test]
    fn test_standard_contract_has_no_payg_block() {
        let result = build(&context(false));
        assert!(result.payg_tracking.is_none());
        assert!(result
            .updated_contract_state
            .payg_commissions_accumulated
            .is_none());
    }

    #[test]
    fn test_payg_tracking_reports_coverage() {
        let mut ctx = context(true);
        ctx.state.payg_commissions_accumulated = dec!(13_000);
        ctx.commission.arr_contribution = dec!(2_000);
        ctx.commission.finalis_commissions = dec!(3_000);
        let tracking = build(&ctx).payg_tracking.unwrap();
        assert_eq!(tracking.arr_target, dec!(10_000));
        assert_eq!(tracking.commissions_accumulated, dec!(13_000));
        assert_eq!(tracking.remaining_to_cover_arr, dec!(0));
        assert_eq!(tracking.arr_coverage_percentage.to_string(), "130.00");
    }

    #[test]
    fn test_payg_zero_target_reports_zero_coverage() {
        let mut ctx = context(true);
        ctx.contract.annual_subscription = dec!(0);
        let tracking = build(&ctx).payg_tracking.unwrap();
        assert_eq!(tracking.arr_coverage_percentage, dec!(0));
    }
}
