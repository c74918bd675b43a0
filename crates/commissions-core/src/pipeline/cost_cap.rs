use rust_decimal::Decimal;

use super::ProcessingContext;
use crate::model::CostCapType;

/// Clamp the chargeable commission total against the configured ceiling.
///
/// The cap constrains `finalis_commissions + arr_contribution` only; fixed
/// service fees sit outside it, and advance subscription fees are never
/// reduced but do consume cap headroom ahead of commissions. When the
/// remaining space has to be split in a Pay-As-You-Go deal, the ARR
/// contribution keeps priority and the excess absorbs the cut first.
pub fn apply(mut ctx: ProcessingContext) -> ProcessingContext {
    let (cap_type, cap_amount) = match (ctx.contract.cost_cap_type, ctx.contract.cost_cap_amount) {
        (Some(cap_type), Some(cap_amount)) => (cap_type, cap_amount),
        _ => return ctx,
    };

    let paid_so_far = match cap_type {
        CostCapType::Annual => ctx.initial_state.total_paid_this_contract_year,
        CostCapType::Total => ctx.initial_state.total_paid_all_time,
    };
    let available = (cap_amount - paid_so_far).max(Decimal::ZERO);

    let advance_fees = ctx.subscription.advance_fees_created;
    let arr_before = ctx.commission.arr_contribution;
    let excess_before = ctx.commission.finalis_commissions;
    let chargeable = arr_before + excess_before;

    if advance_fees + chargeable <= available {
        return ctx;
    }

    let space_for_commissions = (available - advance_fees).max(Decimal::ZERO);
    let arr_after = arr_before.min(space_for_commissions);
    let excess_after = excess_before.min(space_for_commissions - arr_after);

    ctx.commission.arr_contribution = arr_after;
    ctx.commission.finalis_commissions = excess_after;
    ctx.commission.amount_not_charged_due_to_cap = chargeable - (arr_after + excess_after);
    if arr_after < arr_before {
        // the cap truncated ARR coverage, so the target was not reached
        ctx.commission.entered_commissions_mode = false;
    }
    ctx
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contract, ContractState, Deal, DealRequest, RateType};
    use rust_decimal_macros::dec;

    fn context(
        cap: Option<(CostCapType, Decimal)>,
        paid_this_year: Decimal,
        paid_all_time: Decimal,
        payg: bool,
    ) -> ProcessingContext {
        let (cost_cap_type, cost_cap_amount) = match cap {
            Some((t, a)) => (Some(t), Some(a)),
            None => (None, None),
        };
        let request = DealRequest {
            deal: Deal {
                deal_name: "Cap".into(),
                success_fees: dec!(500_000),
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
                cost_cap_type,
                cost_cap_amount,
            },
            state: ContractState {
                total_paid_this_contract_year: paid_this_year,
                total_paid_all_time: paid_all_time,
                ..ContractState::default()
            },
        };
        ProcessingContext::new(&request).unwrap()
    }

    #[test]
    fn test_no_cap_is_a_passthrough() {
        let mut ctx = context(None, dec!(0), dec!(0), false);
        ctx.commission.finalis_commissions = dec!(25_000);
        let ctx = apply(ctx);
        assert_eq!(ctx.commission.finalis_commissions, dec!(25_000));
        assert_eq!(ctx.commission.amount_not_charged_due_to_cap, dec!(0));
    }

    #[test]
    fn test_annual_cap_truncates_commissions() {
        let mut ctx = context(
            Some((CostCapType::Annual, dec!(100_000))),
            dec!(90_000),
            dec!(90_000),
            false,
        );
        ctx.commission.finalis_commissions = dec!(25_000);
        ctx.commission.entered_commissions_mode = true;
        let ctx = apply(ctx);
        assert_eq!(ctx.commission.finalis_commissions, dec!(10_000));
        assert_eq!(ctx.commission.amount_not_charged_due_to_cap, dec!(15_000));
        // standard contracts keep their mode determination
        assert!(ctx.commission.entered_commissions_mode);
    }

    #[test]
    fn test_cap_exhausted_charges_nothing() {
        let mut ctx = context(
            Some((CostCapType::Annual, dec!(100_000))),
            dec!(120_000),
            dec!(120_000),
            false,
        );
        ctx.commission.finalis_commissions = dec!(25_000);
        let ctx = apply(ctx);
        assert_eq!(ctx.commission.finalis_commissions, dec!(0));
        assert_eq!(ctx.commission.amount_not_charged_due_to_cap, dec!(25_000));
    }

    #[test]
    fn test_advance_fees_consume_headroom_first() {
        let mut ctx = context(
            Some((CostCapType::Annual, dec!(100_000))),
            dec!(90_000),
            dec!(90_000),
            false,
        );
        ctx.subscription.advance_fees_created = dec!(7_000);
        ctx.commission.finalis_commissions = dec!(25_000);
        let ctx = apply(ctx);
        // 10,000 of space, 7,000 taken by advance fees
        assert_eq!(ctx.commission.finalis_commissions, dec!(3_000));
        assert_eq!(ctx.commission.amount_not_charged_due_to_cap, dec!(22_000));
        assert_eq!(ctx.subscription.advance_fees_created, dec!(7_000));
    }

    #[test]
    fn test_total_cap_uses_all_time_counter() {
        let mut ctx = context(
            Some((CostCapType::Total, dec!(50_000))),
            dec!(0),
            dec!(48_000),
            false,
        );
        ctx.commission.finalis_commissions = dec!(5_000);
        let ctx = apply(ctx);
        assert_eq!(ctx.commission.finalis_commissions, dec!(2_000));
        assert_eq!(ctx.commission.amount_not_charged_due_to_cap, dec!(3_000));
    }

    #[test]
    fn test_payg_excess_cut_before_arr() {
        let mut ctx = context(Some((CostCapType::Total, dec!(12_000))), dec!(0), dec!(0), true);
        ctx.commission.arr_contribution = dec!(10_000);
        ctx.commission.finalis_commissions = dec!(15_000);
        ctx.commission.entered_commissions_mode = true;
        let ctx = apply(ctx);
        // ARR keeps its full 10,000; excess squeezed into the remaining 2,000
        assert_eq!(ctx.commission.arr_contribution, dec!(10_000));
        assert_eq!(ctx.commission.finalis_commissions, dec!(2_000));
        assert_eq!(ctx.commission.amount_not_charged_due_to_cap, dec!(13_000));
        assert!(ctx.commission.entered_commissions_mode);
    }

    #[test]
    fn test_payg_truncated_arr_leaves_commissions_mode_unset() {
        let mut ctx = context(Some((CostCapType::Total, dec!(5_000))), dec!(0), dec!(0), true);
        ctx.commission.arr_contribution = dec!(10_000);
        ctx.commission.finalis_commissions = dec!(15_000);
        ctx.commission.entered_commissions_mode = true;
        let ctx = apply(ctx);
        assert_eq!(ctx.commission.arr_contribution, dec!(5_000));
        assert_eq!(ctx.commission.finalis_commissions, dec!(0));
        assert_eq!(ctx.commission.amount_not_charged_due_to_cap, dec!(20_000));
        assert!(!ctx.commission.entered_commissions_mode);
    }
}
