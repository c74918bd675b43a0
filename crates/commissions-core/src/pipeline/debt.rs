use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{DebtCollection, ProcessingContext};
use crate::error::CommissionsError;
use crate::model::ContractState;
use crate::types::Money;
use crate::CommissionsResult;

/// Days in a contract year. Fixed 365-day slices; leap days are
/// intentionally ignored so year boundaries stay deterministic.
pub const DAYS_PER_CONTRACT_YEAR: i64 = 365;

/// Which 1-based contract year the deal date falls in.
///
/// Year 1 covers days 0 through 364 after the start date. Both dates are
/// validated upstream; a parse failure here is a bug.
pub fn contract_year(contract_start_date: &str, deal_date: &str) -> CommissionsResult<i32> {
    let start = parse_date(contract_start_date)?;
    let deal = parse_date(deal_date)?;
    let days = (deal - start).num_days();
    Ok(days.div_euclid(DAYS_PER_CONTRACT_YEAR) as i32 + 1)
}

fn parse_date(value: &str) -> CommissionsResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| CommissionsError::Internal(format!("unvalidated date '{value}': {e}")))
}

/// Collect outstanding debt out of the deal's gross.
///
/// Regular debt is collected first, then the deferred subscription amount
/// applicable to the current contract year; both are bounded by
/// `success_fees` (the external retainer never flows through the engine).
/// For standard contracts every collected unit converts to credit;
/// Pay-As-You-Go contracts generate none.
pub fn apply(mut ctx: ProcessingContext) -> ProcessingContext {
    let available = ctx.deal.success_fees;

    let regular_collected = ctx.state.current_debt.min(available);
    ctx.state.current_debt -= regular_collected;

    let deferred_collected = collect_deferred(
        &mut ctx.state,
        ctx.contract.contract_start_date.is_some(),
        ctx.contract_year,
        available - regular_collected,
    );

    let total_collected = regular_collected + deferred_collected;
    let credit_generated = if ctx.contract.is_pay_as_you_go {
        Decimal::ZERO
    } else {
        total_collected
    };
    ctx.state.current_credit += credit_generated;

    ctx.debt = DebtCollection {
        regular_collected,
        deferred_collected,
        total_collected,
        credit_generated,
    };
    ctx
}

/// Collect from the deferred schedule (year-keyed) or the legacy scalar.
///
/// The schedule, when present, takes precedence and needs a contract start
/// date to anchor the year lookup. The legacy balance is year-independent.
/// The touched schedule entry is decremented and dropped once empty.
fn collect_deferred(
    state: &mut ContractState,
    has_start_date: bool,
    year: i32,
    available: Money,
) -> Money {
    if available <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    if !state.deferred_schedule.is_empty() {
        if !has_start_date {
            return Decimal::ZERO;
        }
        let Some(idx) = state.deferred_schedule.iter().position(|e| e.year == year) else {
            return Decimal::ZERO;
        };
        let take = state.deferred_schedule[idx].amount.min(available);
        state.deferred_schedule[idx].amount -= take;
        if state.deferred_schedule[idx].amount.is_zero() {
            state.deferred_schedule.remove(idx);
        }
        return take;
    }

    let take = state.deferred_subscription_fee.min(available);
    state.deferred_subscription_fee -= take;
    take
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
