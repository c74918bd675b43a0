//! The deal-processing pipeline.
//!
//! Stages run in a fixed order, each taking ownership of the
//! [`ProcessingContext`] and handing it forward. The ordering is load-bearing:
//! every stage consumes intermediates produced by the ones before it.

pub mod commission;
pub mod cost_cap;
pub mod credit;
pub mod debt;
pub mod fees;
pub mod implied;
pub mod payout;
pub mod subscription;
pub mod validate;

use crate::model::{Contract, ContractState, Deal, DealRequest};
use crate::response::{self, DealResult};
use crate::types::Money;
use crate::CommissionsResult;

// ---------------------------------------------------------------------------
// Stage results
// ---------------------------------------------------------------------------

/// Fixed regulatory and service fees (§ fee calculator).
#[derive(Debug, Clone, Default)]
pub struct FeeBreakdown {
    pub finra_fee: Money,
    pub distribution_fee: Money,
    pub sourcing_fee: Money,
}

/// Baseline broker-dealer cost before credits, prepayments and caps.
#[derive(Debug, Clone, Default)]
pub struct ImpliedCost {
    pub implied_total: Money,
}

/// What was collected out of the deal's gross, and the credit it generated.
#[derive(Debug, Clone, Default)]
pub struct DebtCollection {
    pub regular_collected: Money,
    pub deferred_collected: Money,
    pub total_collected: Money,
    pub credit_generated: Money,
}

#[derive(Debug, Clone, Default)]
pub struct CreditApplication {
    pub credit_used: Money,
    pub implied_after_credit: Money,
}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionApplication {
    pub advance_fees_created: Money,
    pub implied_after_subscription: Money,
}

/// Commission outcome; rewritten in place by the cost-cap enforcer.
#[derive(Debug, Clone, Default)]
pub struct CommissionOutcome {
    /// Standard contracts: the full residual commission. PAYG: excess over ARR.
    pub finalis_commissions: Money,
    /// PAYG only; always zero for standard contracts.
    pub arr_contribution: Money,
    pub amount_not_charged_due_to_cap: Money,
    pub entered_commissions_mode: bool,
}

// ---------------------------------------------------------------------------
// Processing context
// ---------------------------------------------------------------------------

/// The per-call bag that flows through the pipeline.
///
/// Inputs are deep-copied on construction so the caller's structures are
/// never aliased: `state` is the working copy the stages mutate, while
/// `initial_state` stays pristine for reporting and cap lookups.
#[derive(Debug, Clone)]
pub struct ProcessingContext {
    pub deal: Deal,
    pub contract: Contract,
    pub initial_state: ContractState,
    pub state: ContractState,
    /// 1-based contract year of the deal date; 1 when no start date is known.
    pub contract_year: i32,
    pub fees: FeeBreakdown,
    pub implied: ImpliedCost,
    pub debt: DebtCollection,
    pub credit: CreditApplication,
    pub subscription: SubscriptionApplication,
    pub commission: CommissionOutcome,
    pub net_payout: Money,
}

impl ProcessingContext {
    /// Build the initial context from a validated request.
    pub fn new(request: &DealRequest) -> CommissionsResult<Self> {
        let contract_year = match request.contract.contract_start_date {
            Some(ref start) => debt::contract_year(start, &request.deal.deal_date)?,
            None => 1,
        };

        Ok(ProcessingContext {
            deal: request.deal.clone(),
            contract: request.contract.clone(),
            initial_state: request.state.clone(),
            state: request.state.clone(),
            contract_year,
            fees: FeeBreakdown::default(),
            implied: ImpliedCost::default(),
            debt: DebtCollection::default(),
            credit: CreditApplication::default(),
            subscription: SubscriptionApplication::default(),
            commission: CommissionOutcome::default(),
            net_payout: Money::ZERO,
        })
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Process one deal through the complete pipeline.
///
/// Pipeline order: validate → fees → implied cost → debt collection →
/// credit → subscription prepayment → commissions → cost cap → payout.
/// Purely functional with respect to the request; the returned
/// [`DealResult`] carries the successor contract state for the caller to
/// persist.
pub fn process_deal(request: &DealRequest) -> CommissionsResult<DealResult> {
    validate::validate(request)?;

    let ctx = ProcessingContext::new(request)?;
    let ctx = fees::apply(ctx);
    let ctx = implied::apply(ctx)?;
    let ctx = debt::apply(ctx);
    let ctx = credit::apply(ctx);
    let ctx = subscription::apply(ctx);
    let ctx = commission::apply(ctx);
    let ctx = cost_cap::apply(ctx);
    let ctx = payout::apply(ctx)?;

    Ok(response::build(&ctx))
}
