use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Deal
// ---------------------------------------------------------------------------

/// The new deal being processed. Immutable for the duration of one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub deal_name: String,
    /// Gross success fees collected from the client for this deal. Must be > 0.
    pub success_fees: Money,
    /// Closing date, ISO `YYYY-MM-DD`.
    pub deal_date: String,
    pub is_distribution_fee_true: bool,
    pub is_sourcing_fee_true: bool,
    pub is_deal_exempt: bool,
    /// FINRA/SIPC pass-through applies unless explicitly switched off.
    #[serde(default = "default_true")]
    pub has_finra_fee: bool,
    /// Retainer paid to the member outside the platform. Never flows through
    /// debt collection or the payout; may join the fee basis.
    #[serde(default)]
    pub external_retainer: Money,
    #[serde(default)]
    pub has_external_retainer: bool,
    /// Must be explicitly present whenever `has_external_retainer` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_retainer_in_fees: Option<bool>,
    #[serde(default)]
    pub has_preferred_rate: bool,
    /// Deal-level rate override; short-circuits all other rate logic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_rate: Option<Rate>,
}

impl Deal {
    /// The basis used for every fee and implied-cost calculation: the external
    /// retainer joins the success fees only when it is explicitly included.
    pub fn retainer_base(&self) -> Money {
        if self.has_external_retainer && self.include_retainer_in_fees == Some(true) {
            self.success_fees + self.external_retainer
        } else {
            self.success_fees
        }
    }
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// How the implied broker-dealer cost is derived from deal volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateType {
    Fixed,
    Lehman,
}

/// A single band in a Lehman progressive rate schedule.
///
/// Bands are half-open `[lower_bound, upper_bound)` over cumulative deal
/// volume; `upper_bound == None` means unbounded. Gaps between consecutive
/// bands are permitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LehmanTier {
    pub lower_bound: Money,
    #[serde(default)]
    pub upper_bound: Option<Money>,
    pub rate: Rate,
}

/// Which running total a cost cap is enforced against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCapType {
    Annual,
    Total,
}

/// Contract configuration and rules. Immutable for the duration of one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub rate_type: RateType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_rate: Option<Rate>,
    #[serde(default)]
    pub lehman_tiers: Vec<LehmanTier>,
    /// Cumulative success fees closed under this contract before this deal;
    /// positions the cursor for Lehman tier traversal.
    #[serde(rename = "accumulated_success_fees_before_this_deal", default)]
    pub accumulated_success_fees: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_start_date: Option<String>,
    #[serde(default)]
    pub is_pay_as_you_go: bool,
    /// ARR target a Pay-As-You-Go contract accumulates against.
    #[serde(default)]
    pub annual_subscription: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_cap_type: Option<CostCapType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_cap_amount: Option<Money>,
}

// ---------------------------------------------------------------------------
// Contract state
// ---------------------------------------------------------------------------

/// A scheduled future subscription payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPayment {
    pub payment_id: String,
    /// ISO `YYYY-MM-DD`; payments are consumed in due-date order.
    pub due_date: String,
    pub amount_due: Money,
    #[serde(default)]
    pub amount_paid: Money,
}

impl SubscriptionPayment {
    pub fn amount_owed(&self) -> Money {
        self.amount_due - self.amount_paid
    }
}

/// A subscription fee deferred into a specific contract year for later
/// collection out of deal proceeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeferredScheduleEntry {
    /// Contract-year ordinal, 1-based.
    pub year: i32,
    pub amount: Money,
}

/// Evolving state of the contract. The engine deep-copies this on entry and
/// returns the successor state; the caller persists it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractState {
    #[serde(default)]
    pub current_credit: Money,
    #[serde(default)]
    pub current_debt: Money,
    #[serde(default)]
    pub is_in_commissions_mode: bool,
    #[serde(default)]
    pub future_subscription_fees: Vec<SubscriptionPayment>,
    #[serde(default)]
    pub deferred_schedule: Vec<DeferredScheduleEntry>,
    /// Legacy single deferred balance, not tied to a contract year. Applies
    /// only when `deferred_schedule` is empty.
    #[serde(default)]
    pub deferred_subscription_fee: Money,
    #[serde(default)]
    pub total_paid_this_contract_year: Money,
    #[serde(default)]
    pub total_paid_all_time: Money,
    #[serde(default)]
    pub payg_commissions_accumulated: Money,
}

/// Complete input for processing one deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealRequest {
    pub deal: Deal,
    pub contract: Contract,
    pub state: ContractState,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
