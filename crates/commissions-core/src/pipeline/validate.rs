use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::CommissionsError;
use crate::model::{Contract, ContractState, Deal, DealRequest, RateType};
use crate::types::Rate;
use crate::CommissionsResult;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validate a complete request before any arithmetic begins.
///
/// Every violation is reported as `InvalidInput` with the offending field
/// and a human-readable reason; the first violation found wins.
pub fn validate(request: &DealRequest) -> CommissionsResult<()> {
    validate_deal(&request.deal)?;
    validate_contract(&request.contract)?;
    validate_state(&request.state)?;
    validate_payg_constraints(&request.contract, &request.state)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Per-entity rules
// ---------------------------------------------------------------------------

fn validate_deal(deal: &Deal) -> CommissionsResult<()> {
    if deal.success_fees <= Decimal::ZERO {
        return Err(CommissionsError::InvalidInput {
            field: "success_fees".into(),
            reason: format!("must be positive, got {}", deal.success_fees),
        });
    }
    if deal.external_retainer < Decimal::ZERO {
        return Err(CommissionsError::InvalidInput {
            field: "external_retainer".into(),
            reason: format!("cannot be negative, got {}", deal.external_retainer),
        });
    }
    if deal.has_external_retainer && deal.include_retainer_in_fees.is_none() {
        return Err(CommissionsError::InvalidInput {
            field: "include_retainer_in_fees".into(),
            reason: "must be explicitly set when has_external_retainer is true".into(),
        });
    }
    if deal.has_preferred_rate {
        match deal.preferred_rate {
            None => {
                return Err(CommissionsError::InvalidInput {
                    field: "preferred_rate".into(),
                    reason: "required when has_preferred_rate is true".into(),
                });
            }
            Some(rate) => validate_rate("preferred_rate", rate)?,
        }
    }
    validate_date("deal_date", &deal.deal_date)?;
    Ok(())
}

fn validate_contract(contract: &Contract) -> CommissionsResult<()> {
    if contract.accumulated_success_fees < Decimal::ZERO {
        return Err(CommissionsError::InvalidInput {
            field: "accumulated_success_fees_before_this_deal".into(),
            reason: format!("cannot be negative, got {}", contract.accumulated_success_fees),
        });
    }

    match contract.rate_type {
        RateType::Fixed => match contract.fixed_rate {
            None => {
                return Err(CommissionsError::InvalidInput {
                    field: "fixed_rate".into(),
                    reason: "required when rate_type is 'fixed'".into(),
                });
            }
            Some(rate) => validate_rate("fixed_rate", rate)?,
        },
        RateType::Lehman => {
            if contract.lehman_tiers.is_empty() {
                return Err(CommissionsError::InvalidInput {
                    field: "lehman_tiers".into(),
                    reason: "at least one tier is required when rate_type is 'lehman'".into(),
                });
            }
            let mut previous_lower: Option<Decimal> = None;
            for (i, tier) in contract.lehman_tiers.iter().enumerate() {
                validate_rate(&format!("lehman_tiers[{i}].rate"), tier.rate)?;
                if let Some(upper) = tier.upper_bound {
                    if upper <= tier.lower_bound {
                        return Err(CommissionsError::InvalidInput {
                            field: format!("lehman_tiers[{i}].upper_bound"),
                            reason: format!(
                                "must exceed lower_bound ({} <= {})",
                                upper, tier.lower_bound
                            ),
                        });
                    }
                }
                if let Some(prev) = previous_lower {
                    if tier.lower_bound < prev {
                        return Err(CommissionsError::InvalidInput {
                            field: format!("lehman_tiers[{i}].lower_bound"),
                            reason: "tiers must be sorted ascending by lower_bound".into(),
                        });
                    }
                }
                previous_lower = Some(tier.lower_bound);
            }
        }
    }

    if contract.cost_cap_type.is_some() {
        match contract.cost_cap_amount {
            None => {
                return Err(CommissionsError::InvalidInput {
                    field: "cost_cap_amount".into(),
                    reason: "required when cost_cap_type is set".into(),
                });
            }
            Some(amount) if amount < Decimal::ZERO => {
                return Err(CommissionsError::InvalidInput {
                    field: "cost_cap_amount".into(),
                    reason: format!("cannot be negative, got {amount}"),
                });
            }
            Some(_) => {}
        }
    }

    if let Some(ref start) = contract.contract_start_date {
        validate_date("contract_start_date", start)?;
    }
    Ok(())
}

fn validate_state(state: &ContractState) -> CommissionsResult<()> {
    if state.current_credit < Decimal::ZERO {
        return Err(CommissionsError::InvalidInput {
            field: "current_credit".into(),
            reason: format!("cannot be negative, got {}", state.current_credit),
        });
    }
    if state.current_debt < Decimal::ZERO {
        return Err(CommissionsError::InvalidInput {
            field: "current_debt".into(),
            reason: format!("cannot be negative, got {}", state.current_debt),
        });
    }

    for payment in &state.future_subscription_fees {
        if payment.amount_due < Decimal::ZERO {
            return Err(CommissionsError::InvalidInput {
                field: format!("future_subscription_fees[{}].amount_due", payment.payment_id),
                reason: format!("cannot be negative, got {}", payment.amount_due),
            });
        }
        if payment.amount_paid < Decimal::ZERO {
            return Err(CommissionsError::InvalidInput {
                field: format!("future_subscription_fees[{}].amount_paid", payment.payment_id),
                reason: format!("cannot be negative, got {}", payment.amount_paid),
            });
        }
        if payment.amount_paid > payment.amount_due {
            return Err(CommissionsError::InvalidInput {
                field: format!("future_subscription_fees[{}].amount_paid", payment.payment_id),
                reason: format!(
                    "cannot exceed amount_due ({} > {})",
                    payment.amount_paid, payment.amount_due
                ),
            });
        }
        validate_date(
            &format!("future_subscription_fees[{}].due_date", payment.payment_id),
            &payment.due_date,
        )?;
    }

    for entry in &state.deferred_schedule {
        if entry.amount < Decimal::ZERO {
            return Err(CommissionsError::InvalidInput {
                field: format!("deferred_schedule[year {}].amount", entry.year),
                reason: format!("cannot be negative, got {}", entry.amount),
            });
        }
    }
    if state.deferred_subscription_fee < Decimal::ZERO {
        return Err(CommissionsError::InvalidInput {
            field: "deferred_subscription_fee".into(),
            reason: format!("cannot be negative, got {}", state.deferred_subscription_fee),
        });
    }
    Ok(())
}

/// Pay-As-You-Go contracts have no credit system and no subscription
/// prepayments; reject state that claims otherwise.
fn validate_payg_constraints(contract: &Contract, state: &ContractState) -> CommissionsResult<()> {
    if !contract.is_pay_as_you_go {
        return Ok(());
    }
    if state.current_credit > Decimal::ZERO {
        return Err(CommissionsError::InvalidInput {
            field: "current_credit".into(),
            reason: "Pay-As-You-Go contracts cannot carry credit".into(),
        });
    }
    if !state.future_subscription_fees.is_empty() {
        return Err(CommissionsError::InvalidInput {
            field: "future_subscription_fees".into(),
            reason: "Pay-As-You-Go contracts cannot have future subscription fees".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared checks
// ---------------------------------------------------------------------------

fn validate_rate(field: &str, rate: Rate) -> CommissionsResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(CommissionsError::InvalidInput {
            field: field.into(),
            reason: format!("must be between 0 and 1, got {rate}"),
        });
    }
    Ok(())
}

fn validate_date(field: &str, value: &str) -> CommissionsResult<()> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| CommissionsError::InvalidInput {
        field: field.into(),
        reason: format!("must be an ISO YYYY-MM-DD date, got '{value}'"),
    })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LehmanTier, SubscriptionPayment};
    use rust_decimal_macros::dec;

    fn valid_request() -> DealRequest {
        DealRequest {
            deal: Deal {
                deal_name: "Valid".into(),
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
                is_pay_as_you_go: false,
                annual_subscription: dec!(0),
                cost_cap_type: None,
                cost_cap_amount: None,
            },
            state: ContractState::default(),
        }
    }

    fn assert_rejects(request: &DealRequest, expected_field: &str) {
        match validate(request) {
            Err(CommissionsError::InvalidInput { field, .. }) => {
                assert!(
                    field.contains(expected_field),
                    "expected failure on '{expected_field}', got '{field}'"
                );
            }
            other => panic!("expected InvalidInput on '{expected_field}', got {other:?}"),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate(&valid_request()).is_ok());
    }

    #[test]
    fn test_rejects_zero_success_fees() {
        let mut req = valid_request();
        req.deal.success_fees = dec!(0);
        assert_rejects(&req, "success_fees");
    }

    #[test]
    fn test_rejects_negative_retainer() {
        let mut req = valid_request();
        req.deal.external_retainer = dec!(-1);
        assert_rejects(&req, "external_retainer");
    }

    #[test]
    fn test_rejects_retainer_without_inclusion_flag() {
        let mut req = valid_request();
        req.deal.has_external_retainer = true;
        req.deal.external_retainer = dec!(10_000);
        assert_rejects(&req, "include_retainer_in_fees");
    }

    #[test]
    fn test_rejects_missing_preferred_rate() {
        let mut req = valid_request();
        req.deal.has_preferred_rate = true;
        assert_rejects(&req, "preferred_rate");
    }

    #[test]
    fn test_rejects_preferred_rate_above_one() {
        let mut req = valid_request();
        req.deal.has_preferred_rate = true;
        req.deal.preferred_rate = Some(dec!(1.5));
        assert_rejects(&req, "preferred_rate");
    }

    #[test]
    fn test_rejects_malformed_deal_date() {
        let mut req = valid_request();
        req.deal.deal_date = "06/01/2025".into();
        assert_rejects(&req, "deal_date");
    }

    #[test]
    fn test_rejects_fixed_without_rate() {
        let mut req = valid_request();
        req.contract.fixed_rate = None;
        assert_rejects(&req, "fixed_rate");
    }

    #[test]
    fn test_rejects_lehman_without_tiers() {
        let mut req = valid_request();
        req.contract.rate_type = RateType::Lehman;
        req.contract.fixed_rate = None;
        assert_rejects(&req, "lehman_tiers");
    }

    #[test]
    fn test_rejects_unsorted_tiers() {
        let mut req = valid_request();
        req.contract.rate_type = RateType::Lehman;
        req.contract.lehman_tiers = vec![
            LehmanTier {
                lower_bound: dec!(1_000_000),
                upper_bound: Some(dec!(5_000_000)),
                rate: dec!(0.04),
            },
            LehmanTier {
                lower_bound: dec!(0),
                upper_bound: Some(dec!(1_000_000)),
                rate: dec!(0.05),
            },
        ];
        assert_rejects(&req, "lower_bound");
    }

    #[test]
    fn test_rejects_inverted_tier_bounds() {
        let mut req = valid_request();
        req.contract.rate_type = RateType::Lehman;
        req.contract.lehman_tiers = vec![LehmanTier {
            lower_bound: dec!(1_000_000),
            upper_bound: Some(dec!(500_000)),
            rate: dec!(0.05),
        }];
        assert_rejects(&req, "upper_bound");
    }

    #[test]
    fn test_rejects_tier_rate_out_of_range() {
        let mut req = valid_request();
        req.contract.rate_type = RateType::Lehman;
        req.contract.lehman_tiers = vec![LehmanTier {
            lower_bound: dec!(0),
            upper_bound: None,
            rate: dec!(1.01),
        }];
        assert_rejects(&req, "rate");
    }

    #[test]
    fn test_rejects_cap_type_without_amount() {
        let mut req = valid_request();
        req.contract.cost_cap_type = Some(crate::model::CostCapType::Annual);
        assert_rejects(&req, "cost_cap_amount");
    }

    #[test]
    fn test_rejects_negative_credit() {
        let mut req = valid_request();
        req.state.current_credit = dec!(-10);
        assert_rejects(&req, "current_credit");
    }

    #[test]
    fn test_rejects_overpaid_payment() {
        let mut req = valid_request();
        req.state.future_subscription_fees = vec![SubscriptionPayment {
            payment_id: "pmt-1".into(),
            due_date: "2025-09-01".into(),
            amount_due: dec!(1000),
            amount_paid: dec!(1500),
        }];
        assert_rejects(&req, "amount_paid");
    }

    #[test]
    fn test_rejects_bad_payment_due_date() {
        let mut req = valid_request();
        req.state.future_subscription_fees = vec![SubscriptionPayment {
            payment_id: "pmt-1".into(),
            due_date: "September 1st".into(),
            amount_due: dec!(1000),
            amount_paid: dec!(0),
        }];
        assert_rejects(&req, "due_date");
    }

    #[test]
    fn test_rejects_payg_with_credit() {
        let mut req = valid_request();
        req.contract.is_pay_as_you_go = true;
        req.state.current_credit = dec!(100);
        assert_rejects(&req, "current_credit");
    }

    #[test]
    fn test_rejects_payg_with_future_payments() {
        let mut req = valid_request();
        req.contract.is_pay_as_you_go = true;
        req.state.future_subscription_fees = vec![SubscriptionPayment {
            payment_id: "pmt-1".into(),
            due_date: "2025-09-01".into(),
            amount_due: dec!(1000),
            amount_paid: dec!(0),
        }];
        assert_rejects(&req, "future_subscription_fees");
    }

    #[test]
    fn test_accepts_rate_boundaries() {
        let mut req = valid_request();
        req.contract.fixed_rate = Some(dec!(0));
        assert!(validate(&req).is_ok());
        req.contract.fixed_rate = Some(dec!(1));
        assert!(validate(&req).is_ok());
    }
}
