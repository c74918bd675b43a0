use rust_decimal::Decimal;

use super::{ProcessingContext, SubscriptionApplication};

/// Prepay future subscription invoices out of the remaining implied cost.
///
/// Payments are filled in due-date order (stable for equal dates) until the
/// remaining implied cost runs out; whatever survives becomes the input to
/// the commission stage. Pay-As-You-Go contracts have no subscription
/// schedule and skip this stage.
pub fn apply(mut ctx: ProcessingContext) -> ProcessingContext {
    if ctx.contract.is_pay_as_you_go {
        ctx.subscription = SubscriptionApplication {
            advance_fees_created: Decimal::ZERO,
            implied_after_subscription: ctx.credit.implied_after_credit,
        };
        return ctx;
    }

    // ISO dates compare chronologically as strings
    ctx.state
        .future_subscription_fees
        .sort_by(|a, b| a.due_date.cmp(&b.due_date));

    let mut available = ctx.credit.implied_after_credit;
    let mut advance_fees_created = Decimal::ZERO;

    for payment in ctx.state.future_subscription_fees.iter_mut() {
        if available <= Decimal::ZERO {
            break;
        }
        let take = payment.amount_owed().min(available);
        payment.amount_paid += take;
        available -= take;
        advance_fees_created += take;
    }

    ctx.subscription = SubscriptionApplication {
        advance_fees_created,
        implied_after_subscription: available,
    };
    ctx
}
