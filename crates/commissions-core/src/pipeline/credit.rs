use rust_decimal::Decimal;

use super::{CreditApplication, ProcessingContext};

/// Apply available credit against the implied cost.
///
/// The working credit balance already includes what this deal's debt
/// collection generated. Pay-As-You-Go contracts have no credit system and
/// pass the implied cost through untouched.
pub fn apply(mut ctx: ProcessingContext) -> ProcessingContext {
    if ctx.contract.is_pay_as_you_go {
        ctx.credit = CreditApplication {
            credit_used: Decimal::ZERO,
            implied_after_credit: ctx.implied.implied_total,
        };
        return ctx;
    }

    let credit_used = ctx.state.current_credit.min(ctx.implied.implied_total);
    ctx.state.current_credit -= credit_used;
    ctx.credit = CreditApplication {
        credit_used,
        implied_after_credit: ctx.implied.implied_total - credit_used,
    };
    ctx
}
