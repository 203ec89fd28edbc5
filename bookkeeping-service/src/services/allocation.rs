//! Allocation calculator: splits one payment into per-partner debt
//! clearance and salary portions.
//!
//! Three-branch policy, in priority order:
//! 1. debt already cleared (or the configured debt pool is zero): the whole
//!    amount is salary, split by share;
//! 2. the remaining debt is less than half the payment: retire exactly the
//!    remainder, proportionally to each partner's original debt, and route
//!    the excess to salaries;
//! 3. steady state: half the payment targets the debt pool, half the
//!    salaries.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::{PartnerConfig, PartnerSplit, PaymentAllocation};

/// Split `amount` given the debt remaining before this payment applies.
///
/// `config.total_debt() == 0` is a degraded configuration, not a fault:
/// it falls back to the debt-cleared branch instead of dividing by zero.
pub fn allocate_payment(
    amount: Decimal,
    remaining_debt: Decimal,
    config: &PartnerConfig,
) -> PaymentAllocation {
    let total_debt = config.total_debt();
    if remaining_debt <= Decimal::ZERO || total_debt <= Decimal::ZERO {
        return salary_only(amount, config);
    }

    let half = amount / Decimal::TWO;
    let clears_pool = remaining_debt < half;
    let debt_clear_rate = if clears_pool {
        remaining_debt / total_debt
    } else {
        half / total_debt
    };

    let mut partners = BTreeMap::new();
    let mut debt_sum = Decimal::ZERO;
    let mut salary_sum = Decimal::ZERO;
    for (key, partner) in config.iter() {
        let debt_portion = partner.initial_debt * debt_clear_rate;
        let salary_portion = amount * partner.share - debt_portion;
        debt_sum += debt_portion;
        salary_sum += salary_portion;
        partners.insert(
            key.clone(),
            PartnerSplit {
                share: partner.share,
                debt_portion,
                salary_portion,
            },
        );
    }

    // When the pool is about to clear, pin the pools to the exact remainder
    // so no decimal residue leaks into the totals.
    let (to_debt_pool, to_salary_pool) = if clears_pool {
        (remaining_debt, amount - remaining_debt)
    } else {
        (debt_sum, salary_sum)
    };

    // Compare against the branch's debt target rather than the summed pool;
    // the sum can round a fraction below amount/2 on the exact-half edge.
    let debt_target = if clears_pool { remaining_debt } else { half };

    PaymentAllocation {
        to_debt_pool,
        to_salary_pool,
        debt_clear_rate,
        debt_complete: remaining_debt <= debt_target,
        partners,
    }
}

fn salary_only(amount: Decimal, config: &PartnerConfig) -> PaymentAllocation {
    let partners = config
        .iter()
        .map(|(key, partner)| {
            (
                key.clone(),
                PartnerSplit {
                    share: partner.share,
                    debt_portion: Decimal::ZERO,
                    salary_portion: amount * partner.share,
                },
            )
        })
        .collect();

    PaymentAllocation {
        to_debt_pool: Decimal::ZERO,
        to_salary_pool: amount,
        debt_clear_rate: Decimal::ZERO,
        debt_complete: true,
        partners,
    }
}
