//! Derived aggregate totals and read-side views.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Partner, Payment};

/// Aggregate totals over the payment history.
///
/// Derived only: nothing outside the reconciler and its incremental append
/// paths may write these, so they always equal the sum of the history under
/// the current partner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub debt_paid: Decimal,
    pub salary_paid: Decimal,
    pub extra_payments: Decimal,
    pub per_partner_extra: BTreeMap<String, Decimal>,
    pub debt_fully_paid: bool,
}

/// One partner's position in the state view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerStanding {
    pub display_name: String,
    pub initial_debt: Decimal,
    pub share: Decimal,
    /// Proportional attribution of the pooled debt repayments plus this
    /// partner's extra-payment bucket.
    pub debt_paid: Decimal,
    pub remaining_debt: Decimal,
}

/// Snapshot of the ledger's derived state returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateView {
    pub totals: Totals,
    pub total_initial_debt: Decimal,
    pub remaining_debt: Decimal,
    pub partners: BTreeMap<String, PartnerStanding>,
}

/// Payments and salary flows attributed to one calendar month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyBreakdown {
    pub month: u32,
    pub year: i32,
    pub total_amount: Decimal,
    pub debt_paid: Decimal,
    pub total_salary: Decimal,
    pub per_partner_salary: BTreeMap<String, Decimal>,
    pub payments: Vec<Payment>,
}

impl PartnerStanding {
    pub fn new(partner: &Partner, attributed_debt_paid: Decimal) -> Self {
        Self {
            display_name: partner.display_name.clone(),
            initial_debt: partner.initial_debt,
            share: partner.share,
            debt_paid: attributed_debt_paid,
            remaining_debt: (partner.initial_debt - attributed_debt_paid).max(Decimal::ZERO),
        }
    }
}

/// History page: most recent payments first, plus current totals.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub payments: Vec<Payment>,
    pub totals: Totals,
    pub as_of: DateTime<Utc>,
}
