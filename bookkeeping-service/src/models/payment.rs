//! Payment records: the regular/extra tagged union and derived allocations.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Inclusive date range a payment is considered to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl EffectivePeriod {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.start > self.end {
            return Err(AppError::ValidationError(format!(
                "effective period starts {} after it ends {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Whether this period overlaps the inclusive range.
    pub fn overlaps(&self, range_start: NaiveDate, range_end: NaiveDate) -> bool {
        self.start <= range_end && self.end >= range_start
    }
}

/// One partner's slice of a regular payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerSplit {
    pub share: Decimal,
    pub debt_portion: Decimal,
    pub salary_portion: Decimal,
}

/// Derived breakdown of a regular payment.
///
/// A materialized view: always recomputable from the payment amount, the
/// partner configuration and the remaining debt when the payment applies.
/// Reconciliation overwrites it wholesale; it is never authoritative on
/// its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    pub to_debt_pool: Decimal,
    pub to_salary_pool: Decimal,
    /// Fraction of each partner's original debt retired by this payment.
    pub debt_clear_rate: Decimal,
    /// True the instant this payment clears the debt pool.
    pub debt_complete: bool,
    pub partners: BTreeMap<String, PartnerSplit>,
}

/// A payment run through the split algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegularPayment {
    pub id: Uuid,
    pub amount: Decimal,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<EffectivePeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    pub allocation: PaymentAllocation,
}

/// An out-of-band amount applied directly to one partner's debt bucket.
///
/// Positive means a debt repayment, negative means new debt incurred.
/// Never goes through the split algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPayment {
    pub id: Uuid,
    pub partner_key: String,
    pub amount: Decimal,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
}

/// The two payment variants kept in a single insertion-ordered history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payment {
    Regular(RegularPayment),
    Extra(ExtraPayment),
}

impl Payment {
    pub fn id(&self) -> Uuid {
        match self {
            Payment::Regular(p) => p.id,
            Payment::Extra(p) => p.id,
        }
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        match self {
            Payment::Regular(p) => p.recorded_at,
            Payment::Extra(p) => p.recorded_at,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Payment::Regular(p) => p.amount,
            Payment::Extra(p) => p.amount,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Payment::Regular(_) => "regular",
            Payment::Extra(_) => "extra",
        }
    }
}

/// Mutable fields of a payment edit. Type and partner are immutable after
/// creation; anything absent is left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentEdit {
    pub amount: Option<Decimal>,
    pub comment: Option<String>,
    pub period: Option<EffectivePeriod>,
}
