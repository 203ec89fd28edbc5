//! Partner configuration: initial debts and salary shares.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::collections::BTreeMap;

/// A single partner: what they owe and their cut of the salary pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub display_name: String,
    /// Fixed debt apportioned to this partner at configuration time.
    pub initial_debt: Decimal,
    /// Fraction of the salary pool, in [0, 1]. Independent of the debt share.
    pub share: Decimal,
}

/// Mapping from partner key to partner record.
///
/// Keyed rather than fixed-arity so the allocation calculator stays
/// partner-count agnostic. `BTreeMap` keeps iteration order deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerConfig {
    pub partners: BTreeMap<String, Partner>,
}

impl PartnerConfig {
    /// The full debt pool across all partners.
    pub fn total_debt(&self) -> Decimal {
        self.partners.values().map(|p| p.initial_debt).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.partners.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Partner)> {
        self.partners.iter()
    }

    /// Reject configurations that would make the split meaningless:
    /// no partners, negative debts, shares outside [0, 1], or shares
    /// not summing to 1 within the 0.01 tolerance.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.partners.is_empty() {
            return Err(AppError::ValidationError(
                "partner configuration has no partners".to_string(),
            ));
        }
        for (key, partner) in &self.partners {
            if partner.initial_debt < Decimal::ZERO {
                return Err(AppError::ValidationError(format!(
                    "partner '{key}' has a negative initial debt"
                )));
            }
            if partner.share < Decimal::ZERO || partner.share > Decimal::ONE {
                return Err(AppError::ValidationError(format!(
                    "partner '{key}' has a share outside [0, 1]"
                )));
            }
        }
        let share_sum: Decimal = self.partners.values().map(|p| p.share).sum();
        let tolerance = Decimal::new(1, 2); // 0.01
        if (share_sum - Decimal::ONE).abs() > tolerance {
            return Err(AppError::ValidationError(format!(
                "partner shares sum to {share_sum}, expected 1.0 +/- {tolerance}"
            )));
        }
        Ok(())
    }
}
