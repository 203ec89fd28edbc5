//! Ledger reconciler: owns the payment history and the derived totals.
//!
//! Appends update the running totals incrementally (an append only ever
//! applies to the current remaining-debt tail). Everything that can change
//! the remaining-debt trajectory upstream (editing or deleting a regular
//! payment, replacing the partner configuration) triggers a full replay of
//! the history. Edits and deletes of extra payments only rebuild the
//! extra-payment aggregates, since extra payments do not depend on each
//! other.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    EffectivePeriod, ExtraPayment, HistoryView, MonthlyBreakdown, PartnerConfig, PartnerStanding,
    Payment, PaymentEdit, RegularPayment, StateView, Totals,
};
use crate::services::allocation::allocate_payment;
use crate::services::metrics::{PAYMENTS_RECORDED, RECONCILIATIONS_TOTAL, RECONCILIATION_DURATION};
use crate::services::snapshot::SnapshotStore;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// The in-memory book: configuration, insertion-ordered history, totals.
///
/// This is also the persistence snapshot shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerBook {
    pub config: PartnerConfig,
    pub payments: Vec<Payment>,
    pub totals: Totals,
}

impl LedgerBook {
    /// Remaining debt under the current aggregates. Never negative.
    pub fn remaining_debt(&self) -> Decimal {
        (self.config.total_debt() - self.totals.debt_paid - self.totals.extra_payments)
            .max(Decimal::ZERO)
    }

    fn refresh_fully_paid(&mut self) {
        self.totals.debt_fully_paid =
            self.config.total_debt() > Decimal::ZERO && self.remaining_debt() <= Decimal::ZERO;
    }

    /// Record a regular payment. O(1): allocates against the current
    /// remaining debt and bumps the running totals.
    pub fn record_regular(
        &mut self,
        amount: Decimal,
        recorded_by: String,
        comment: Option<String>,
        period: Option<EffectivePeriod>,
    ) -> Result<RegularPayment, AppError> {
        self.config.validate()?;
        if amount <= Decimal::ZERO {
            return Err(AppError::ValidationError(
                "payment amount must be positive".to_string(),
            ));
        }
        if let Some(period) = &period {
            period.validate()?;
        }

        let allocation = allocate_payment(amount, self.remaining_debt(), &self.config);
        let payment = RegularPayment {
            id: Uuid::new_v4(),
            amount,
            recorded_at: Utc::now(),
            recorded_by,
            comment,
            period,
            edited_at: None,
            allocation,
        };

        self.totals.debt_paid += payment.allocation.to_debt_pool;
        self.totals.salary_paid += payment.allocation.to_salary_pool;
        self.refresh_fully_paid();
        self.payments.push(Payment::Regular(payment.clone()));
        Ok(payment)
    }

    /// Record an extra payment against one partner's debt bucket. O(1).
    pub fn record_extra(
        &mut self,
        partner_key: &str,
        amount: Decimal,
        recorded_by: String,
        comment: Option<String>,
    ) -> Result<ExtraPayment, AppError> {
        if !self.config.contains(partner_key) {
            return Err(AppError::ValidationError(format!(
                "unknown partner: {partner_key}"
            )));
        }
        if amount == Decimal::ZERO {
            return Err(AppError::ValidationError(
                "extra payment amount must be non-zero".to_string(),
            ));
        }

        let payment = ExtraPayment {
            id: Uuid::new_v4(),
            partner_key: partner_key.to_string(),
            amount,
            recorded_at: Utc::now(),
            recorded_by,
            comment,
            edited_at: None,
        };

        self.totals.extra_payments += amount;
        *self
            .totals
            .per_partner_extra
            .entry(partner_key.to_string())
            .or_default() += amount;
        self.refresh_fully_paid();
        self.payments.push(Payment::Extra(payment.clone()));
        Ok(payment)
    }

    /// Edit a payment in place. Type and partner are immutable.
    pub fn edit_payment(&mut self, id: Uuid, edit: PaymentEdit) -> Result<(), AppError> {
        let idx = self
            .payments
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| AppError::NotFound(anyhow!("payment {id} not found")))?;

        // Validate everything before touching the record.
        match &self.payments[idx] {
            Payment::Regular(_) => {
                if let Some(amount) = edit.amount {
                    if amount <= Decimal::ZERO {
                        return Err(AppError::ValidationError(
                            "payment amount must be positive".to_string(),
                        ));
                    }
                }
                if let Some(period) = &edit.period {
                    period.validate()?;
                }
            }
            Payment::Extra(_) => {
                if edit.period.is_some() {
                    return Err(AppError::ValidationError(
                        "extra payments have no effective period".to_string(),
                    ));
                }
                if let Some(amount) = edit.amount {
                    if amount == Decimal::ZERO {
                        return Err(AppError::ValidationError(
                            "extra payment amount must be non-zero".to_string(),
                        ));
                    }
                }
            }
        }

        let is_regular = match &mut self.payments[idx] {
            Payment::Regular(p) => {
                if let Some(amount) = edit.amount {
                    p.amount = amount;
                }
                if let Some(comment) = edit.comment {
                    p.comment = Some(comment);
                }
                if let Some(period) = edit.period {
                    p.period = Some(period);
                }
                p.edited_at = Some(Utc::now());
                true
            }
            Payment::Extra(p) => {
                if let Some(amount) = edit.amount {
                    p.amount = amount;
                }
                if let Some(comment) = edit.comment {
                    p.comment = Some(comment);
                }
                p.edited_at = Some(Utc::now());
                false
            }
        };

        if is_regular {
            // Changing an amount anywhere in history changes the
            // remaining-debt trajectory for every later regular payment.
            self.full_reconciliation();
        } else {
            self.recompute_extra_aggregates();
        }
        Ok(())
    }

    /// Remove a payment and rebuild whatever it contributed to.
    pub fn delete_payment(&mut self, id: Uuid) -> Result<Payment, AppError> {
        let idx = self
            .payments
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| AppError::NotFound(anyhow!("payment {id} not found")))?;
        let removed = self.payments.remove(idx);
        match removed {
            Payment::Regular(_) => self.full_reconciliation(),
            Payment::Extra(_) => self.recompute_extra_aggregates(),
        }
        Ok(removed)
    }

    /// Replace the partner configuration and replay the whole history
    /// under it.
    pub fn update_config(&mut self, config: PartnerConfig) -> Result<(), AppError> {
        config.validate()?;
        self.config = config;
        self.full_reconciliation();
        Ok(())
    }

    /// Drop all payments and derived totals, retaining the configuration.
    pub fn reset(&mut self) {
        self.payments.clear();
        self.totals = Totals::default();
        self.refresh_fully_paid();
    }

    /// Replay the full history in insertion order, rebuilding every derived
    /// value from scratch.
    ///
    /// Remaining debt for each regular payment comes from the running totals
    /// accumulated in this same pass, never from stale derived fields, so
    /// the result is a pure function of (ordered amounts, signed extra
    /// amounts, partner configuration).
    pub fn full_reconciliation(&mut self) {
        let timer = RECONCILIATION_DURATION.start_timer();

        let config = self.config.clone();
        let total_debt = config.total_debt();
        let mut totals = Totals::default();
        for payment in &mut self.payments {
            match payment {
                Payment::Regular(p) => {
                    let remaining = (total_debt - totals.debt_paid - totals.extra_payments)
                        .max(Decimal::ZERO);
                    let allocation = allocate_payment(p.amount, remaining, &config);
                    totals.debt_paid += allocation.to_debt_pool;
                    totals.salary_paid += allocation.to_salary_pool;
                    p.allocation = allocation;
                }
                Payment::Extra(p) => {
                    totals.extra_payments += p.amount;
                    *totals
                        .per_partner_extra
                        .entry(p.partner_key.clone())
                        .or_default() += p.amount;
                }
            }
        }
        self.totals = totals;
        self.refresh_fully_paid();

        RECONCILIATIONS_TOTAL.inc();
        timer.observe_duration();
    }

    /// Rebuild the extra-payment aggregates only; regular allocations and
    /// their totals are left untouched.
    fn recompute_extra_aggregates(&mut self) {
        self.totals.extra_payments = Decimal::ZERO;
        self.totals.per_partner_extra.clear();
        for payment in &self.payments {
            if let Payment::Extra(p) = payment {
                self.totals.extra_payments += p.amount;
                *self
                    .totals
                    .per_partner_extra
                    .entry(p.partner_key.clone())
                    .or_default() += p.amount;
            }
        }
        self.refresh_fully_paid();
    }

    /// Current derived state, including per-partner standings.
    pub fn state_view(&self) -> StateView {
        let total_debt = self.config.total_debt();
        let partners = self
            .config
            .iter()
            .map(|(key, partner)| {
                let pooled = if total_debt > Decimal::ZERO {
                    self.totals.debt_paid * (partner.initial_debt / total_debt)
                } else {
                    Decimal::ZERO
                };
                let extra = self
                    .totals
                    .per_partner_extra
                    .get(key)
                    .copied()
                    .unwrap_or_default();
                (key.clone(), PartnerStanding::new(partner, pooled + extra))
            })
            .collect();

        StateView {
            totals: self.totals.clone(),
            total_initial_debt: total_debt,
            remaining_debt: self.remaining_debt(),
            partners,
        }
    }

    /// Most recent payments first.
    pub fn history(&self, limit: usize) -> HistoryView {
        HistoryView {
            payments: self.payments.iter().rev().take(limit).cloned().collect(),
            totals: self.totals.clone(),
            as_of: Utc::now(),
        }
    }

    /// Payments attributed to one calendar month.
    ///
    /// A payment matches if its effective period overlaps the month,
    /// otherwise if its timestamp falls within it. Salary figures come from
    /// regular allocations only; extra amounts count (signed) towards the
    /// month's debt repayment.
    pub fn monthly_breakdown(&self, month: u32, year: i32) -> Result<MonthlyBreakdown, AppError> {
        let month_start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::ValidationError(format!("invalid month {month}/{year}")))?;
        let month_end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| AppError::ValidationError(format!("invalid month {month}/{year}")))?;

        let mut breakdown = MonthlyBreakdown {
            month,
            year,
            total_amount: Decimal::ZERO,
            debt_paid: Decimal::ZERO,
            total_salary: Decimal::ZERO,
            per_partner_salary: BTreeMap::new(),
            payments: Vec::new(),
        };

        for payment in &self.payments {
            let matches = match payment {
                Payment::Regular(p) => match &p.period {
                    Some(period) => period.overlaps(month_start, month_end),
                    None => {
                        let date = p.recorded_at.date_naive();
                        date >= month_start && date <= month_end
                    }
                },
                Payment::Extra(p) => {
                    let date = p.recorded_at.date_naive();
                    date >= month_start && date <= month_end
                }
            };
            if !matches {
                continue;
            }

            breakdown.total_amount += payment.amount();
            match payment {
                Payment::Regular(p) => {
                    breakdown.debt_paid += p.allocation.to_debt_pool;
                    breakdown.total_salary += p.allocation.to_salary_pool;
                    for (key, split) in &p.allocation.partners {
                        *breakdown.per_partner_salary.entry(key.clone()).or_default() +=
                            split.salary_portion;
                    }
                }
                Payment::Extra(p) => {
                    breakdown.debt_paid += p.amount;
                }
            }
            breakdown.payments.push(payment.clone());
        }

        Ok(breakdown)
    }
}

/// Shared handle to the ledger.
///
/// All mutations are serialized behind the write lock and staged on a clone
/// of the book; the snapshot is persisted before the staged copy is
/// committed, so a persistence failure leaves the committed state unchanged.
/// Queries share the read lock and never observe a half-applied mutation.
#[derive(Clone)]
pub struct Ledger {
    inner: Arc<RwLock<LedgerBook>>,
    store: SnapshotStore,
}

impl Ledger {
    pub fn new(book: LedgerBook, store: SnapshotStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(book)),
            store,
        }
    }

    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut LedgerBook) -> Result<T, AppError>,
    ) -> Result<(T, StateView), AppError> {
        let mut guard = self.inner.write().await;
        let mut staged = guard.clone();
        let out = apply(&mut staged)?;
        self.store.save(&staged).await?;
        let view = staged.state_view();
        *guard = staged;
        Ok((out, view))
    }

    #[instrument(skip(self, comment, period), fields(amount = %amount))]
    pub async fn record_regular(
        &self,
        amount: Decimal,
        recorded_by: String,
        comment: Option<String>,
        period: Option<EffectivePeriod>,
    ) -> Result<(RegularPayment, StateView), AppError> {
        let (payment, view) = self
            .mutate(|book| book.record_regular(amount, recorded_by, comment, period))
            .await?;
        PAYMENTS_RECORDED.with_label_values(&["regular"]).inc();
        info!(
            payment_id = %payment.id,
            to_debt_pool = %payment.allocation.to_debt_pool,
            to_salary_pool = %payment.allocation.to_salary_pool,
            debt_complete = payment.allocation.debt_complete,
            "Regular payment recorded"
        );
        Ok((payment, view))
    }

    #[instrument(skip(self, comment), fields(partner = partner_key, amount = %amount))]
    pub async fn record_extra(
        &self,
        partner_key: &str,
        amount: Decimal,
        recorded_by: String,
        comment: Option<String>,
    ) -> Result<(ExtraPayment, StateView), AppError> {
        let (payment, view) = self
            .mutate(|book| book.record_extra(partner_key, amount, recorded_by, comment))
            .await?;
        PAYMENTS_RECORDED.with_label_values(&["extra"]).inc();
        info!(payment_id = %payment.id, "Extra payment recorded");
        Ok((payment, view))
    }

    #[instrument(skip(self, edit), fields(payment_id = %id))]
    pub async fn edit_payment(&self, id: Uuid, edit: PaymentEdit) -> Result<StateView, AppError> {
        let ((), view) = self.mutate(|book| book.edit_payment(id, edit)).await?;
        info!(payment_id = %id, "Payment edited");
        Ok(view)
    }

    #[instrument(skip(self), fields(payment_id = %id))]
    pub async fn delete_payment(&self, id: Uuid) -> Result<StateView, AppError> {
        let (removed, view) = self.mutate(|book| book.delete_payment(id)).await?;
        info!(payment_id = %id, kind = removed.kind(), "Payment deleted");
        Ok(view)
    }

    #[instrument(skip(self, config))]
    pub async fn update_config(
        &self,
        config: PartnerConfig,
    ) -> Result<(PartnerConfig, StateView), AppError> {
        let ((), view) = self
            .mutate(|book| book.update_config(config.clone()))
            .await?;
        info!(partners = config.partners.len(), "Partner configuration replaced");
        Ok((config, view))
    }

    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<StateView, AppError> {
        let ((), view) = self
            .mutate(|book| {
                book.reset();
                Ok(())
            })
            .await?;
        info!("Ledger reset; configuration retained");
        Ok(view)
    }

    pub async fn state(&self) -> StateView {
        self.inner.read().await.state_view()
    }

    pub async fn history(&self, limit: Option<usize>) -> HistoryView {
        self.inner
            .read()
            .await
            .history(limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
    }

    pub async fn monthly_breakdown(
        &self,
        month: u32,
        year: i32,
    ) -> Result<MonthlyBreakdown, AppError> {
        self.inner.read().await.monthly_breakdown(month, year)
    }

    pub async fn config(&self) -> PartnerConfig {
        self.inner.read().await.config.clone()
    }
}
