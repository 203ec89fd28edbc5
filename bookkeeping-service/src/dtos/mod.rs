use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{EffectivePeriod, PartnerConfig, Payment, PaymentEdit, StateView};

#[derive(Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub recorded_by: Option<String>,
    pub comment: Option<String>,
    pub period: Option<EffectivePeriod>,
}

#[derive(Deserialize)]
pub struct RecordExtraPaymentRequest {
    pub partner: String,
    /// Signed: positive repays debt out of band, negative incurs new debt.
    pub amount: Decimal,
    pub recorded_by: Option<String>,
    pub comment: Option<String>,
}

#[derive(Deserialize)]
pub struct EditPaymentRequest {
    pub amount: Option<Decimal>,
    pub comment: Option<String>,
    pub period: Option<EffectivePeriod>,
}

impl From<EditPaymentRequest> for PaymentEdit {
    fn from(req: EditPaymentRequest) -> Self {
        PaymentEdit {
            amount: req.amount,
            comment: req.comment,
            period: req.period,
        }
    }
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct BreakdownParams {
    pub month: u32,
    pub year: i32,
}

#[derive(Serialize)]
pub struct PaymentCreatedResponse {
    pub payment: Payment,
    pub state: StateView,
}

#[derive(Serialize)]
pub struct StateChangedResponse {
    pub state: StateView,
}

#[derive(Serialize)]
pub struct ConfigUpdatedResponse {
    pub config: PartnerConfig,
    pub state: StateView,
}
