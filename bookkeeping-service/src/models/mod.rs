//! Data models for the bookkeeping service.

pub mod partner;
pub mod payment;
pub mod state;

pub use partner::{Partner, PartnerConfig};
pub use payment::{
    EffectivePeriod, ExtraPayment, PartnerSplit, Payment, PaymentAllocation, PaymentEdit,
    RegularPayment,
};
pub use state::{HistoryView, MonthlyBreakdown, PartnerStanding, StateView, Totals};
