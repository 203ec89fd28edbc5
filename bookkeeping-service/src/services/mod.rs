//! Service layer: allocation calculator, ledger reconciler, persistence,
//! metrics.

pub mod allocation;
pub mod ledger;
pub mod metrics;
pub mod snapshot;

pub use allocation::allocate_payment;
pub use ledger::{Ledger, LedgerBook, DEFAULT_HISTORY_LIMIT};
pub use metrics::{get_metrics, init_metrics};
pub use snapshot::SnapshotStore;
