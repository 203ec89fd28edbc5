//! Bookkeeping Service - Partner debt repayment and salary split tracking.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{AppState, Application};
