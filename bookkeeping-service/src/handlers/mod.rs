//! HTTP handlers for the bookkeeping API.

pub mod admin;
pub mod payments;
pub mod state;
