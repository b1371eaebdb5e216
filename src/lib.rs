//! FinBridge gateway library
//!
//! Security and compliance pipeline in front of the invoice-financing
//! platform's bank-integration APIs. Every inbound request passes through
//! the ordered guard chain built in [`pipeline`] before any business
//! handler runs.

pub mod app_state;
pub mod audit;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod routes;
