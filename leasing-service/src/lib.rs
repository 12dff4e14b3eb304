//! Leasing service: derived-value recalculation for property-leasing
//! contracts and invoices.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
