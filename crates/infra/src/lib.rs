//! Infrastructure layer: configuration, persistence, the installment
//! calculator client and the application services built on top of them.

pub mod calculator;
pub mod config;
pub mod customer_store;
pub mod services;
