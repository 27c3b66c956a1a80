//! Application services (request orchestration).
//!
//! Services sit between the HTTP layer and the infrastructure traits. They
//! take raw requests, run the validation gate, talk to the store and the
//! installment calculator, and report failures as [`ServiceError`].
//!
//! ```text
//! request
//!   ↓
//! 1. Validate (pure, lending crate)
//!   ↓
//! 2. Resolve the customer aggregate or the address (CustomerStore)
//!   ↓
//! 3. Compute installments (InstallmentCalculator, loans only)
//!   ↓
//! 4. Mutate the aggregate and save it in one call (cascade)
//! ```
//!
//! Every error is terminal for the request; services never retry.

mod addresses;
mod customers;
mod loans;

pub use addresses::AddressService;
pub use customers::CustomerService;
pub use loans::LoanService;

use thiserror::Error;

use crate::customer_store::StoreError;

pub const CUSTOMER_NOT_FOUND: &str = "Customer not found";
pub const CUSTOMER_VALIDATION_FAILED: &str = "Customer validation failed";
pub const NO_CUSTOMERS: &str = "There is no consumers saved in the database";
pub const ADDRESS_NOT_FOUND: &str = "Address not found";
pub const ADDRESS_VALIDATION_FAILED: &str = "Address validation failed";
pub const NO_ADDRESSES: &str = "There is no addresses saved in the database";
pub const LOAN_NOT_FOUND: &str = "Loan not found";
pub const NO_LOANS: &str = "There is no loans saved in the database";
pub const CALCULATOR_UNAVAILABLE: &str = "Installment Microservice connection failed";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The request was rejected (maps to 400).
    #[error("{0}")]
    InvalidRequest(String),

    /// The addressed entity does not exist (maps to 404).
    #[error("{0}")]
    NotFound(String),

    /// The installment calculator could not produce a schedule.
    #[error("{0}")]
    DependencyUnavailable(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        ServiceError::Store(value)
    }
}

impl ServiceError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ServiceError::InvalidRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ServiceError::NotFound(msg.into())
    }

    pub fn unavailable() -> Self {
        ServiceError::DependencyUnavailable(CALCULATOR_UNAVAILABLE.to_string())
    }
}
