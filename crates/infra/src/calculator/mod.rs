//! Installment calculator client.
//!
//! The schedule of a loan is computed by an external service. Callers only
//! see [`InstallmentCalculator`], so tests swap in doubles.

mod http;

pub use http::HttpInstallmentCalculator;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use loanapi_lending::{Installment, LoanTerms};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalculatorError {
    /// Connection refused, timeout, or any failure before a status arrived.
    #[error("installment service unreachable: {0}")]
    Transport(String),

    /// A success status came back with a body that is not an installment list.
    #[error("installment service returned an unreadable body: {0}")]
    Decode(String),
}

/// Outcome of a calculator call that reached the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorResponse {
    pub status: u16,
    /// Empty unless the status is a success.
    pub installments: Vec<Installment>,
}

impl CalculatorResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait InstallmentCalculator: Send + Sync {
    async fn calculate(&self, terms: &LoanTerms) -> Result<CalculatorResponse, CalculatorError>;
}

#[async_trait]
impl<C> InstallmentCalculator for Arc<C>
where
    C: InstallmentCalculator + ?Sized,
{
    async fn calculate(&self, terms: &LoanTerms) -> Result<CalculatorResponse, CalculatorError> {
        (**self).calculate(terms).await
    }
}
