use tracing::{info, instrument, warn};

use loanapi_core::{CustomerId, LoanId};
use loanapi_lending::{Loan, LoanRequest, check_loan_request};

use super::{CUSTOMER_NOT_FOUND, LOAN_NOT_FOUND, NO_LOANS, ServiceError};
use crate::calculator::InstallmentCalculator;
use crate::customer_store::{CustomerStore, StoreError};

/// Loan orchestration.
///
/// `create` walks `Received → Validated → CustomerResolved →
/// InstallmentsComputed → Persisted`; any step can end in `Rejected`, and a
/// rejection never leaves a partial write behind because the only write is
/// the final aggregate save.
///
/// ## Generic Parameters
///
/// - `S`: customer aggregate store
/// - `C`: installment calculator client
#[derive(Debug, Clone)]
pub struct LoanService<S, C> {
    store: S,
    calculator: C,
}

impl<S, C> LoanService<S, C>
where
    S: CustomerStore,
    C: InstallmentCalculator,
{
    pub fn new(store: S, calculator: C) -> Self {
        Self { store, calculator }
    }

    /// Open a loan for a customer and return it with its assigned identity.
    ///
    /// An invalid request and an unknown customer are reported identically.
    #[instrument(skip(self, request), fields(customer_id = %customer_id))]
    pub async fn create(
        &self,
        customer_id: CustomerId,
        request: LoanRequest,
    ) -> Result<Loan, ServiceError> {
        let terms = check_loan_request(&request);
        let customer = self.store.find_customer_by_id(customer_id).await?;

        let (terms, mut customer) = match (terms, customer) {
            (Ok(terms), Some(customer)) => (terms, customer),
            (Err(reason), _) => {
                warn!(%reason, "loan request rejected");
                return Err(ServiceError::invalid(CUSTOMER_NOT_FOUND));
            }
            (Ok(_), None) => {
                warn!("loan requested for unknown customer");
                return Err(ServiceError::invalid(CUSTOMER_NOT_FOUND));
            }
        };

        let response = self.calculator.calculate(&terms).await.map_err(|err| {
            warn!(error = %err, "installment calculation failed");
            ServiceError::unavailable()
        })?;
        if !response.is_success() {
            warn!(status = response.status, "installment service refused the loan terms");
            return Err(ServiceError::unavailable());
        }

        let loan = Loan::open(terms, response.installments).map_err(|err| {
            warn!(error = %err, "installment service returned no schedule");
            ServiceError::unavailable()
        })?;
        customer
            .add_loan(loan)
            .map_err(|err| ServiceError::invalid(err.to_string()))?;

        let saved = self.store.save(customer).await?;
        let loan = saved.loans().last().cloned().ok_or_else(|| {
            ServiceError::Store(StoreError::Database(
                "saved customer is missing the new loan".to_string(),
            ))
        })?;

        info!(
            loan_id = ?loan.id,
            customer = %saved.full_name(),
            installments = loan.installments.len(),
            "loan created"
        );
        Ok(loan)
    }

    /// Every loan, in ascending identity order.
    pub async fn find_all(&self) -> Result<Vec<Loan>, ServiceError> {
        let loans = self.store.find_all_loans().await?;
        if loans.is_empty() {
            return Err(ServiceError::not_found(NO_LOANS));
        }
        Ok(loans)
    }

    pub async fn find_by_id(&self, id: LoanId) -> Result<Loan, ServiceError> {
        self.store
            .find_loan_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(LOAN_NOT_FOUND))
    }

    #[instrument(skip(self), fields(loan_id = %id))]
    pub async fn delete(&self, id: LoanId) -> Result<bool, ServiceError> {
        if self.store.find_loan_by_id(id).await?.is_none() {
            return Err(ServiceError::not_found(LOAN_NOT_FOUND));
        }
        match self.store.delete_loan_by_id(id).await {
            Ok(()) => {
                info!("loan deleted");
                Ok(true)
            }
            // Lost a race with another delete.
            Err(StoreError::NotFound(_)) => Err(ServiceError::not_found(LOAN_NOT_FOUND)),
            Err(err) => Err(err.into()),
        }
    }
}
