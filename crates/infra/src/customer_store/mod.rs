//! Customer aggregate persistence.
//!
//! The customer is the consistency unit: saving a customer writes its
//! address link, score, phones, loans and installments together. Loans and
//! addresses also have direct, identity-based operations that bypass the
//! aggregate.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryCustomerStore;
pub use postgres::PostgresCustomerStore;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use loanapi_core::{AddressId, CustomerId, LoanId};
use loanapi_lending::{Address, Customer, Loan};

/// Store operation error.
///
/// Absence of an entity on lookup is not an error (`Ok(None)`); `NotFound`
/// is only returned when a write targets a row that does not exist.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint (rg, cpf, email) was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;

    async fn find_all_customers(&self) -> Result<Vec<Customer>, StoreError>;

    /// Upsert the whole aggregate in one transaction and return it with
    /// every identity assigned.
    ///
    /// Loans that already have an identity are never rewritten: the stored
    /// loans stay as they are and only the caller's new loans are added.
    async fn save(&self, customer: Customer) -> Result<Customer, StoreError>;

    /// Delete a customer together with its score, phones and loans.
    async fn delete_customer_by_id(&self, id: CustomerId) -> Result<(), StoreError>;

    async fn find_loan_by_id(&self, id: LoanId) -> Result<Option<Loan>, StoreError>;

    async fn delete_loan_by_id(&self, id: LoanId) -> Result<(), StoreError>;

    /// All loans in ascending identity order.
    async fn find_all_loans(&self) -> Result<Vec<Loan>, StoreError>;

    async fn find_address_by_id(&self, id: AddressId) -> Result<Option<Address>, StoreError>;

    /// All addresses in ascending identity order.
    async fn find_all_addresses(&self) -> Result<Vec<Address>, StoreError>;

    /// Insert a new address, or overwrite the stored one with the same id.
    async fn save_address(&self, address: Address) -> Result<Address, StoreError>;

    /// Delete an address. Customers living there keep existing without one.
    async fn delete_address_by_id(&self, id: AddressId) -> Result<(), StoreError>;

    /// Customers referencing the address, in ascending identity order.
    async fn find_customers_by_address(&self, id: AddressId) -> Result<Vec<Customer>, StoreError>;
}

#[async_trait]
impl<S> CustomerStore for Arc<S>
where
    S: CustomerStore + ?Sized,
{
    async fn find_customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        (**self).find_customer_by_id(id).await
    }

    async fn find_all_customers(&self) -> Result<Vec<Customer>, StoreError> {
        (**self).find_all_customers().await
    }

    async fn save(&self, customer: Customer) -> Result<Customer, StoreError> {
        (**self).save(customer).await
    }

    async fn delete_customer_by_id(&self, id: CustomerId) -> Result<(), StoreError> {
        (**self).delete_customer_by_id(id).await
    }

    async fn find_loan_by_id(&self, id: LoanId) -> Result<Option<Loan>, StoreError> {
        (**self).find_loan_by_id(id).await
    }

    async fn delete_loan_by_id(&self, id: LoanId) -> Result<(), StoreError> {
        (**self).delete_loan_by_id(id).await
    }

    async fn find_all_loans(&self) -> Result<Vec<Loan>, StoreError> {
        (**self).find_all_loans().await
    }

    async fn find_address_by_id(&self, id: AddressId) -> Result<Option<Address>, StoreError> {
        (**self).find_address_by_id(id).await
    }

    async fn find_all_addresses(&self) -> Result<Vec<Address>, StoreError> {
        (**self).find_all_addresses().await
    }

    async fn save_address(&self, address: Address) -> Result<Address, StoreError> {
        (**self).save_address(address).await
    }

    async fn delete_address_by_id(&self, id: AddressId) -> Result<(), StoreError> {
        (**self).delete_address_by_id(id).await
    }

    async fn find_customers_by_address(&self, id: AddressId) -> Result<Vec<Customer>, StoreError> {
        (**self).find_customers_by_address(id).await
    }
}
