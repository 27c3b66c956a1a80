use tracing::{info, instrument, warn};

use loanapi_core::{AddressId, DomainError};
use loanapi_lending::{Address, AddressRequest, Customer};

use super::{ADDRESS_NOT_FOUND, ADDRESS_VALIDATION_FAILED, NO_ADDRESSES, ServiceError};
use crate::customer_store::{CustomerStore, StoreError};

/// Address CRUD on top of a [`CustomerStore`].
///
/// Addresses are shared: every customer referencing one sees its updates, and
/// deleting one leaves its residents without an address.
#[derive(Debug, Clone)]
pub struct AddressService<S> {
    store: S,
}

impl<S> AddressService<S>
where
    S: CustomerStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Store a new address. An id in the request is ignored.
    #[instrument(skip(self, request))]
    pub async fn create(&self, request: AddressRequest) -> Result<Address, ServiceError> {
        let address = Address::from_request(AddressRequest { id: None, ..request })
            .map_err(rejected)?;
        let saved = self.store.save_address(address).await?;
        info!(address_id = ?saved.id, "address created");
        Ok(saved)
    }

    pub async fn find_all(&self) -> Result<Vec<Address>, ServiceError> {
        let addresses = self.store.find_all_addresses().await?;
        if addresses.is_empty() {
            return Err(ServiceError::not_found(NO_ADDRESSES));
        }
        Ok(addresses)
    }

    pub async fn find_by_id(&self, id: AddressId) -> Result<Address, ServiceError> {
        self.store
            .find_address_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(ADDRESS_NOT_FOUND))
    }

    /// Customers living at a stored address.
    pub async fn residents(&self, id: AddressId) -> Result<Vec<Customer>, ServiceError> {
        self.find_by_id(id).await?;
        Ok(self.store.find_customers_by_address(id).await?)
    }

    #[instrument(skip(self, request), fields(address_id = %id))]
    pub async fn update(
        &self,
        id: AddressId,
        request: AddressRequest,
    ) -> Result<Address, ServiceError> {
        self.find_by_id(id).await?;
        let address = Address::from_request(AddressRequest {
            id: Some(id),
            ..request
        })
        .map_err(rejected)?;

        let saved = self.store.save_address(address).await.map_err(gone)?;
        info!("address updated");
        Ok(saved)
    }

    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn delete(&self, id: AddressId) -> Result<bool, ServiceError> {
        self.store.delete_address_by_id(id).await.map_err(gone)?;
        info!("address deleted");
        Ok(true)
    }
}

fn rejected(err: DomainError) -> ServiceError {
    warn!(reason = %err, "address request rejected");
    ServiceError::invalid(ADDRESS_VALIDATION_FAILED)
}

fn gone(err: StoreError) -> ServiceError {
    match err {
        StoreError::NotFound(_) => ServiceError::not_found(ADDRESS_NOT_FOUND),
        other => ServiceError::Store(other),
    }
}
