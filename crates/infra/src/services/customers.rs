use chrono::{NaiveDate, Utc};
use tracing::{info, instrument, warn};

use loanapi_core::{CustomerId, DomainError};
use loanapi_lending::{Customer, CustomerRequest};

use super::{CUSTOMER_NOT_FOUND, CUSTOMER_VALIDATION_FAILED, NO_CUSTOMERS, ServiceError};
use crate::customer_store::{CustomerStore, StoreError};

/// Customer CRUD on top of a [`CustomerStore`].
#[derive(Debug, Clone)]
pub struct CustomerService<S> {
    store: S,
    today: fn() -> NaiveDate,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

impl<S> CustomerService<S>
where
    S: CustomerStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            today: utc_today,
        }
    }

    /// Replace the clock used for default sign-up dates.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: CustomerRequest) -> Result<Customer, ServiceError> {
        let customer = Customer::register(request, (self.today)()).map_err(rejected)?;
        let saved = self.store.save(customer).await.map_err(conflict_is_invalid)?;
        info!(customer_id = ?saved.customer_id(), "customer created");
        Ok(saved)
    }

    pub async fn find_all(&self) -> Result<Vec<Customer>, ServiceError> {
        let customers = self.store.find_all_customers().await?;
        if customers.is_empty() {
            return Err(ServiceError::not_found(NO_CUSTOMERS));
        }
        Ok(customers)
    }

    pub async fn find_by_id(&self, id: CustomerId) -> Result<Customer, ServiceError> {
        self.store
            .find_customer_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(CUSTOMER_NOT_FOUND))
    }

    /// Replace personal data, address, score and phones; loans stay attached.
    #[instrument(skip(self, request), fields(customer_id = %id))]
    pub async fn update(
        &self,
        id: CustomerId,
        request: CustomerRequest,
    ) -> Result<Customer, ServiceError> {
        let mut customer = self.find_by_id(id).await?;
        customer
            .apply_update(request, (self.today)())
            .map_err(rejected)?;

        let saved = self.store.save(customer).await.map_err(conflict_is_invalid)?;
        info!("customer updated");
        Ok(saved)
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn delete(&self, id: CustomerId) -> Result<bool, ServiceError> {
        match self.store.delete_customer_by_id(id).await {
            Ok(()) => {
                info!("customer deleted");
                Ok(true)
            }
            Err(StoreError::NotFound(_)) => Err(ServiceError::not_found(CUSTOMER_NOT_FOUND)),
            Err(err) => Err(err.into()),
        }
    }
}

fn rejected(err: DomainError) -> ServiceError {
    warn!(reason = %err, "customer request rejected");
    ServiceError::invalid(CUSTOMER_VALIDATION_FAILED)
}

fn conflict_is_invalid(err: StoreError) -> ServiceError {
    match err {
        StoreError::Conflict(msg) => {
            warn!(%msg, "customer uniqueness conflict");
            ServiceError::InvalidRequest(msg)
        }
        // An address reference that does not resolve is a bad request too.
        StoreError::NotFound(msg) => ServiceError::InvalidRequest(msg),
        other => ServiceError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer_store::InMemoryCustomerStore;
    use loanapi_core::AddressId;
    use loanapi_lending::{AddressRequest, PhoneRequest, PhoneType, ScoreRequest, State};
    use std::sync::Arc;

    fn fixed_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 6, 30).unwrap()
    }

    fn service() -> CustomerService<Arc<InMemoryCustomerStore>> {
        CustomerService::new(Arc::new(InMemoryCustomerStore::new())).with_clock(fixed_day)
    }

    fn request(tag: &str) -> CustomerRequest {
        CustomerRequest {
            name: Some("João".to_string()),
            last_name: Some("da Silva".to_string()),
            birth_date: Some("2011-11-11".to_string()),
            rg: Some(format!("rg-{tag}")),
            cpf: Some(format!("cpf-{tag}")),
            email: Some(format!("joao.{tag}@email.com")),
            address: Some(AddressRequest {
                id: None,
                street: "Rua 9".to_string(),
                neighborhood: "Lauzane Paulista".to_string(),
                number: 583,
                postal_code: "02442-090".to_string(),
                city: "São Paulo".to_string(),
                state: State::SaoPaulo,
            }),
            score: Some(ScoreRequest { points: 50.0 }),
            phones: vec![PhoneRequest {
                prefix: 11,
                number: Some("97981-5415".to_string()),
                phone_type: PhoneType::Mobile,
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_identity_and_sign_up_date() {
        let service = service();

        let customer = service.create(request("a")).await.unwrap();

        assert!(customer.customer_id().is_some());
        assert_eq!(customer.details.sign_up_date, "2022-06-30");
        assert!(customer.phones[0].id.is_some());
        assert_eq!(service.find_by_id(customer.customer_id().unwrap()).await, Ok(customer));
    }

    #[tokio::test]
    async fn create_rejects_invalid_request() {
        let mut req = request("a");
        req.cpf = None;

        let err = service().create(req).await.unwrap_err();

        assert_eq!(
            err,
            ServiceError::InvalidRequest(CUSTOMER_VALIDATION_FAILED.to_string())
        );
    }

    #[tokio::test]
    async fn create_reports_uniqueness_conflict_as_invalid_request() {
        let service = service();
        service.create(request("a")).await.unwrap();

        let mut dup = request("b");
        dup.email = Some("JOAO.A@email.com".to_string());
        let err = service.create(dup).await.unwrap_err();

        match err {
            ServiceError::InvalidRequest(msg) => assert!(msg.contains("email"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn find_all_on_empty_store_is_not_found() {
        assert_eq!(
            service().find_all().await,
            Err(ServiceError::NotFound(
                "There is no consumers saved in the database".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let service = service();
        let missing = CustomerId::new(404);

        let expected = Err(ServiceError::NotFound(CUSTOMER_NOT_FOUND.to_string()));
        assert_eq!(service.find_by_id(missing).await, expected);
        assert_eq!(service.update(missing, request("a")).await, expected);
        assert_eq!(
            service.delete(missing).await,
            Err(ServiceError::NotFound(CUSTOMER_NOT_FOUND.to_string()))
        );
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_identity() {
        let service = service();
        let created = service.create(request("a")).await.unwrap();
        let id = created.customer_id().unwrap();

        let mut req = request("a");
        req.name = Some("Maria".to_string());
        req.phones.clear();
        let updated = service.update(id, req).await.unwrap();

        assert_eq!(updated.customer_id(), Some(id));
        assert_eq!(updated.details.name, "Maria");
        assert!(updated.phones.is_empty());
        assert_eq!(
            updated.score.as_ref().and_then(|s| s.id),
            created.score.as_ref().and_then(|s| s.id)
        );
    }

    #[tokio::test]
    async fn update_rejects_invalid_request() {
        let service = service();
        let id = service.create(request("a")).await.unwrap().customer_id().unwrap();

        let mut req = request("a");
        req.email = Some("nope".to_string());

        assert_eq!(
            service.update(id, req).await,
            Err(ServiceError::InvalidRequest(CUSTOMER_VALIDATION_FAILED.to_string()))
        );
    }

    #[tokio::test]
    async fn unknown_address_reference_is_invalid() {
        let mut req = request("a");
        if let Some(address) = req.address.as_mut() {
            address.id = Some(AddressId::new(999));
        }

        let err = service().create(req).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn delete_removes_customer() {
        let service = service();
        let id = service.create(request("a")).await.unwrap().customer_id().unwrap();

        assert_eq!(service.delete(id).await, Ok(true));
        assert!(matches!(
            service.find_by_id(id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
