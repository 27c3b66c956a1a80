use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use loanapi_core::{AddressId, AggregateRoot, CustomerId, InstallmentId, LoanId, PhoneId, ScoreId};
use loanapi_lending::{Address, Customer, Loan};

use super::{CustomerStore, StoreError};

#[derive(Debug, Default)]
struct State {
    customers: BTreeMap<CustomerId, Customer>,
    addresses: BTreeMap<AddressId, Address>,
    last_id: i64,
}

impl State {
    /// One sequence shared by every table keeps ids unique across entity kinds,
    /// which is all the callers rely on.
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn check_unique(&self, customer: &Customer) -> Result<(), StoreError> {
        let own_id = customer.customer_id();
        for other in self.customers.values() {
            if other.customer_id() == own_id {
                continue;
            }
            let (a, b) = (&other.details, &customer.details);
            if a.rg == b.rg {
                return Err(StoreError::Conflict(format!("rg '{}' already registered", b.rg)));
            }
            if a.cpf == b.cpf {
                return Err(StoreError::Conflict(format!("cpf '{}' already registered", b.cpf)));
            }
            if a.email == b.email {
                return Err(StoreError::Conflict(format!(
                    "email '{}' already registered",
                    b.email
                )));
            }
        }
        Ok(())
    }

    /// Re-read the shared address so every customer sees its latest version.
    fn hydrate(&self, customer: &Customer) -> Customer {
        let mut out = customer.clone();
        if let Some(id) = customer.address.as_ref().and_then(|a| a.id) {
            out.address = self.addresses.get(&id).cloned();
        }
        out
    }
}

/// In-memory customer store for tests/dev.
///
/// Writes are serialized by a single lock, so a save is atomic with respect
/// to every other operation.
#[derive(Debug, Default)]
pub struct InMemoryCustomerStore {
    inner: RwLock<State>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Database("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Database("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn find_customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let state = self.read()?;
        Ok(state.customers.get(&id).map(|c| state.hydrate(c)))
    }

    async fn find_all_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let state = self.read()?;
        Ok(state.customers.values().map(|c| state.hydrate(c)).collect())
    }

    async fn save(&self, mut customer: Customer) -> Result<Customer, StoreError> {
        let mut state = self.write()?;

        if let Some(id) = customer.customer_id() {
            let Some(stored) = state.customers.get(&id) else {
                return Err(StoreError::NotFound(format!("{} {id}", Customer::AGGREGATE_TYPE)));
            };
            customer.rebase_loans(stored.loans());
        }
        state.check_unique(&customer)?;

        // Everything below only touches the local copy until the final insert,
        // except the address table, which is validated first.
        if let Some(address) = customer.address.as_mut() {
            match address.id {
                Some(id) if !state.addresses.contains_key(&id) => {
                    return Err(StoreError::NotFound(format!("address {id}")));
                }
                Some(_) => {}
                None => address.id = Some(AddressId::new(state.next_id())),
            }
        }

        if customer.customer_id().is_none() {
            let id = CustomerId::new(state.next_id());
            customer.assign_id(id);
        }
        if let Some(score) = customer.score.as_mut() {
            if score.id.is_none() {
                score.id = Some(ScoreId::new(state.next_id()));
            }
        }
        for phone in &mut customer.phones {
            if phone.id.is_none() {
                phone.id = Some(PhoneId::new(state.next_id()));
            }
        }
        for loan in customer.loans_mut() {
            if loan.id.is_none() {
                loan.id = Some(LoanId::new(state.next_id()));
            }
            for installment in &mut loan.installments {
                if installment.id.is_none() {
                    installment.id = Some(InstallmentId::new(state.next_id()));
                }
            }
        }

        if let Some(address) = &customer.address {
            if let Some(id) = address.id {
                state.addresses.insert(id, address.clone());
            }
        }

        let id = customer
            .customer_id()
            .ok_or_else(|| StoreError::Database("customer id was not assigned".to_string()))?;
        state.customers.insert(id, customer.clone());
        Ok(customer)
    }

    async fn delete_customer_by_id(&self, id: CustomerId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        match state.customers.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(format!("{} {id}", Customer::AGGREGATE_TYPE))),
        }
    }

    async fn find_loan_by_id(&self, id: LoanId) -> Result<Option<Loan>, StoreError> {
        let state = self.read()?;
        Ok(state
            .customers
            .values()
            .flat_map(|c| c.loans())
            .find(|l| l.id == Some(id))
            .cloned())
    }

    async fn delete_loan_by_id(&self, id: LoanId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.customers.values_mut().any(|c| c.remove_loan(id)) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("loan {id}")))
        }
    }

    async fn find_all_loans(&self) -> Result<Vec<Loan>, StoreError> {
        let state = self.read()?;
        let mut loans: Vec<Loan> = state
            .customers
            .values()
            .flat_map(|c| c.loans().iter().cloned())
            .collect();
        loans.sort_by_key(|l| l.id);
        Ok(loans)
    }

    async fn find_address_by_id(&self, id: AddressId) -> Result<Option<Address>, StoreError> {
        Ok(self.read()?.addresses.get(&id).cloned())
    }

    async fn find_all_addresses(&self) -> Result<Vec<Address>, StoreError> {
        Ok(self.read()?.addresses.values().cloned().collect())
    }

    async fn save_address(&self, mut address: Address) -> Result<Address, StoreError> {
        let mut state = self.write()?;
        let id = match address.id {
            Some(id) if !state.addresses.contains_key(&id) => {
                return Err(StoreError::NotFound(format!("address {id}")));
            }
            Some(id) => id,
            None => AddressId::new(state.next_id()),
        };
        address.id = Some(id);
        state.addresses.insert(id, address.clone());
        Ok(address)
    }

    async fn delete_address_by_id(&self, id: AddressId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.addresses.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("address {id}")));
        }
        for customer in state.customers.values_mut() {
            if customer.address.as_ref().is_some_and(|a| a.id == Some(id)) {
                customer.address = None;
            }
        }
        Ok(())
    }

    async fn find_customers_by_address(&self, id: AddressId) -> Result<Vec<Customer>, StoreError> {
        let state = self.read()?;
        Ok(state
            .customers
            .values()
            .filter(|c| c.address.as_ref().is_some_and(|a| a.id == Some(id)))
            .map(|c| state.hydrate(c))
            .collect())
    }
}
