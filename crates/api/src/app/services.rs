//! Infrastructure wiring for the HTTP layer.
//!
//! The store is chosen by configuration: Postgres when a database is
//! configured, otherwise the in-memory store (dev/test). The calculator is
//! always the HTTP client pointed at the configured URL.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use loanapi_infra::calculator::{CalculatorError, HttpInstallmentCalculator, InstallmentCalculator};
use loanapi_infra::config::AppConfig;
use loanapi_infra::customer_store::{
    CustomerStore, InMemoryCustomerStore, PostgresCustomerStore, StoreError,
};
use loanapi_infra::services::{AddressService, CustomerService, LoanService};

pub type DynStore = Arc<dyn CustomerStore>;
pub type DynCalculator = Arc<dyn InstallmentCalculator>;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("customer store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("installment calculator client could not be built: {0}")]
    Calculator(#[from] CalculatorError),
}

/// Services shared by every handler.
pub struct AppServices {
    pub loans: LoanService<DynStore, DynCalculator>,
    pub customers: CustomerService<DynStore>,
    pub addresses: AddressService<DynStore>,
}

impl AppServices {
    pub fn new(store: DynStore, calculator: DynCalculator) -> Self {
        Self {
            loans: LoanService::new(store.clone(), calculator),
            customers: CustomerService::new(store.clone()),
            addresses: AddressService::new(store),
        }
    }
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    let store: DynStore = match &config.database {
        Some(db) => {
            let store = PostgresCustomerStore::connect(db).await?;
            store.migrate().await?;
            info!(max_connections = db.max_connections, "using postgres customer store");
            Arc::new(store)
        }
        None => {
            info!("using in-memory customer store");
            Arc::new(InMemoryCustomerStore::new())
        }
    };

    let calculator = HttpInstallmentCalculator::new(&config.calculator)?;
    info!(
        url = calculator.url(),
        timeout_secs = config.calculator.timeout.as_secs(),
        retry_attempts = config.calculator.retry_attempts,
        "installment calculator configured"
    );

    Ok(AppServices::new(store, Arc::new(calculator)))
}
