use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use loanapi_lending::{Installment, LoanTerms};

use super::{CalculatorError, CalculatorResponse, InstallmentCalculator};
use crate::config::CalculatorConfig;

/// Calls the installment microservice over HTTP.
///
/// The loan terms are POSTed as JSON; a success status must carry a JSON
/// array of installments. Only transport failures are retried, and at most
/// `retry_attempts` times. A non-success status is returned as-is.
#[derive(Debug, Clone)]
pub struct HttpInstallmentCalculator {
    client: Client,
    url: String,
    retry_attempts: u32,
}

impl HttpInstallmentCalculator {
    pub fn new(config: &CalculatorConfig) -> Result<Self, CalculatorError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CalculatorError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            retry_attempts: config.retry_attempts,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call_once(&self, terms: &LoanTerms) -> Result<CalculatorResponse, CalculatorError> {
        let response = self
            .client
            .post(&self.url)
            .json(terms)
            .send()
            .await
            .map_err(|e| CalculatorError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Ok(CalculatorResponse {
                status: status.as_u16(),
                installments: vec![],
            });
        }

        let installments = response
            .json::<Vec<Installment>>()
            .await
            .map_err(|e| CalculatorError::Decode(e.to_string()))?;

        Ok(CalculatorResponse {
            status: status.as_u16(),
            installments,
        })
    }
}

#[async_trait]
impl InstallmentCalculator for HttpInstallmentCalculator {
    #[instrument(skip(self, terms), fields(url = %self.url))]
    async fn calculate(&self, terms: &LoanTerms) -> Result<CalculatorResponse, CalculatorError> {
        let mut attempt = 0;
        loop {
            match self.call_once(terms).await {
                Err(CalculatorError::Transport(reason)) if attempt < self.retry_attempts => {
                    attempt += 1;
                    warn!(attempt, %reason, "installment service call failed, retrying");
                }
                Ok(response) => {
                    debug!(
                        status = response.status,
                        installments = response.installments.len(),
                        "installment service answered"
                    );
                    return Ok(response);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
