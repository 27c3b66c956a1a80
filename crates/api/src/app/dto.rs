//! Response DTOs and mapping from domain types.
//!
//! Request bodies deserialize straight into the lending crate's request types
//! (`LoanRequest`, `CustomerRequest`, `AddressRequest`), which are already
//! camelCase and lenient about missing fields.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use loanapi_core::{AddressId, CustomerId, InstallmentId, LoanId};
use loanapi_lending::{
    Address, Amortization, Customer, Installment, Loan, PaymentDate, Phone, Score, State,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentResponse {
    pub id: Option<InstallmentId>,
    pub number: i32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

impl From<Installment> for InstallmentResponse {
    fn from(i: Installment) -> Self {
        Self {
            id: i.id,
            number: i.number,
            due_date: i.due_date,
            amount: i.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResponse {
    pub id: Option<LoanId>,
    pub customer_id: Option<CustomerId>,
    pub start_date: NaiveDate,
    pub original_value: Decimal,
    pub debit_balance: Decimal,
    pub interest_rate: Decimal,
    pub number_of_installments: i32,
    pub payment_date: PaymentDate,
    pub amortization: Amortization,
    pub installments: Vec<InstallmentResponse>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id,
            customer_id: loan.customer_id,
            start_date: loan.start_date,
            original_value: loan.original_value,
            debit_balance: loan.debit_balance,
            interest_rate: loan.interest_rate,
            number_of_installments: loan.number_of_installments,
            payment_date: loan.payment_date,
            amortization: loan.amortization,
            installments: loan.installments.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: Option<CustomerId>,
    pub name: String,
    pub last_name: String,
    pub birth_date: String,
    pub sign_up_date: String,
    pub rg: String,
    pub cpf: String,
    pub email: String,
    pub address: Option<Address>,
    pub score: Option<Score>,
    pub phones: Vec<Phone>,
    pub loans: Vec<LoanResponse>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        let loans = customer.loans().iter().cloned().map(Into::into).collect();
        let id = customer.customer_id();
        let Customer {
            details,
            address,
            score,
            phones,
            ..
        } = customer;

        Self {
            id,
            name: details.name,
            last_name: details.last_name,
            birth_date: details.birth_date,
            sign_up_date: details.sign_up_date,
            rg: details.rg,
            cpf: details.cpf,
            email: details.email,
            address,
            score,
            phones,
            loans,
        }
    }
}

/// Customer as listed under the address it lives at.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentResponse {
    pub id: Option<CustomerId>,
    pub full_name: String,
    pub email: String,
}

impl From<&Customer> for ResidentResponse {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.customer_id(),
            full_name: customer.full_name(),
            email: customer.details.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub id: Option<AddressId>,
    pub street: String,
    pub neighborhood: String,
    pub number: i32,
    pub postal_code: String,
    pub city: String,
    pub state: State,
    pub customers: Vec<ResidentResponse>,
}

impl AddressResponse {
    pub fn new(address: Address, residents: &[Customer]) -> Self {
        Self {
            id: address.id,
            street: address.street,
            neighborhood: address.neighborhood,
            number: address.number,
            postal_code: address.postal_code,
            city: address.city,
            state: address.state,
            customers: residents.iter().map(Into::into).collect(),
        }
    }
}

pub fn loans_to_json(loans: Vec<Loan>) -> Vec<LoanResponse> {
    loans.into_iter().map(Into::into).collect()
}

pub fn customers_to_json(customers: Vec<Customer>) -> Vec<CustomerResponse> {
    customers.into_iter().map(Into::into).collect()
}
