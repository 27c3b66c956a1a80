//! Lending domain module (customers, addresses, loans and their owned entities).
//!
//! This crate contains business rules for the customer aggregate, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod address;
pub mod customer;
pub mod loan;
pub mod validation;

pub use address::{Address, AddressRequest, State};
pub use customer::{
    Customer, CustomerDetails, CustomerRequest, Phone, PhoneRequest, PhoneType, Score,
    ScoreRequest,
};
pub use loan::{Amortization, Installment, Loan, LoanRequest, LoanTerms, PaymentDate};
pub use validation::{
    check_address_request, check_customer_request, check_loan_request, validate_address_request,
    validate_customer_request, validate_loan_request,
};
