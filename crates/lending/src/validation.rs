//! Validation gate for incoming requests.
//!
//! Pure and stateless: the `check_*` functions say what is wrong, the
//! `validate_*` predicates only say whether the request is acceptable.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use loanapi_core::{DomainError, DomainResult};

use crate::address::AddressRequest;
use crate::customer::CustomerRequest;
use crate::loan::{LoanRequest, LoanTerms, MONEY_LIMIT, MONEY_SCALE, RATE_LIMIT, RATE_SCALE};

pub const START_DATE_FORMAT: &str = "%Y-%m-%d";

// Column widths of the relational schema.
const NAME_LEN: usize = 65;
const DATE_LEN: usize = 20;
const RG_LEN: usize = 12;
const CPF_LEN: usize = 14;
const EMAIL_LEN: usize = 65;
const STREET_LEN: usize = 120;
const POSTAL_CODE_LEN: usize = 12;
const CITY_LEN: usize = 80;
const PHONE_LEN: usize = 20;

/// Whether a loan request carries every required, well-formed field.
pub fn validate_loan_request(request: &LoanRequest) -> bool {
    check_loan_request(request).is_ok()
}

/// Turn a loan request into validated terms.
pub fn check_loan_request(request: &LoanRequest) -> DomainResult<LoanTerms> {
    let original_value = required(request.original_value, "originalValue")?;
    if original_value < Decimal::ZERO {
        return Err(DomainError::validation("originalValue must not be negative"));
    }
    bounded(original_value, MONEY_SCALE, MONEY_LIMIT, "originalValue")?;

    let interest_rate = required(request.interest_rate, "interestRate")?;
    if interest_rate < Decimal::ZERO {
        return Err(DomainError::validation("interestRate must not be negative"));
    }
    bounded(interest_rate, RATE_SCALE, RATE_LIMIT, "interestRate")?;

    let number_of_installments = required(request.number_of_installments, "numberOfInstallments")?;
    if number_of_installments < 1 {
        return Err(DomainError::validation("numberOfInstallments must be at least 1"));
    }

    let payment_date = required(request.payment_date, "paymentDate")?;
    let amortization = required(request.amortization, "amortization")?;

    let raw_start = required(request.start_date.as_deref(), "startDate")?;
    let start_date = NaiveDate::parse_from_str(raw_start.trim(), START_DATE_FORMAT)
        .map_err(|e| DomainError::validation(format!("startDate is malformed: {e}")))?;

    Ok(LoanTerms {
        start_date,
        original_value,
        interest_rate,
        number_of_installments,
        payment_date,
        amortization,
    })
}

/// Whether a customer request carries every required, well-formed field.
pub fn validate_customer_request(request: &CustomerRequest) -> bool {
    check_customer_request(request).is_ok()
}

pub fn check_customer_request(request: &CustomerRequest) -> DomainResult<()> {
    fits(non_blank(request.name.as_deref(), "name")?, NAME_LEN, "name")?;
    fits(non_blank(request.last_name.as_deref(), "lastName")?, NAME_LEN, "lastName")?;
    fits(non_blank(request.birth_date.as_deref(), "birthDate")?, DATE_LEN, "birthDate")?;
    fits(request.sign_up_date.as_deref().unwrap_or_default().trim(), DATE_LEN, "signUpDate")?;
    fits(non_blank(request.rg.as_deref(), "rg")?, RG_LEN, "rg")?;
    fits(non_blank(request.cpf.as_deref(), "cpf")?, CPF_LEN, "cpf")?;

    let email = fits(non_blank(request.email.as_deref(), "email")?, EMAIL_LEN, "email")?;
    if !looks_like_email(email) {
        return Err(DomainError::validation("email is malformed"));
    }

    if let Some(address) = &request.address {
        check_address_request(address)?;
    }

    if let Some(score) = &request.score {
        if !score.points.is_finite() || score.points < 0.0 {
            return Err(DomainError::validation("score.points must be a non-negative number"));
        }
    }

    for phone in &request.phones {
        fits(non_blank(phone.number.as_deref(), "phones.number")?, PHONE_LEN, "phones.number")?;
    }

    Ok(())
}

/// Whether an address request carries every required, well-formed field.
pub fn validate_address_request(request: &AddressRequest) -> bool {
    check_address_request(request).is_ok()
}

pub fn check_address_request(request: &AddressRequest) -> DomainResult<()> {
    fits(non_blank(Some(&request.street), "address.street")?, STREET_LEN, "address.street")?;
    fits(request.neighborhood.trim(), STREET_LEN, "address.neighborhood")?;
    let postal_code = non_blank(Some(&request.postal_code), "address.postalCode")?;
    fits(postal_code, POSTAL_CODE_LEN, "address.postalCode")?;
    fits(non_blank(Some(&request.city), "address.city")?, CITY_LEN, "address.city")?;
    Ok(())
}

fn required<T>(value: Option<T>, field: &str) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::validation(format!("{field} is required")))
}

fn non_blank<'a>(value: Option<&'a str>, field: &str) -> DomainResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::validation(format!("{field} is required"))),
    }
}

fn fits<'a>(value: &'a str, max: usize, field: &str) -> DomainResult<&'a str> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value)
}

/// Rejects values the fixed-point columns would round or overflow.
fn bounded(value: Decimal, scale: u32, limit: i64, field: &str) -> DomainResult<()> {
    if value.normalize().scale() > scale {
        return Err(DomainError::validation(format!(
            "{field} accepts at most {scale} decimal places"
        )));
    }
    if value.abs() >= Decimal::from(limit) {
        return Err(DomainError::validation(format!("{field} must be lower than {limit}")));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
