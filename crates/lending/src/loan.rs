use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use loanapi_core::{CustomerId, DomainError, DomainResult, Entity, InstallmentId, LoanId};

/// Decimal places kept for money amounts.
pub const MONEY_SCALE: u32 = 2;
/// Money amounts stay strictly below this value.
pub const MONEY_LIMIT: i64 = 100_000_000_000_000_000;
/// Decimal places accepted for interest rates.
pub const RATE_SCALE: u32 = 6;
/// Interest rates stay strictly below this value.
pub const RATE_LIMIT: i64 = 1_000;

/// Day of the month on which installments fall due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentDate {
    FirstBusinessDay,
    FifthBusinessDay,
    TenthBusinessDay,
    LastBusinessDay,
}

impl PaymentDate {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentDate::FirstBusinessDay => "FIRST_BUSINESS_DAY",
            PaymentDate::FifthBusinessDay => "FIFTH_BUSINESS_DAY",
            PaymentDate::TenthBusinessDay => "TENTH_BUSINESS_DAY",
            PaymentDate::LastBusinessDay => "LAST_BUSINESS_DAY",
        }
    }
}

impl core::str::FromStr for PaymentDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIRST_BUSINESS_DAY" => Ok(PaymentDate::FirstBusinessDay),
            "FIFTH_BUSINESS_DAY" => Ok(PaymentDate::FifthBusinessDay),
            "TENTH_BUSINESS_DAY" => Ok(PaymentDate::TenthBusinessDay),
            "LAST_BUSINESS_DAY" => Ok(PaymentDate::LastBusinessDay),
            other => Err(DomainError::validation(format!("unknown payment date: {other}"))),
        }
    }
}

/// Amortization method used by the installment calculator.
///
/// - `Sac`: constant amortization, decreasing installments.
/// - `Price`: constant installments (French table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Amortization {
    Sac,
    Price,
}

impl Amortization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Amortization::Sac => "SAC",
            Amortization::Price => "PRICE",
        }
    }
}

impl core::str::FromStr for Amortization {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SAC" => Ok(Amortization::Sac),
            "PRICE" => Ok(Amortization::Price),
            other => Err(DomainError::validation(format!("unknown amortization: {other}"))),
        }
    }
}

/// Loan request as received at the boundary.
///
/// Every field is optional so that a missing field is reported by the
/// validation gate instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub original_value: Option<Decimal>,
    #[serde(default)]
    pub interest_rate: Option<Decimal>,
    #[serde(default)]
    pub number_of_installments: Option<i32>,
    #[serde(default)]
    pub payment_date: Option<PaymentDate>,
    #[serde(default)]
    pub amortization: Option<Amortization>,
}

/// Validated loan terms. This is also the body sent to the installment
/// calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    pub start_date: NaiveDate,
    pub original_value: Decimal,
    pub interest_rate: Decimal,
    pub number_of_installments: i32,
    pub payment_date: PaymentDate,
    pub amortization: Amortization,
}

/// One scheduled repayment, computed by the installment calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    #[serde(default)]
    pub id: Option<InstallmentId>,
    pub number: i32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

impl Entity for Installment {
    type Id = InstallmentId;

    fn id(&self) -> Option<InstallmentId> {
        self.id
    }
}

/// Loan owned by a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub id: Option<LoanId>,
    pub customer_id: Option<CustomerId>,
    pub start_date: NaiveDate,
    pub original_value: Decimal,
    pub debit_balance: Decimal,
    pub interest_rate: Decimal,
    pub number_of_installments: i32,
    pub payment_date: PaymentDate,
    pub amortization: Amortization,
    pub installments: Vec<Installment>,
}

impl Loan {
    /// Build a new, not-yet-persisted loan from validated terms and the
    /// schedule computed for them.
    ///
    /// The debit balance starts equal to the original value and installment
    /// amounts are kept in cents. A loan cannot exist without a computed
    /// schedule.
    pub fn open(terms: LoanTerms, installments: Vec<Installment>) -> DomainResult<Self> {
        if installments.is_empty() {
            return Err(DomainError::invariant(
                "a loan cannot be created without computed installments",
            ));
        }

        Ok(Self {
            id: None,
            customer_id: None,
            start_date: terms.start_date,
            original_value: terms.original_value,
            debit_balance: terms.original_value,
            interest_rate: terms.interest_rate,
            number_of_installments: terms.number_of_installments,
            payment_date: terms.payment_date,
            amortization: terms.amortization,
            installments: installments
                .into_iter()
                .map(|i| Installment {
                    amount: to_cents(i.amount),
                    ..i
                })
                .collect(),
        })
    }
}

fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

impl Entity for Loan {
    type Id = LoanId;

    fn id(&self) -> Option<LoanId> {
        self.id
    }
}
