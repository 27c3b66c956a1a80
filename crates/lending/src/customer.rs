use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use loanapi_core::{
    AggregateRoot, CustomerId, DomainError, DomainResult, Entity, LoanId, PhoneId, ScoreId,
};

use crate::address::{Address, AddressRequest};
use crate::loan::Loan;
use crate::validation::check_customer_request;

/// Kind of phone line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhoneType {
    Mobile,
    Landline,
    Commercial,
}

impl PhoneType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneType::Mobile => "MOBILE",
            PhoneType::Landline => "LANDLINE",
            PhoneType::Commercial => "COMMERCIAL",
        }
    }
}

impl core::str::FromStr for PhoneType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MOBILE" => Ok(PhoneType::Mobile),
            "LANDLINE" => Ok(PhoneType::Landline),
            "COMMERCIAL" => Ok(PhoneType::Commercial),
            other => Err(DomainError::validation(format!("unknown phone type: {other}"))),
        }
    }
}

/// Credit score, owned by exactly one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub id: Option<ScoreId>,
    pub points: f64,
}

impl Entity for Score {
    type Id = ScoreId;

    fn id(&self) -> Option<ScoreId> {
        self.id
    }
}

/// Phone number owned by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phone {
    pub id: Option<PhoneId>,
    pub prefix: i32,
    pub number: String,
    pub phone_type: PhoneType,
}

impl Entity for Phone {
    type Id = PhoneId;

    fn id(&self) -> Option<PhoneId> {
        self.id
    }
}

/// Personal data of a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub last_name: String,
    pub birth_date: String,
    pub sign_up_date: String,
    pub rg: String,
    pub cpf: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneRequest {
    pub prefix: i32,
    pub number: Option<String>,
    pub phone_type: PhoneType,
}

/// Customer request as received at the boundary (create and update).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerRequest {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub sign_up_date: Option<String>,
    pub rg: Option<String>,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub address: Option<AddressRequest>,
    pub score: Option<ScoreRequest>,
    pub phones: Vec<PhoneRequest>,
}

/// Aggregate root: Customer.
///
/// Owns its score, phones and loans; a loan only ever enters the aggregate
/// through [`Customer::add_loan`].
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    id: Option<CustomerId>,
    pub details: CustomerDetails,
    pub address: Option<Address>,
    pub score: Option<Score>,
    pub phones: Vec<Phone>,
    loans: Vec<Loan>,
}

impl Customer {
    /// Build a new, not-yet-persisted customer.
    ///
    /// `today` fills the sign-up date when the request does not carry one.
    pub fn register(request: CustomerRequest, today: NaiveDate) -> DomainResult<Self> {
        let (details, address, score, phones) = split_request(request, today)?;
        Ok(Self {
            id: None,
            details,
            address,
            score,
            phones,
            loans: Vec::new(),
        })
    }

    /// Rehydrate a stored customer.
    pub fn from_parts(
        id: CustomerId,
        details: CustomerDetails,
        address: Option<Address>,
        score: Option<Score>,
        phones: Vec<Phone>,
        loans: Vec<Loan>,
    ) -> Self {
        Self {
            id: Some(id),
            details,
            address,
            score,
            phones,
            loans,
        }
    }

    /// Replace personal data, address, score and phones. Loans are kept.
    ///
    /// The existing score row is reused so the one-to-one link stays stable.
    pub fn apply_update(&mut self, request: CustomerRequest, today: NaiveDate) -> DomainResult<()> {
        let keep_sign_up = request
            .sign_up_date
            .as_deref()
            .is_none_or(|s| s.trim().is_empty());
        let (mut details, address, score, phones) = split_request(request, today)?;
        if keep_sign_up {
            details.sign_up_date = self.details.sign_up_date.clone();
        }
        let score_id = self.score.as_ref().and_then(|s| s.id);

        self.details = details;
        self.address = address;
        self.score = score.map(|s| Score { id: score_id, ..s });
        self.phones = phones;
        Ok(())
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.id
    }

    /// Called by stores once the aggregate has been assigned an identity.
    pub fn assign_id(&mut self, id: CustomerId) {
        self.id = Some(id);
        for loan in &mut self.loans {
            loan.customer_id = Some(id);
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.details.name, self.details.last_name)
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    /// Mutable access for stores assigning identities to owned loans.
    pub fn loans_mut(&mut self) -> &mut [Loan] {
        &mut self.loans
    }

    /// Attach a freshly opened loan.
    ///
    /// Only persisted customers can own loans, and the loan must not belong
    /// to anyone yet.
    pub fn add_loan(&mut self, mut loan: Loan) -> DomainResult<()> {
        let Some(id) = self.id else {
            return Err(DomainError::invariant(
                "loans can only be attached to a persisted customer",
            ));
        };
        if loan.id.is_some() || loan.customer_id.is_some_and(|owner| owner != id) {
            return Err(DomainError::invariant("loan already belongs to a customer"));
        }

        loan.customer_id = Some(id);
        self.loans.push(loan);
        Ok(())
    }

    /// Replace the persisted loans with `stored`, keeping only the loans of
    /// this copy that have not been persisted yet.
    ///
    /// Stores call this on save so a stale copy can neither drop loans added
    /// concurrently nor bring back deleted ones.
    pub fn rebase_loans(&mut self, stored: &[Loan]) {
        let pending = self.loans.drain(..).filter(|l| l.id.is_none());
        let mut loans: Vec<Loan> = stored.to_vec();
        loans.extend(pending);
        for loan in &mut loans {
            loan.customer_id = self.id;
        }
        self.loans = loans;
    }

    /// Detach a loan by identity. Returns whether it was owned by this customer.
    pub fn remove_loan(&mut self, loan_id: LoanId) -> bool {
        let before = self.loans.len();
        self.loans.retain(|l| l.id != Some(loan_id));
        self.loans.len() != before
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> Option<CustomerId> {
        self.id
    }
}

impl AggregateRoot for Customer {
    const AGGREGATE_TYPE: &'static str = "lending.customer";
}

type SplitRequest = (CustomerDetails, Option<Address>, Option<Score>, Vec<Phone>);

fn split_request(request: CustomerRequest, today: NaiveDate) -> DomainResult<SplitRequest> {
    check_customer_request(&request)?;

    let text = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
    let details = CustomerDetails {
        name: text(request.name),
        last_name: text(request.last_name),
        birth_date: text(request.birth_date),
        sign_up_date: request
            .sign_up_date
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| today.to_string()),
        rg: text(request.rg),
        cpf: text(request.cpf),
        email: text(request.email).to_lowercase(),
    };

    let address = request.address.map(Address::from_request).transpose()?;

    let score = request.score.map(|s| Score {
        id: None,
        points: s.points,
    });

    let phones = request
        .phones
        .into_iter()
        .map(|p| Phone {
            id: None,
            prefix: p.prefix,
            number: p.number.unwrap_or_default().trim().to_string(),
            phone_type: p.phone_type,
        })
        .collect();

    Ok((details, address, score, phones))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::State;
    use crate::loan::{Amortization, Installment, LoanTerms, PaymentDate};
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 6, 30).unwrap()
    }

    fn request() -> CustomerRequest {
        CustomerRequest {
            name: Some("João".to_string()),
            last_name: Some("da Silva".to_string()),
            birth_date: Some("2011-11-11".to_string()),
            sign_up_date: None,
            rg: Some("55.626.926-4".to_string()),
            cpf: Some("391.534.277-44".to_string()),
            email: Some("Joao@Email.com".to_string()),
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
        }
    }

    fn loan() -> Loan {
        let terms = LoanTerms {
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            original_value: dec!(1000),
            interest_rate: dec!(0.05),
            number_of_installments: 1,
            payment_date: PaymentDate::FirstBusinessDay,
            amortization: Amortization::Price,
        };
        let schedule = vec![Installment {
            id: None,
            number: 1,
            due_date: NaiveDate::from_ymd_opt(2022, 2, 1).unwrap(),
            amount: dec!(1050),
        }];
        Loan::open(terms, schedule).unwrap()
    }

    #[test]
    fn register_normalizes_and_defaults_sign_up_date() {
        let customer = Customer::register(request(), today()).unwrap();
        assert_eq!(customer.customer_id(), None);
        assert_eq!(customer.details.email, "joao@email.com");
        assert_eq!(customer.details.sign_up_date, "2022-06-30");
        assert_eq!(customer.full_name(), "João da Silva");
        assert_eq!(customer.phones.len(), 1);
        assert!(customer.loans().is_empty());
    }

    #[test]
    fn register_rejects_invalid_request() {
        let mut req = request();
        req.email = Some("not-an-email".to_string());
        assert!(matches!(
            Customer::register(req, today()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn add_loan_requires_persisted_customer() {
        let mut customer = Customer::register(request(), today()).unwrap();
        let err = customer.add_loan(loan()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn add_loan_sets_back_reference() {
        let mut customer = Customer::register(request(), today()).unwrap();
        customer.assign_id(CustomerId::new(7));

        customer.add_loan(loan()).unwrap();

        assert_eq!(customer.loans().len(), 1);
        assert_eq!(customer.loans()[0].customer_id, Some(CustomerId::new(7)));
    }

    #[test]
    fn add_loan_rejects_loan_owned_elsewhere() {
        let mut customer = Customer::register(request(), today()).unwrap();
        customer.assign_id(CustomerId::new(7));
        let mut foreign = loan();
        foreign.customer_id = Some(CustomerId::new(8));

        assert!(customer.add_loan(foreign).is_err());
        assert!(customer.loans().is_empty());
    }

    #[test]
    fn update_keeps_loans_score_identity_and_sign_up_date() {
        let mut customer = Customer::register(request(), today()).unwrap();
        customer.assign_id(CustomerId::new(1));
        customer.score.as_mut().unwrap().id = Some(ScoreId::new(3));
        customer.add_loan(loan()).unwrap();

        let mut update = request();
        update.name = Some("Maria".to_string());
        update.score = Some(ScoreRequest { points: 80.0 });
        update.phones.clear();
        customer
            .apply_update(update, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
            .unwrap();

        assert_eq!(customer.details.name, "Maria");
        assert_eq!(customer.details.sign_up_date, "2022-06-30");
        assert_eq!(customer.score, Some(Score { id: Some(ScoreId::new(3)), points: 80.0 }));
        assert!(customer.phones.is_empty());
        assert_eq!(customer.loans().len(), 1);
    }

    #[test]
    fn remove_loan_by_identity() {
        let mut customer = Customer::register(request(), today()).unwrap();
        customer.assign_id(CustomerId::new(1));
        customer.add_loan(loan()).unwrap();
        customer.loans_mut()[0].id = Some(LoanId::new(10));

        assert!(!customer.remove_loan(LoanId::new(11)));
        assert!(customer.remove_loan(LoanId::new(10)));
        assert!(customer.loans().is_empty());
    }

    #[test]
    fn rebase_keeps_stored_loans_and_appends_pending_ones() {
        let mut stored = Customer::register(request(), today()).unwrap();
        stored.assign_id(CustomerId::new(1));
        stored.add_loan(loan()).unwrap();
        stored.add_loan(loan()).unwrap();
        stored.loans_mut()[0].id = Some(LoanId::new(10));
        stored.loans_mut()[1].id = Some(LoanId::new(11));

        // Stale copy: still holds loan 10, never saw loan 11, opened a new one.
        let mut stale = stored.clone();
        stale.remove_loan(LoanId::new(11));
        stale.add_loan(loan()).unwrap();
        // Loan 10 was deleted meanwhile.
        stored.remove_loan(LoanId::new(10));

        stale.rebase_loans(stored.loans());

        let ids: Vec<_> = stale.loans().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![Some(LoanId::new(11)), None]);
        assert!(stale.loans().iter().all(|l| l.customer_id == Some(CustomerId::new(1))));
    }
}
