//! Postgres-backed customer store.
//!
//! Schema lives in `migrations/0001_init.sql` and is applied by
//! [`PostgresCustomerStore::migrate`].
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `NotFound` |
//! | Database (other) | Any other | `Database` |
//! | Other | N/A | `Database` |
//!
//! ## Cascade
//!
//! `save` writes the address link, the customer row, its score, its phones
//! and every not-yet-persisted loan with its installments inside a single
//! transaction. Either the whole aggregate is written or nothing is.
//! Deleting an address detaches the customers that referenced it.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, instrument};

use loanapi_core::{AddressId, AggregateRoot, CustomerId, InstallmentId, LoanId, PhoneId, ScoreId};
use loanapi_lending::{Address, Customer, CustomerDetails, Installment, Loan, Phone, Score};

use super::{CustomerStore, StoreError};
use crate::config::DatabaseConfig;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const LOAN_COLUMNS: &str = r#"
    loan_id,
    customer_id,
    start_date,
    original_value,
    debit_balance,
    interest_rate,
    number_of_installments,
    payment_date,
    amortization
"#;

/// Postgres-backed customer aggregate store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresCustomerStore {
    pool: PgPool,
}

impl PostgresCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn load_customers(&self, filter: CustomerFilter) -> Result<Vec<Customer>, StoreError> {
        let (customer_id, address_id) = match filter {
            CustomerFilter::All => (None, None),
            CustomerFilter::Customer(id) => (Some(id.get()), None),
            CustomerFilter::Address(id) => (None, Some(id.get())),
        };
        let rows = sqlx::query(
            r#"
            SELECT
                c.customer_id,
                c.name,
                c.last_name,
                c.birth_date,
                c.sign_up_date,
                c.rg,
                c.cpf,
                c.email,
                a.address_id,
                a.street,
                a.neighborhood,
                a.number,
                a.postal_code,
                a.city,
                a.state,
                s.score_id,
                s.points
            FROM customer c
            LEFT JOIN address a ON a.address_id = c.address_id
            LEFT JOIN score s ON s.customer_id = c.customer_id
            WHERE ($1::BIGINT IS NULL OR c.customer_id = $1)
              AND ($2::BIGINT IS NULL OR c.address_id = $2)
            ORDER BY c.customer_id ASC
            "#,
        )
        .bind(customer_id)
        .bind(address_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_customers", e))?;

        if rows.is_empty() {
            return Ok(vec![]);
        }

        let owners = rows
            .iter()
            .map(|r| get::<i64>(r, "customer_id"))
            .collect::<Result<Vec<_>, _>>()?;
        let mut phones = self.load_phones(&owners).await?;
        let mut loans = group_by_customer(self.load_loans(LoanFilter::Customers(&owners)).await?);

        let mut customers = Vec::with_capacity(rows.len());
        for row in rows {
            let customer_id = CustomerId::new(get::<i64>(&row, "customer_id")?);
            let details = CustomerDetails {
                name: get(&row, "name")?,
                last_name: get(&row, "last_name")?,
                birth_date: get(&row, "birth_date")?,
                sign_up_date: get(&row, "sign_up_date")?,
                rg: get(&row, "rg")?,
                cpf: get(&row, "cpf")?,
                email: get(&row, "email")?,
            };

            let address = match get::<Option<i64>>(&row, "address_id")? {
                Some(address_id) => Some(read_address(&row, address_id)?),
                None => None,
            };

            let score = match get::<Option<i64>>(&row, "score_id")? {
                Some(score_id) => Some(Score {
                    id: Some(ScoreId::new(score_id)),
                    points: get(&row, "points")?,
                }),
                None => None,
            };

            customers.push(Customer::from_parts(
                customer_id,
                details,
                address,
                score,
                phones.remove(&customer_id).unwrap_or_default(),
                loans.remove(&customer_id).unwrap_or_default(),
            ));
        }

        Ok(customers)
    }

    async fn load_phones(
        &self,
        owners: &[i64],
    ) -> Result<HashMap<CustomerId, Vec<Phone>>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT phone_id, customer_id, prefix, number, phone_type
            FROM phone
            WHERE customer_id = ANY($1)
            ORDER BY phone_id ASC
            "#,
        )
        .bind(owners)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_phones", e))?;

        let mut phones: HashMap<CustomerId, Vec<Phone>> = HashMap::new();
        for row in rows {
            let owner = CustomerId::new(get::<i64>(&row, "customer_id")?);
            phones.entry(owner).or_default().push(Phone {
                id: Some(PhoneId::new(get::<i64>(&row, "phone_id")?)),
                prefix: get(&row, "prefix")?,
                number: get(&row, "number")?,
                phone_type: parse_column(&row, "phone_type")?,
            });
        }
        Ok(phones)
    }

    async fn load_loans(&self, filter: LoanFilter<'_>) -> Result<Vec<Loan>, StoreError> {
        let (owners, loan_id) = match filter {
            LoanFilter::All => (None, None),
            LoanFilter::Customers(ids) => (Some(ids), None),
            LoanFilter::Loan(id) => (None, Some(id.get())),
        };

        let sql = format!(
            "SELECT {LOAN_COLUMNS} FROM loan \
             WHERE ($1::BIGINT[] IS NULL OR customer_id = ANY($1)) \
               AND ($2::BIGINT IS NULL OR loan_id = $2) \
             ORDER BY loan_id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(owners)
            .bind(loan_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_loans", e))?;

        if rows.is_empty() {
            return Ok(vec![]);
        }

        let loan_ids = rows
            .iter()
            .map(|r| get::<i64>(r, "loan_id"))
            .collect::<Result<Vec<_>, _>>()?;
        let mut installments = self.load_installments(&loan_ids).await?;

        rows.iter()
            .map(|row| {
                let loan_id = get::<i64>(row, "loan_id")?;
                Ok(Loan {
                    id: Some(LoanId::new(loan_id)),
                    customer_id: Some(CustomerId::new(get::<i64>(row, "customer_id")?)),
                    start_date: get::<NaiveDate>(row, "start_date")?,
                    original_value: get::<Decimal>(row, "original_value")?,
                    debit_balance: get::<Decimal>(row, "debit_balance")?,
                    interest_rate: get::<Decimal>(row, "interest_rate")?,
                    number_of_installments: get(row, "number_of_installments")?,
                    payment_date: parse_column(row, "payment_date")?,
                    amortization: parse_column(row, "amortization")?,
                    installments: installments.remove(&loan_id).unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn load_installments(
        &self,
        loan_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Installment>>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT installment_id, loan_id, number, due_date, amount
            FROM installment
            WHERE loan_id = ANY($1)
            ORDER BY loan_id ASC, number ASC
            "#,
        )
        .bind(loan_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_installments", e))?;

        let mut out: HashMap<i64, Vec<Installment>> = HashMap::new();
        for row in rows {
            out.entry(get::<i64>(&row, "loan_id")?)
                .or_default()
                .push(Installment {
                    id: Some(InstallmentId::new(get::<i64>(&row, "installment_id")?)),
                    number: get(&row, "number")?,
                    due_date: get(&row, "due_date")?,
                    amount: get(&row, "amount")?,
                });
        }
        Ok(out)
    }

    async fn load_addresses(&self, id: Option<AddressId>) -> Result<Vec<Address>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT address_id, street, neighborhood, number, postal_code, city, state
            FROM address
            WHERE $1::BIGINT IS NULL OR address_id = $1
            ORDER BY address_id ASC
            "#,
        )
        .bind(id.map(i64::from))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_addresses", e))?;

        rows.iter()
            .map(|row| read_address(row, get(row, "address_id")?))
            .collect()
    }
}

enum CustomerFilter {
    All,
    Customer(CustomerId),
    Address(AddressId),
}

enum LoanFilter<'a> {
    All,
    /// Loans owned by any of these customer ids.
    Customers(&'a [i64]),
    Loan(LoanId),
}

#[async_trait]
impl CustomerStore for PostgresCustomerStore {
    #[instrument(skip(self), fields(customer_id = %id), err)]
    async fn find_customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.load_customers(CustomerFilter::Customer(id)).await?.pop())
    }

    #[instrument(skip(self), err)]
    async fn find_all_customers(&self) -> Result<Vec<Customer>, StoreError> {
        self.load_customers(CustomerFilter::All).await
    }

    #[instrument(skip(self, customer), fields(customer_id = ?customer.customer_id()), err)]
    async fn save(&self, mut customer: Customer) -> Result<Customer, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let address_id = match customer.address.as_mut() {
            Some(address) => Some(upsert_address(&mut tx, address).await?),
            None => None,
        };

        let customer_id = upsert_customer(&mut tx, &customer, address_id).await?;
        if customer.customer_id().is_none() {
            customer.assign_id(customer_id);
        }

        match customer.score.as_mut() {
            Some(score) => {
                let row = sqlx::query(
                    r#"
                    INSERT INTO score (customer_id, points)
                    VALUES ($1, $2)
                    ON CONFLICT (customer_id)
                    DO UPDATE SET points = EXCLUDED.points
                    RETURNING score_id
                    "#,
                )
                .bind(customer_id.get())
                .bind(score.points)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("upsert_score", e))?;
                score.id = Some(ScoreId::new(get(&row, "score_id")?));
            }
            None => {
                sqlx::query("DELETE FROM score WHERE customer_id = $1")
                    .bind(customer_id.get())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("delete_score", e))?;
            }
        }

        for phone in &mut customer.phones {
            upsert_phone(&mut tx, customer_id, phone).await?;
        }
        let kept: Vec<i64> = customer
            .phones
            .iter()
            .filter_map(|p| p.id.map(i64::from))
            .collect();
        sqlx::query("DELETE FROM phone WHERE customer_id = $1 AND NOT (phone_id = ANY($2))")
            .bind(customer_id.get())
            .bind(&kept)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("prune_phones", e))?;

        // Loans are immutable once stored; only new ones are written.
        for loan in customer.loans_mut().iter_mut().filter(|l| l.id.is_none()) {
            insert_loan(&mut tx, customer_id, loan).await?;
            debug!(loan_id = ?loan.id, "loan cascaded with customer");
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(customer)
    }

    #[instrument(skip(self), fields(customer_id = %id), err)]
    async fn delete_customer_by_id(&self, id: CustomerId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM customer WHERE customer_id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_customer", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("{} {id}", Customer::AGGREGATE_TYPE)));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(loan_id = %id), err)]
    async fn find_loan_by_id(&self, id: LoanId) -> Result<Option<Loan>, StoreError> {
        Ok(self.load_loans(LoanFilter::Loan(id)).await?.pop())
    }

    #[instrument(skip(self), fields(loan_id = %id), err)]
    async fn delete_loan_by_id(&self, id: LoanId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM loan WHERE loan_id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_loan", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("loan {id}")));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn find_all_loans(&self) -> Result<Vec<Loan>, StoreError> {
        self.load_loans(LoanFilter::All).await
    }

    #[instrument(skip(self), fields(address_id = %id), err)]
    async fn find_address_by_id(&self, id: AddressId) -> Result<Option<Address>, StoreError> {
        Ok(self.load_addresses(Some(id)).await?.pop())
    }

    #[instrument(skip(self), err)]
    async fn find_all_addresses(&self) -> Result<Vec<Address>, StoreError> {
        self.load_addresses(None).await
    }

    #[instrument(skip(self, address), fields(address_id = ?address.id), err)]
    async fn save_address(&self, mut address: Address) -> Result<Address, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        upsert_address(&mut tx, &mut address).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(address)
    }

    #[instrument(skip(self), fields(address_id = %id), err)]
    async fn delete_address_by_id(&self, id: AddressId) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("UPDATE customer SET address_id = NULL WHERE address_id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("detach_address", e))?;
        let result = sqlx::query("DELETE FROM address WHERE address_id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_address", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("address {id}")));
        }
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(address_id = %id), err)]
    async fn find_customers_by_address(&self, id: AddressId) -> Result<Vec<Customer>, StoreError> {
        self.load_customers(CustomerFilter::Address(id)).await
    }
}

async fn upsert_address(
    tx: &mut Transaction<'_, Postgres>,
    address: &mut Address,
) -> Result<AddressId, StoreError> {
    match address.id {
        Some(id) => {
            let result = sqlx::query(
                r#"
                UPDATE address SET
                    street = $2,
                    neighborhood = $3,
                    number = $4,
                    postal_code = $5,
                    city = $6,
                    state = $7
                WHERE address_id = $1
                "#,
            )
            .bind(id.get())
            .bind(&address.street)
            .bind(&address.neighborhood)
            .bind(address.number)
            .bind(&address.postal_code)
            .bind(&address.city)
            .bind(address.state.as_str())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("update_address", e))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound(format!("address {id}")));
            }
            Ok(id)
        }
        None => {
            let row = sqlx::query(
                r#"
                INSERT INTO address (street, neighborhood, number, postal_code, city, state)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING address_id
                "#,
            )
            .bind(&address.street)
            .bind(&address.neighborhood)
            .bind(address.number)
            .bind(&address.postal_code)
            .bind(&address.city)
            .bind(address.state.as_str())
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("insert_address", e))?;

            let id = AddressId::new(get(&row, "address_id")?);
            address.id = Some(id);
            Ok(id)
        }
    }
}

async fn upsert_customer(
    tx: &mut Transaction<'_, Postgres>,
    customer: &Customer,
    address_id: Option<AddressId>,
) -> Result<CustomerId, StoreError> {
    let d = &customer.details;
    match customer.customer_id() {
        Some(id) => {
            let result = sqlx::query(
                r#"
                UPDATE customer SET
                    name = $2,
                    last_name = $3,
                    birth_date = $4,
                    sign_up_date = $5,
                    rg = $6,
                    cpf = $7,
                    email = $8,
                    address_id = $9
                WHERE customer_id = $1
                "#,
            )
            .bind(id.get())
            .bind(&d.name)
            .bind(&d.last_name)
            .bind(&d.birth_date)
            .bind(&d.sign_up_date)
            .bind(&d.rg)
            .bind(&d.cpf)
            .bind(&d.email)
            .bind(address_id.map(i64::from))
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("update_customer", e))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound(format!("{} {id}", Customer::AGGREGATE_TYPE)));
            }
            Ok(id)
        }
        None => {
            let row = sqlx::query(
                r#"
                INSERT INTO customer (
                    name, last_name, birth_date, sign_up_date, rg, cpf, email, address_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING customer_id
                "#,
            )
            .bind(&d.name)
            .bind(&d.last_name)
            .bind(&d.birth_date)
            .bind(&d.sign_up_date)
            .bind(&d.rg)
            .bind(&d.cpf)
            .bind(&d.email)
            .bind(address_id.map(i64::from))
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("insert_customer", e))?;

            Ok(CustomerId::new(get(&row, "customer_id")?))
        }
    }
}

async fn upsert_phone(
    tx: &mut Transaction<'_, Postgres>,
    customer_id: CustomerId,
    phone: &mut Phone,
) -> Result<(), StoreError> {
    match phone.id {
        Some(id) => {
            let result = sqlx::query(
                r#"
                UPDATE phone SET prefix = $3, number = $4, phone_type = $5
                WHERE phone_id = $1 AND customer_id = $2
                "#,
            )
            .bind(id.get())
            .bind(customer_id.get())
            .bind(phone.prefix)
            .bind(&phone.number)
            .bind(phone.phone_type.as_str())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("update_phone", e))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound(format!("phone {id}")));
            }
        }
        None => {
            let row = sqlx::query(
                r#"
                INSERT INTO phone (customer_id, prefix, number, phone_type)
                VALUES ($1, $2, $3, $4)
                RETURNING phone_id
                "#,
            )
            .bind(customer_id.get())
            .bind(phone.prefix)
            .bind(&phone.number)
            .bind(phone.phone_type.as_str())
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("insert_phone", e))?;

            phone.id = Some(PhoneId::new(get(&row, "phone_id")?));
        }
    }
    Ok(())
}

async fn insert_loan(
    tx: &mut Transaction<'_, Postgres>,
    customer_id: CustomerId,
    loan: &mut Loan,
) -> Result<(), StoreError> {
    let row = sqlx::query(
        r#"
        INSERT INTO loan (
            customer_id,
            start_date,
            original_value,
            debit_balance,
            interest_rate,
            number_of_installments,
            payment_date,
            amortization
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING loan_id
        "#,
    )
    .bind(customer_id.get())
    .bind(loan.start_date)
    .bind(loan.original_value)
    .bind(loan.debit_balance)
    .bind(loan.interest_rate)
    .bind(loan.number_of_installments)
    .bind(loan.payment_date.as_str())
    .bind(loan.amortization.as_str())
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_loan", e))?;

    let loan_id: i64 = get(&row, "loan_id")?;
    loan.id = Some(LoanId::new(loan_id));
    loan.customer_id = Some(customer_id);

    for installment in &mut loan.installments {
        let row = sqlx::query(
            r#"
            INSERT INTO installment (loan_id, number, due_date, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING installment_id
            "#,
        )
        .bind(loan_id)
        .bind(installment.number)
        .bind(installment.due_date)
        .bind(installment.amount)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_installment", e))?;

        installment.id = Some(InstallmentId::new(get(&row, "installment_id")?));
    }
    Ok(())
}

fn read_address(row: &PgRow, id: i64) -> Result<Address, StoreError> {
    Ok(Address {
        id: Some(AddressId::new(id)),
        street: get(row, "street")?,
        neighborhood: get(row, "neighborhood")?,
        number: get(row, "number")?,
        postal_code: get(row, "postal_code")?,
        city: get(row, "city")?,
        state: parse_column(row, "state")?,
    })
}

fn group_by_customer(loans: Vec<Loan>) -> HashMap<CustomerId, Vec<Loan>> {
    let mut out: HashMap<CustomerId, Vec<Loan>> = HashMap::new();
    for loan in loans {
        if let Some(owner) = loan.customer_id {
            out.entry(owner).or_default().push(loan);
        }
    }
    out
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Database(format!("failed to read column {column}: {e}")))
}

fn parse_column<T>(row: &PgRow, column: &str) -> Result<T, StoreError>
where
    T: core::str::FromStr<Err = loanapi_core::DomainError>,
{
    let raw: String = get(row, column)?;
    raw.parse()
        .map_err(|e| StoreError::Database(format!("column {column}: {e}")))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = match db_err.constraint() {
                Some(constraint) => format!(
                    "{} violates {} in {}",
                    db_err.message(),
                    constraint,
                    operation
                ),
                None => format!("database error in {}: {}", operation, db_err.message()),
            };

            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::NotFound(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Database(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}
