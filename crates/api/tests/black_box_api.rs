use httpmock::prelude::*;
use loanapi_infra::config::{AppConfig, CalculatorConfig};
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(calculator_url: String) -> Self {
        // Same router as prod (in-memory store), bound to an ephemeral port.
        let config = AppConfig {
            calculator: CalculatorConfig {
                url: calculator_url,
                ..CalculatorConfig::default()
            },
            ..AppConfig::default()
        };
        let app = loanapi_api::app::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn schedule(n: u32) -> Value {
    let items: Vec<Value> = (1..=n)
        .map(|i| {
            json!({
                "number": i,
                "dueDate": format!("{}-{:02}-01", 2022 + (i / 12), i % 12 + 1),
                "amount": "87.50"
            })
        })
        .collect();
    Value::Array(items)
}

fn loan_body() -> Value {
    json!({
        "originalValue": 1000,
        "interestRate": 0.05,
        "numberOfInstallments": 12,
        "paymentDate": "FIRST_BUSINESS_DAY",
        "amortization": "SAC",
        "startDate": "2022-01-01"
    })
}

fn customer_body(tag: &str) -> Value {
    json!({
        "name": "João",
        "lastName": "da Silva",
        "birthDate": "2011-11-11",
        "rg": format!("rg-{tag}"),
        "cpf": format!("cpf-{tag}"),
        "email": format!("joao.{tag}@email.com")
    })
}

async fn create_customer(client: &reqwest::Client, srv: &TestServer, tag: &str) -> i64 {
    let res = client
        .post(srv.url("/customers"))
        .json(&customer_body(tag))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

fn assert_error_shape(body: &Value, status: u16, message: &str, path: &str) {
    assert_eq!(body["status"], status);
    assert_eq!(body["message"], message);
    assert_eq!(body["path"], path);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_is_up_and_requests_carry_an_id() {
    let srv = TestServer::spawn("http://127.0.0.1:9/installments".to_string()).await;

    let res = reqwest::get(srv.url("/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn loan_lifecycle_create_list_get_delete() {
    let calculator = MockServer::start_async().await;
    let calc_mock = calculator
        .mock_async(|when, then| {
            when.method(POST)
                .path("/installments")
                .json_body_partial(r#"{"numberOfInstallments": 12, "amortization": "SAC"}"#);
            then.status(200).json_body(schedule(12));
        })
        .await;

    let srv = TestServer::spawn(calculator.url("/installments")).await;
    let client = reqwest::Client::new();
    let customer_id = create_customer(&client, &srv, "a").await;

    let res = client
        .post(srv.url(&format!("/customers/{customer_id}/loans")))
        .json(&loan_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let loan: Value = res.json().await.unwrap();
    calc_mock.assert_async().await;

    assert_eq!(loan["debitBalance"], "1000");
    assert_eq!(loan["originalValue"], "1000");
    assert_eq!(loan["customerId"], customer_id);
    assert_eq!(loan["installments"].as_array().unwrap().len(), 12);
    let loan_id = loan["id"].as_i64().unwrap();

    let res = client.get(srv.url("/loans")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let all: Value = res.json().await.unwrap();
    assert_eq!(all.as_array().unwrap().len(), 1);

    let res = client
        .get(srv.url(&format!("/customers/{customer_id}")))
        .send()
        .await
        .unwrap();
    let customer: Value = res.json().await.unwrap();
    assert_eq!(customer["loans"][0]["id"], loan_id);

    let res = client
        .get(srv.url(&format!("/loans/{loan_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(srv.url(&format!("/loans/{loan_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!(true));

    let path = format!("/loans/{loan_id}");
    let res = client.get(srv.url(&path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_error_shape(&res.json().await.unwrap(), 404, "Loan not found", &path);
}

#[tokio::test]
async fn empty_loan_list_is_not_found() {
    let srv = TestServer::spawn("http://127.0.0.1:9/installments".to_string()).await;

    let res = reqwest::get(srv.url("/loans")).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_error_shape(
        &res.json().await.unwrap(),
        404,
        "There is no loans saved in the database",
        "/loans",
    );
}

#[tokio::test]
async fn loan_for_unknown_customer_is_bad_request() {
    let srv = TestServer::spawn("http://127.0.0.1:9/installments".to_string()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/customers/999/loans"))
        .json(&loan_body())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_error_shape(
        &res.json().await.unwrap(),
        400,
        "Customer not found",
        "/customers/999/loans",
    );
}

#[tokio::test]
async fn calculator_failure_is_forbidden_and_persists_nothing() {
    let calculator = MockServer::start_async().await;
    calculator
        .mock_async(|when, then| {
            when.method(POST).path("/installments");
            then.status(500);
        })
        .await;

    let srv = TestServer::spawn(calculator.url("/installments")).await;
    let client = reqwest::Client::new();
    let customer_id = create_customer(&client, &srv, "a").await;

    let path = format!("/customers/{customer_id}/loans");
    let res = client
        .post(srv.url(&path))
        .json(&loan_body())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_error_shape(
        &res.json().await.unwrap(),
        403,
        "Installment Microservice connection failed",
        &path,
    );

    let res = client.get(srv.url("/loans")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ids_and_bodies_are_bad_requests() {
    let srv = TestServer::spawn("http://127.0.0.1:9/installments".to_string()).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/loans/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["path"], "/loans/abc");

    let res = client
        .post(srv.url("/customers"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn customer_crud_round_trip() {
    let srv = TestServer::spawn("http://127.0.0.1:9/installments".to_string()).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/customers")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_error_shape(
        &res.json().await.unwrap(),
        404,
        "There is no consumers saved in the database",
        "/customers",
    );

    let id = create_customer(&client, &srv, "a").await;

    // Same cpf under a different email and rg.
    let mut dup = customer_body("b");
    dup["cpf"] = json!("cpf-a");
    let res = client
        .post(srv.url("/customers"))
        .json(&dup)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let mut invalid = customer_body("c");
    invalid["email"] = json!("not-an-email");
    let res = client
        .post(srv.url("/customers"))
        .json(&invalid)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Customer validation failed");

    let mut update = customer_body("a");
    update["name"] = json!("Maria");
    let res = client
        .put(srv.url(&format!("/customers/{id}")))
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Maria");
    assert_eq!(body["id"], id);

    let res = client
        .delete(srv.url(&format!("/customers/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let path = format!("/customers/{id}");
    let res = client.get(srv.url(&path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_error_shape(&res.json().await.unwrap(), 404, "Customer not found", &path);
}

fn address_body() -> Value {
    json!({
        "street": "Rua 9",
        "neighborhood": "Lauzane Paulista",
        "number": 583,
        "postalCode": "02442-090",
        "city": "São Paulo",
        "state": "SAO_PAULO"
    })
}

#[tokio::test]
async fn address_crud_lists_its_customers() {
    let srv = TestServer::spawn("http://127.0.0.1:9/installments".to_string()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/addresses"))
        .json(&address_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let address: Value = res.json().await.unwrap();
    assert_eq!(address["state"], "SAO_PAULO");
    assert_eq!(address["customers"], json!([]));
    let address_id = address["id"].as_i64().unwrap();

    let mut customer = customer_body("a");
    let mut reference = address_body();
    reference["id"] = json!(address_id);
    customer["address"] = reference;
    let res = client
        .post(srv.url("/customers"))
        .json(&customer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let customer_id = res.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let res = client
        .get(srv.url(&format!("/addresses/{address_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["customers"][0]["id"], customer_id);
    assert_eq!(body["customers"][0]["fullName"], "João da Silva");

    let mut update = address_body();
    update["state"] = json!("RIO_DE_JANEIRO");
    let res = client
        .put(srv.url(&format!("/addresses/{address_id}")))
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client
        .get(srv.url(&format!("/customers/{customer_id}")))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["address"]["state"], "RIO_DE_JANEIRO");

    let res = client
        .delete(srv.url(&format!("/addresses/{address_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let path = format!("/addresses/{address_id}");
    let res = client.get(srv.url(&path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_error_shape(&res.json().await.unwrap(), 404, "Address not found", &path);
}

#[tokio::test]
async fn invalid_address_is_a_bad_request() {
    let srv = TestServer::spawn("http://127.0.0.1:9/installments".to_string()).await;
    let client = reqwest::Client::new();

    let mut blank = address_body();
    blank["city"] = json!("  ");
    let res = client
        .post(srv.url("/addresses"))
        .json(&blank)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_error_shape(
        &res.json().await.unwrap(),
        400,
        "Address validation failed",
        "/addresses",
    );

    let mut unknown_state = address_body();
    unknown_state["state"] = json!("CALIFORNIA");
    let res = client
        .post(srv.url("/addresses"))
        .json(&unknown_state)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn loan_values_wider_than_their_columns_are_bad_requests() {
    let calculator = MockServer::start_async().await;
    let calc_mock = calculator
        .mock_async(|when, then| {
            when.method(POST).path("/installments");
            then.status(200).json_body(schedule(12));
        })
        .await;

    let srv = TestServer::spawn(calculator.url("/installments")).await;
    let client = reqwest::Client::new();
    let customer_id = create_customer(&client, &srv, "a").await;
    let path = format!("/customers/{customer_id}/loans");

    let mut fractional_cents = loan_body();
    fractional_cents["originalValue"] = json!("1000.005");
    let mut huge_rate = loan_body();
    huge_rate["interestRate"] = json!(1000);

    for body in [fractional_cents, huge_rate] {
        let res = client
            .post(srv.url(&path))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_error_shape(&res.json().await.unwrap(), 400, "Customer not found", &path);
    }
    calc_mock.assert_hits_async(0).await;
}
