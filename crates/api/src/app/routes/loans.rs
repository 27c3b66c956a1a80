use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, OriginalUri, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use loanapi_core::{CustomerId, LoanId};
use loanapi_lending::LoanRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/customers/:id/loans", post(create_loan))
        .route("/loans", get(list_loans))
        .route("/loans/:id", get(get_loan).delete(delete_loan))
}

pub async fn create_loan(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    body: Result<Json<LoanRequest>, JsonRejection>,
) -> axum::response::Response {
    let path = uri.path();
    let customer_id: CustomerId = match errors::parse_id(&id, path) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(request) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection, path),
    };

    match services.loans.create(customer_id, request).await {
        Ok(loan) => (StatusCode::OK, Json(dto::LoanResponse::from(loan))).into_response(),
        Err(e) => errors::service_error_to_response(e, path),
    }
}

pub async fn list_loans(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
) -> axum::response::Response {
    match services.loans.find_all().await {
        Ok(loans) => (StatusCode::OK, Json(dto::loans_to_json(loans))).into_response(),
        Err(e) => errors::service_error_to_response(e, uri.path()),
    }
}

pub async fn get_loan(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> axum::response::Response {
    let path = uri.path();
    let loan_id: LoanId = match errors::parse_id(&id, path) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.loans.find_by_id(loan_id).await {
        Ok(loan) => (StatusCode::OK, Json(dto::LoanResponse::from(loan))).into_response(),
        Err(e) => errors::service_error_to_response(e, path),
    }
}

pub async fn delete_loan(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> axum::response::Response {
    let path = uri.path();
    let loan_id: LoanId = match errors::parse_id(&id, path) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.loans.delete(loan_id).await {
        Ok(deleted) => (StatusCode::OK, Json(deleted)).into_response(),
        Err(e) => errors::service_error_to_response(e, path),
    }
}
