use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, OriginalUri, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use loanapi_core::CustomerId;
use loanapi_lending::CustomerRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/customers", post(create_customer).get(list_customers))
        .route(
            "/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<CustomerRequest>, JsonRejection>,
) -> axum::response::Response {
    let path = uri.path();
    let Json(request) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection, path),
    };

    match services.customers.create(request).await {
        Ok(customer) => (
            StatusCode::CREATED,
            Json(dto::CustomerResponse::from(customer)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e, path),
    }
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
) -> axum::response::Response {
    match services.customers.find_all().await {
        Ok(customers) => (StatusCode::OK, Json(dto::customers_to_json(customers))).into_response(),
        Err(e) => errors::service_error_to_response(e, uri.path()),
    }
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> axum::response::Response {
    let path = uri.path();
    let customer_id: CustomerId = match errors::parse_id(&id, path) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.customers.find_by_id(customer_id).await {
        Ok(customer) => {
            (StatusCode::OK, Json(dto::CustomerResponse::from(customer))).into_response()
        }
        Err(e) => errors::service_error_to_response(e, path),
    }
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    body: Result<Json<CustomerRequest>, JsonRejection>,
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

    match services.customers.update(customer_id, request).await {
        Ok(customer) => {
            (StatusCode::OK, Json(dto::CustomerResponse::from(customer))).into_response()
        }
        Err(e) => errors::service_error_to_response(e, path),
    }
}

pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> axum::response::Response {
    let path = uri.path();
    let customer_id: CustomerId = match errors::parse_id(&id, path) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.customers.delete(customer_id).await {
        Ok(deleted) => (StatusCode::OK, Json(deleted)).into_response(),
        Err(e) => errors::service_error_to_response(e, path),
    }
}
