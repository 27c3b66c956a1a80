use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, OriginalUri, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use loanapi_core::AddressId;
use loanapi_infra::services::ServiceError;
use loanapi_lending::{Address, AddressRequest};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/addresses", post(create_address).get(list_addresses))
        .route(
            "/addresses/:id",
            get(get_address).put(update_address).delete(delete_address),
        )
}

async fn with_residents(
    services: &AppServices,
    address: Address,
) -> Result<dto::AddressResponse, ServiceError> {
    let residents = match address.id {
        Some(id) => services.addresses.residents(id).await?,
        None => Vec::new(),
    };
    Ok(dto::AddressResponse::new(address, &residents))
}

pub async fn create_address(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<AddressRequest>, JsonRejection>,
) -> axum::response::Response {
    let path = uri.path();
    let Json(request) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection, path),
    };

    match services.addresses.create(request).await {
        Ok(address) => (
            StatusCode::CREATED,
            Json(dto::AddressResponse::new(address, &[])),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e, path),
    }
}

pub async fn list_addresses(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
) -> axum::response::Response {
    let path = uri.path();
    let addresses = match services.addresses.find_all().await {
        Ok(addresses) => addresses,
        Err(e) => return errors::service_error_to_response(e, path),
    };

    let mut out = Vec::with_capacity(addresses.len());
    for address in addresses {
        match with_residents(&services, address).await {
            Ok(response) => out.push(response),
            Err(e) => return errors::service_error_to_response(e, path),
        }
    }
    (StatusCode::OK, Json(out)).into_response()
}

pub async fn get_address(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> axum::response::Response {
    let path = uri.path();
    let address_id: AddressId = match errors::parse_id(&id, path) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let found = match services.addresses.find_by_id(address_id).await {
        Ok(address) => with_residents(&services, address).await,
        Err(e) => Err(e),
    };
    match found {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => errors::service_error_to_response(e, path),
    }
}

pub async fn update_address(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    body: Result<Json<AddressRequest>, JsonRejection>,
) -> axum::response::Response {
    let path = uri.path();
    let address_id: AddressId = match errors::parse_id(&id, path) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(request) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection, path),
    };

    let updated = match services.addresses.update(address_id, request).await {
        Ok(address) => with_residents(&services, address).await,
        Err(e) => Err(e),
    };
    match updated {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => errors::service_error_to_response(e, path),
    }
}

pub async fn delete_address(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> axum::response::Response {
    let path = uri.path();
    let address_id: AddressId = match errors::parse_id(&id, path) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.addresses.delete(address_id).await {
        Ok(deleted) => (StatusCode::OK, Json(deleted)).into_response(),
        Err(e) => errors::service_error_to_response(e, path),
    }
}
