use axum::Router;

pub mod addresses;
pub mod customers;
pub mod loans;
pub mod system;

/// Router for every business endpoint.
pub fn router() -> Router {
    Router::new()
        .merge(customers::router())
        .merge(addresses::router())
        .merge(loans::router())
}
