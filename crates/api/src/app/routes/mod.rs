use axum::Router;

pub mod parts;
pub mod system;

/// Router for all domain endpoints.
pub fn router() -> Router {
    Router::new().nest("/parts", parts::router())
}
