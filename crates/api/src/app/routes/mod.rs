use axum::{Router, routing::get};

pub mod accounting;
pub mod lab;
pub mod session;
pub mod system;

/// Protected route tree (mounted behind the authn + policy layers).
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(session::whoami))
        .merge(lab::router())
        .merge(accounting::router())
}
