//! HTTP API layer for shelf.
//!
//! - **Endpoints**: accounts, reviews and votes, favorites, catalog lookups
//! - **Extractors**: authenticated user
//! - **Middleware**: application state and session resolution
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
