//! Storefront API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! handlers) so integration tests and the binary entrypoint share them.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod images;
pub mod password;
pub mod query;
pub mod router;
pub mod routes;
pub mod state;
