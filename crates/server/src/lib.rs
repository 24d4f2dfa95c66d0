//! HTTP transport for the knowledge hub.

pub mod app;
pub mod error;
pub mod extract;
pub mod routes;

#[cfg(test)]
mod tests;

pub use app::{build_app, serve, AppState};
pub use error::ApiError;
