//! # scenehub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the JSON API for scene CRUD and start requests (`/api/scenes`)
//! - Relay bus events to clients as Server-Sent Events (`/api/events/stream`)
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `scenehub-app` (for ports and services) and `scenehub-domain`
//! (for request/response mapping). Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;
