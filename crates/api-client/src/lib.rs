//! # Pharm Assist API client
//!
//! Typed access to the Pharm Assist HTTP API.
//!
//! - [`client::HttpClient`] sends one request, injects the session's bearer token and
//!   negotiates JSON against binary bodies
//! - [`endpoints::PharmApi`] exposes one method per endpoint
//! - [`session::Session`] holds the login and broadcasts sign-in and logout

pub mod client;
pub mod endpoints;
pub mod error;
pub mod session;

#[cfg(test)]
mod testing;

pub use client::{ApiBody, Download, HttpClient};
pub use endpoints::PharmApi;
pub use error::{ApiError, ApiResult, BodyKind, SessionError, SessionResult};
pub use session::{Session, SessionState, SessionStore};
