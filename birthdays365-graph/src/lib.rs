//! Microsoft Graph adapter for birthdays365.
//!
//! `GraphClient` implements the contact, calendar and event capabilities
//! from `birthdays365-core`; `Authenticator` obtains the access token it
//! needs.

pub mod auth;
pub mod client;
pub mod convert;
pub mod session;
pub mod types;

pub use auth::{Authenticator, Credentials};
pub use client::{DEFAULT_BASE_URL, GraphClient, UserTarget};
pub use session::Session;
