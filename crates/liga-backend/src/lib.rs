// Clients for the hosted auth and data services behind the league app.

pub mod api;
pub mod auth;
pub mod error;
pub mod http;
pub mod memory;
pub mod rest;
pub mod store;

#[cfg(test)]
mod testing;

pub use api::{AuthApi, AuthEvent, LeagueStore};
pub use auth::AuthClient;
pub use error::BackendError;
pub use http::Endpoint;
pub use rest::{Query, RestClient};
pub use store::RestStore;
