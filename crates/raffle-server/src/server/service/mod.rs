//! HTTP service exposing draws as JSON endpoints.
//!
//! ## Structure
//!
//! - [`routes`] - the axum [`Router`](axum::Router).
//! - [`handler`] - request validation and calls into [`raffle::DrawManager`].
//! - [`envelope`] - the `{ status, code, message, data }` response body.
//! - [`error`] - mapping of failures to HTTP statuses.
//! - [`state`] - shared state and catalog loading.
//! - [`store`] - runtime selection between the memory and Redis stores.

pub mod envelope;
pub mod error;
pub mod handler;
pub mod routes;
pub mod state;
pub mod store;
