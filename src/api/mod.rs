//! HTTP API.
//!
//! Exposes the booking, organization, insight and report operations as
//! JSON endpoints. Routes are nested under `/api/`; writes take an
//! optional `X-Actor` header for the audit columns.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ApiServer, ServerError};
pub use types::ApiContext;
