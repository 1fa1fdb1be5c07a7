//! API middleware.
//!
//! The only layer is the access logger; CORS comes from tower-http.

pub mod audit;
