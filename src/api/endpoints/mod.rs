//! Endpoint handlers, one module per resource family.

pub mod cases;
pub mod catalog;
pub mod forms;
pub mod health;
pub mod insights;
pub mod organization;
pub mod reference;
pub mod reports;
pub mod teams;
