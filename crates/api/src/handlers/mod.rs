//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers delegate to the repositories in `crm_db` and map errors via
//! [`AppError`](crate::error::AppError).

pub mod contacts;
pub mod deals;
pub mod system;
