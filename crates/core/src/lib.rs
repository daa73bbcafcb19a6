//! Domain logic for the CRM backend.
//!
//! Everything in this crate is pure: identifier parsing, field normalization,
//! validation rules for contacts and deals, and the deal filter criteria.
//! Persistence lives in `crm-db`, HTTP wiring in `crm-api`.

pub mod contact;
pub mod deal;
pub mod error;
pub mod fields;
pub mod ids;
pub mod types;
