//! Repositories: one zero-sized struct per table with associated async fns
//! that take the pool explicitly.

pub mod contact_repo;
pub mod deal_repo;

pub use contact_repo::ContactRepo;
pub use deal_repo::DealRepo;
