//! Typed endpoint contracts, one module per API resource.

pub mod activity_logs;
pub mod auth;
pub mod customers;
pub mod environments;
pub mod licenses;
pub mod system;
pub mod users;
