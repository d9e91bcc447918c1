//! Operations console for customers, Odoo environments, license keys,
//! users and activity logs, driven against the operations REST API.

pub mod api;
pub mod api_models;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod interaction;
pub mod middleware;
pub mod models;
pub mod view;

pub use client::ApiClient;
pub use config::Config;
pub use error::{ApiError, AuthError, ConsoleError};
pub use middleware::ConsoleState;
