//! Port traits implemented by adapters.

pub mod auth_port;
pub mod config_port;
pub mod report_port;
pub mod store_port;
