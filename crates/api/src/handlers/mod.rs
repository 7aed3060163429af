//! HTTP request handlers, one module per resource.

pub mod agencies;
pub mod assignments;
pub mod auth;
pub mod points;
pub mod reports;
pub mod rewards;
