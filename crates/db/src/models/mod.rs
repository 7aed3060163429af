//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the operations the API exposes

pub mod agency;
pub mod assignment;
pub mod event;
pub mod execution_record;
pub mod points;
pub mod report;
pub mod reward;
pub mod user;
pub mod voucher;
