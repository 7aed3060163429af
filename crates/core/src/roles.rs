//! Well-known role name constants.
//!
//! These must match the values accepted by the `users.role` CHECK constraint.

pub const ROLE_CITIZEN: &str = "citizen";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_AGENCY_SUPERVISOR: &str = "agency_supervisor";
pub const ROLE_FIELD_WORKER: &str = "field_worker";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[
    ROLE_CITIZEN,
    ROLE_ADMIN,
    ROLE_AGENCY_SUPERVISOR,
    ROLE_FIELD_WORKER,
];
