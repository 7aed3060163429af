//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireCitizen`] -- Requires the `citizen` role.
//! - [`rbac::RequireSupervisor`] -- Requires the `agency_supervisor` role.
//! - [`rbac::RequireWorker`] -- Requires the `field_worker` role.
//! - [`rbac::RequireStaff`] -- Requires any agency-staff or admin role.

pub mod auth;
pub mod rbac;
