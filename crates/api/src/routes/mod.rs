pub mod agencies;
pub mod assignments;
pub mod auth;
pub mod health;
pub mod points;
pub mod reports;
pub mod rewards;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                      citizen self-registration (public)
/// /auth/login                         login (public)
///
/// /reports                            list (citizen: own, admin: all), submit (citizen)
/// /reports/{id}                       get
/// /reports/{id}/route                 verify + route to agencies (admin)
/// /reports/{id}/reject                reject with reason (admin)
/// /reports/{id}/approve               final approval + credit (admin)
/// /reports/{id}/assignments           list assignments of a report
///
/// /assignments                        list for own agency (supervisor)
/// /assignments/unassignable           stuck assignments (admin)
/// /assignments/{id}/assign            pick a field worker (supervisor)
/// /assignments/{id}/start             acknowledge start (worker)
/// /assignments/{id}/executions        log record (worker), list records
/// /assignments/{id}/approve           agency verification (supervisor)
/// /assignments/{id}/return            return for revision (supervisor)
///
/// /agencies                           list, create (admin)
/// /agencies/{id}/workers              active field workers, least-loaded first
///
/// /rewards                            list, create (admin)
/// /rewards/{id}/redeem                redeem for a voucher (citizen)
/// /rewards/{id}/restock               restock (admin)
///
/// /vouchers                           own vouchers (citizen)
/// /vouchers/validate                  mark used at the partner desk (staff)
///
/// /points/balance                     derived balance (citizen)
/// /points/ledger                      ledger history (citizen)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/reports", reports::router())
        .nest("/assignments", assignments::router())
        .nest("/agencies", agencies::router())
        .nest("/rewards", rewards::router())
        .nest("/vouchers", rewards::voucher_router())
        .nest("/points", points::router())
}
