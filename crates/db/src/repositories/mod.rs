//! Repository structs, one per table.
//!
//! Repositories are unit structs with associated async functions over
//! `&PgPool`. Status updates use compare-and-set guards (`WHERE status_id =
//! expected`) so racing or illegal transitions affect zero rows instead of
//! corrupting state.

pub mod agency_repo;
pub mod assignment_repo;
pub mod event_repo;
pub mod execution_record_repo;
pub mod points_repo;
pub mod redemption_repo;
pub mod report_repo;
pub mod reward_repo;
pub mod user_repo;

pub use agency_repo::AgencyRepo;
pub use assignment_repo::AssignmentRepo;
pub use event_repo::EventRepo;
pub use execution_record_repo::ExecutionRecordRepo;
pub use points_repo::PointsRepo;
pub use redemption_repo::{RedeemError, RedemptionRepo, ValidateError};
pub use report_repo::ReportRepo;
pub use reward_repo::RewardRepo;
pub use user_repo::UserRepo;
