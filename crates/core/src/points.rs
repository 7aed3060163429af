//! Points ledger reason constants.
//!
//! Every balance-affecting record is an immutable signed ledger entry; a
//! citizen's balance is always the sum of their entries. These reason values
//! must match the `points_ledger.reason` CHECK constraint.

/// Credit issued when a citizen's report reaches `completed`.
pub const REASON_REPORT_COMPLETION: &str = "report_completion_reward";

/// Debit applied when a citizen redeems a reward item.
pub const REASON_REDEMPTION_DEBIT: &str = "redemption_debit";

/// Default points credited for a completed report, overridable via
/// `COMPLETION_REWARD_POINTS`.
pub const DEFAULT_COMPLETION_REWARD: i64 = 50;
