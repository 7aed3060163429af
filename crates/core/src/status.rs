//! Status enums and the authoritative transition tables for reports,
//! assignments, and vouchers.
//!
//! Each enum variant's discriminant matches the seed data order (1-based) in
//! the corresponding `*_statuses` database lookup table. Every legal edge
//! lives in exactly one `can_transition_to` function, and anything not listed
//! is rejected; handler pre-checks and the repositories' SQL guards both
//! derive from these tables rather than re-encoding edges by hand.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// A status transition that is not a legal edge in the state machine.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("illegal {entity} transition: {from} -> {to}")]
pub struct IllegalTransition {
    pub entity: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr, $label:expr );+ $(;)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant, in seed order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Human-readable name matching the lookup table seed data.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }

            /// Look a status up by its database ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Report lifecycle status.
    ReportStatus {
        Submitted = 1, "submitted";
        AwaitingVerification = 2, "awaiting_verification";
        Routed = 3, "routed";
        InProgress = 4, "in_progress";
        AwaitingFinalApproval = 5, "awaiting_final_approval";
        Completed = 6, "completed";
        Rejected = 7, "rejected";
    }
}

define_status_enum! {
    /// Assignment sub-workflow status.
    AssignmentStatus {
        AwaitingAssignment = 1, "awaiting_assignment";
        Assigned = 2, "assigned";
        InProgress = 3, "in_progress";
        PendingAgencyVerification = 4, "pending_agency_verification";
        PendingCentralVerification = 5, "pending_central_verification";
        Complete = 6, "complete";
        Cancelled = 7, "cancelled";
    }
}

define_status_enum! {
    /// Redemption voucher status.
    VoucherStatus {
        Unused = 1, "unused";
        Used = 2, "used";
    }
}

impl ReportStatus {
    /// Whether this report status is terminal (no further transitions).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// Database IDs of the terminal statuses, for SQL `ANY` guards.
    pub fn terminal_ids() -> Vec<StatusId> {
        Self::ALL
            .iter()
            .copied()
            .filter(|s| s.is_terminal())
            .map(Self::id)
            .collect()
    }

    /// Whether the edge `self -> to` is legal.
    ///
    /// `Rejected` is reachable from any non-terminal state (explicit admin
    /// action with a mandatory reason). Everything else moves strictly
    /// forward along the lifecycle.
    pub fn can_transition_to(self, to: Self) -> bool {
        if to == Self::Rejected {
            return !self.is_terminal();
        }
        matches!(
            (self, to),
            (Self::Submitted, Self::AwaitingVerification)
                | (Self::AwaitingVerification, Self::Routed)
                | (Self::Routed, Self::InProgress)
                | (Self::InProgress, Self::AwaitingFinalApproval)
                | (Self::AwaitingFinalApproval, Self::Completed)
        )
    }

    /// Check an edge, returning a typed error for illegal transitions.
    pub fn transition_to(self, to: Self) -> Result<Self, IllegalTransition> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(IllegalTransition {
                entity: "report",
                from: self.name(),
                to: to.name(),
            })
        }
    }
}

impl AssignmentStatus {
    /// Whether this assignment status is terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled)
    }

    /// Database IDs of the terminal statuses, for SQL `ANY` guards.
    pub fn terminal_ids() -> Vec<StatusId> {
        Self::ALL
            .iter()
            .copied()
            .filter(|s| s.is_terminal())
            .map(Self::id)
            .collect()
    }

    /// Whether the edge `self -> to` is legal.
    ///
    /// The only backward edge is `PendingAgencyVerification -> InProgress`
    /// (revision requested by the agency supervisor, notes mandatory).
    /// `Complete` is reachable only from `PendingCentralVerification` and is
    /// applied report-scoped by the admin's central approval, never by the
    /// assignment itself. `Cancelled` is likewise report-scoped: rejecting
    /// the parent report cancels every assignment that has not finished.
    pub fn can_transition_to(self, to: Self) -> bool {
        if to == Self::Cancelled {
            return !self.is_terminal();
        }
        matches!(
            (self, to),
            (Self::AwaitingAssignment, Self::Assigned)
                | (Self::Assigned, Self::InProgress)
                | (Self::InProgress, Self::PendingAgencyVerification)
                | (Self::PendingAgencyVerification, Self::PendingCentralVerification)
                | (Self::PendingAgencyVerification, Self::InProgress)
                | (Self::PendingCentralVerification, Self::Complete)
        )
    }

    /// Check an edge, returning a typed error for illegal transitions.
    pub fn transition_to(self, to: Self) -> Result<Self, IllegalTransition> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(IllegalTransition {
                entity: "assignment",
                from: self.name(),
                to: to.name(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Report urgency
// ---------------------------------------------------------------------------

pub const URGENCY_LOW: &str = "low";
pub const URGENCY_MEDIUM: &str = "medium";
pub const URGENCY_HIGH: &str = "high";

/// All valid urgency values for a report.
pub const VALID_URGENCIES: &[&str] = &[URGENCY_LOW, URGENCY_MEDIUM, URGENCY_HIGH];

/// Validate that an urgency string is one of the accepted values.
pub fn validate_urgency(urgency: &str) -> Result<(), String> {
    if VALID_URGENCIES.contains(&urgency) {
        Ok(())
    } else {
        Err(format!(
            "Invalid urgency '{urgency}'. Must be one of: {}",
            VALID_URGENCIES.join(", ")
        ))
    }
}
