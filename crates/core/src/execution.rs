//! Execution record kind constants and validation.
//!
//! Field workers log execution records against an assignment. A `progress`
//! record leaves the assignment status unchanged; a `final` record moves it
//! into agency verification. Records are append-only.

/// An intermediate progress update.
pub const KIND_PROGRESS: &str = "progress";

/// The closing record: the most recent `final` record is authoritative for
/// closing the assignment.
pub const KIND_FINAL: &str = "final";

/// All valid execution record kinds.
pub const VALID_KINDS: &[&str] = &[KIND_PROGRESS, KIND_FINAL];

/// Validate that a record kind string is one of the accepted values.
pub fn validate_kind(kind: &str) -> Result<(), String> {
    if VALID_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(format!(
            "Invalid record kind '{kind}'. Must be one of: {}",
            VALID_KINDS.join(", ")
        ))
    }
}

/// Validate that a revision request carries notes for the field worker.
pub fn validate_revision_notes(notes: &str) -> Result<(), String> {
    if notes.trim().is_empty() {
        Err("Returning an assignment for revision requires notes".to_string())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_kinds_accepted() {
        assert!(validate_kind(KIND_PROGRESS).is_ok());
        assert!(validate_kind(KIND_FINAL).is_ok());
    }

    #[test]
    fn invalid_kind_rejected() {
        let result = validate_kind("draft");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid record kind"));
        assert!(validate_kind("").is_err());
    }

    #[test]
    fn revision_notes_must_not_be_blank() {
        assert!(validate_revision_notes("repaint the east wall").is_ok());
        assert!(validate_revision_notes("").is_err());
        assert!(validate_revision_notes("   ").is_err());
    }
}
