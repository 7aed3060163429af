//! Routing advisor policy: turn a classifier result into a routing decision.
//!
//! The external text classifier proposes candidate agencies with confidence
//! scores; this module applies the confidence-threshold policy. A low or
//! missing suggestion is a first-class outcome (manual admin triage), never
//! an error.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Default minimum confidence for auto-suggesting an agency.
pub const DEFAULT_CONFIDENCE_THRESHOLD: i16 = 70;

/// How the routing suggestion on a report was decided.
///
/// Stored on the report's `decision_source` column; set once at creation,
/// never overwritten. Admin overrides are visible by comparing the created
/// assignments against the stored suggestion.
pub const DECISION_SOURCE_AI_AUTO: &str = "ai_auto";
pub const DECISION_SOURCE_MANUAL_REVIEW: &str = "manual_review";

/// One candidate agency proposed by the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierCandidate {
    pub agency_id: DbId,
    /// Confidence in [0, 100].
    pub confidence: i16,
}

/// Raw output of the external text classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierOutput {
    /// Candidates ordered by descending confidence.
    pub candidates: Vec<ClassifierCandidate>,
    /// Human-readable reasoning strings.
    pub reasoning: Vec<String>,
}

impl ClassifierOutput {
    /// The degraded "no suggestion" output used when the classifier fails.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            reasoning: vec![reason.into()],
        }
    }
}

/// Outcome of applying the threshold policy to a classifier output.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingDecision {
    /// The primary candidate cleared the threshold; suggest it to the admin.
    Suggested {
        primary: DbId,
        related: Vec<DbId>,
        confidence: i16,
    },
    /// No candidate, or confidence below threshold: queue for manual triage.
    ManualReview,
}

impl RoutingDecision {
    /// The `decision_source` value recorded for this decision.
    pub fn source(&self) -> &'static str {
        match self {
            Self::Suggested { .. } => DECISION_SOURCE_AI_AUTO,
            Self::ManualReview => DECISION_SOURCE_MANUAL_REVIEW,
        }
    }
}

/// Apply the confidence-threshold policy to a classifier output.
///
/// Candidates are sorted by confidence here rather than trusting classifier
/// ordering. Confidence values outside [0, 100] are clamped.
pub fn decide(output: &ClassifierOutput, threshold: i16) -> RoutingDecision {
    let mut candidates: Vec<ClassifierCandidate> = output
        .candidates
        .iter()
        .map(|c| ClassifierCandidate {
            agency_id: c.agency_id,
            confidence: c.confidence.clamp(0, 100),
        })
        .collect();
    candidates.sort_by(|a, b| b.confidence.cmp(&a.confidence));

    match candidates.first() {
        Some(primary) if primary.confidence >= threshold => RoutingDecision::Suggested {
            primary: primary.agency_id,
            related: candidates.iter().skip(1).map(|c| c.agency_id).collect(),
            confidence: primary.confidence,
        },
        _ => RoutingDecision::ManualReview,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn output(pairs: &[(DbId, i16)]) -> ClassifierOutput {
        ClassifierOutput {
            candidates: pairs
                .iter()
                .map(|&(agency_id, confidence)| ClassifierCandidate {
                    agency_id,
                    confidence,
                })
                .collect(),
            reasoning: vec!["test".into()],
        }
    }

    #[test]
    fn confident_primary_is_suggested() {
        let decision = decide(&output(&[(1, 85), (2, 40)]), DEFAULT_CONFIDENCE_THRESHOLD);
        assert_matches!(
            decision,
            RoutingDecision::Suggested { primary: 1, confidence: 85, ref related } if related == &[2]
        );
    }

    #[test]
    fn below_threshold_yields_manual_review() {
        let decision = decide(&output(&[(1, 69)]), DEFAULT_CONFIDENCE_THRESHOLD);
        assert_eq!(decision, RoutingDecision::ManualReview);
    }

    #[test]
    fn exactly_at_threshold_is_suggested() {
        let decision = decide(&output(&[(1, 70)]), DEFAULT_CONFIDENCE_THRESHOLD);
        assert_matches!(decision, RoutingDecision::Suggested { primary: 1, .. });
    }

    #[test]
    fn empty_candidates_yield_manual_review() {
        let decision = decide(&ClassifierOutput::default(), DEFAULT_CONFIDENCE_THRESHOLD);
        assert_eq!(decision, RoutingDecision::ManualReview);
    }

    #[test]
    fn unsorted_classifier_output_is_resorted() {
        let decision = decide(&output(&[(2, 40), (1, 90)]), DEFAULT_CONFIDENCE_THRESHOLD);
        assert_matches!(decision, RoutingDecision::Suggested { primary: 1, .. });
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        let decision = decide(&output(&[(1, 120)]), DEFAULT_CONFIDENCE_THRESHOLD);
        assert_matches!(decision, RoutingDecision::Suggested { confidence: 100, .. });

        let decision = decide(&output(&[(1, -5)]), DEFAULT_CONFIDENCE_THRESHOLD);
        assert_eq!(decision, RoutingDecision::ManualReview);
    }

    #[test]
    fn degraded_output_carries_reasoning() {
        let out = ClassifierOutput::degraded("classifier unreachable");
        assert!(out.candidates.is_empty());
        assert_eq!(out.reasoning, vec!["classifier unreachable".to_string()]);
        assert_eq!(
            decide(&out, DEFAULT_CONFIDENCE_THRESHOLD),
            RoutingDecision::ManualReview
        );
    }

    #[test]
    fn decision_source_names() {
        assert_eq!(
            decide(&output(&[(1, 85)]), 70).source(),
            DECISION_SOURCE_AI_AUTO
        );
        assert_eq!(
            RoutingDecision::ManualReview.source(),
            DECISION_SOURCE_MANUAL_REVIEW
        );
    }
}
