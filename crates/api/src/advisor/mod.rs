//! Routing advisor: obtains agency suggestions for incoming reports.
//!
//! The advisor calls an external text classifier over HTTP and applies the
//! confidence-threshold policy from `civitrack_core::routing`. Classifier
//! failure of any kind (not configured, timeout, bad response) degrades into
//! a manual-review suggestion; report submission never fails because of the
//! classifier.

use std::time::Duration;

use async_trait::async_trait;
use civitrack_core::routing::{decide, ClassifierOutput, RoutingDecision};
use civitrack_db::models::agency::Agency;
use civitrack_db::models::report::SubmitReport;
use serde::Serialize;

/// Default timeout for a single classifier request.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Error type for classifier calls.
///
/// Callers never surface this to the HTTP client; it is logged and folded
/// into a degraded [`ClassifierOutput`].
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("classifier returned HTTP {0}")]
    HttpStatus(u16),
}

/// Configuration for the external classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Classifier endpoint; `None` disables classification entirely.
    pub url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Minimum confidence for an auto suggestion.
    pub confidence_threshold: i16,
}

impl ClassifierConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                        | Default |
    /// |--------------------------------|---------|
    /// | `CLASSIFIER_URL`               | unset   |
    /// | `CLASSIFIER_TIMEOUT_SECS`      | `5`     |
    /// | `ROUTING_CONFIDENCE_THRESHOLD` | `70`    |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("CLASSIFIER_URL").ok(),
            timeout_secs: std::env::var("CLASSIFIER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            confidence_threshold: std::env::var("ROUTING_CONFIDENCE_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(civitrack_core::routing::DEFAULT_CONFIDENCE_THRESHOLD),
        }
    }

    /// A disabled classifier (no URL): every suggestion degrades to manual
    /// review. Used by tests.
    pub fn disabled() -> Self {
        Self {
            url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            confidence_threshold: civitrack_core::routing::DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Request payload sent to the classifier endpoint.
#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    title: &'a str,
    description: &'a str,
    category: &'a str,
    agencies: Vec<AgencyRef<'a>>,
}

#[derive(Debug, Serialize)]
struct AgencyRef<'a> {
    id: civitrack_core::types::DbId,
    name: &'a str,
    category: &'a str,
}

/// A collaborator that proposes candidate agencies for a report.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        submission: &SubmitReport,
        agencies: &[Agency],
    ) -> Result<ClassifierOutput, ClassifierError>;
}

/// HTTP classifier client (reqwest) with a bounded per-request timeout.
pub struct HttpClassifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            url: config.url.clone(),
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        submission: &SubmitReport,
        agencies: &[Agency],
    ) -> Result<ClassifierOutput, ClassifierError> {
        let url = self.url.as_deref().ok_or(ClassifierError::NotConfigured)?;

        let payload = ClassifyRequest {
            title: &submission.title,
            description: &submission.description,
            category: &submission.category,
            agencies: agencies
                .iter()
                .map(|a| AgencyRef {
                    id: a.id,
                    name: &a.name,
                    category: &a.category,
                })
                .collect(),
        };

        let response = self.client.post(url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(ClassifierError::HttpStatus(response.status().as_u16()));
        }

        Ok(response.json::<ClassifierOutput>().await?)
    }
}

/// Applies the threshold policy on top of a [`Classifier`].
pub struct RoutingAdvisor {
    classifier: Box<dyn Classifier>,
    threshold: i16,
}

impl RoutingAdvisor {
    pub fn new(classifier: Box<dyn Classifier>, threshold: i16) -> Self {
        Self {
            classifier,
            threshold,
        }
    }

    /// Build an advisor backed by the HTTP classifier from config.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(
            Box::new(HttpClassifier::new(config)),
            config.confidence_threshold,
        )
    }

    /// Obtain a routing suggestion for a submission.
    ///
    /// Returns the decision plus the raw classifier output whose reasoning
    /// is stored on the report. Never fails: classifier errors degrade to
    /// manual review.
    pub async fn suggest(
        &self,
        submission: &SubmitReport,
        agencies: &[Agency],
    ) -> (RoutingDecision, ClassifierOutput) {
        let output = match self.classifier.classify(submission, agencies).await {
            Ok(output) => output,
            Err(ClassifierError::NotConfigured) => {
                ClassifierOutput::degraded("classifier not configured")
            }
            Err(e) => {
                tracing::warn!(error = %e, "Classifier call failed, degrading to manual review");
                ClassifierOutput::degraded(format!("classifier unavailable: {e}"))
            }
        };

        (decide(&output, self.threshold), output)
    }
}
