//! Event-to-notification dispatch.
//!
//! [`NotificationDispatcher`] subscribes to the platform event bus, resolves
//! the recipient for each event (the reporting citizen for report events,
//! the assigned field worker for assignment events), and hands off to the
//! SMTP delivery service. Delivery is strictly best-effort: failures are
//! logged at warn and never propagate into the state transitions that
//! produced the event.

use civitrack_db::repositories::{AssignmentRepo, ReportRepo, UserRepo};
use civitrack_db::DbPool;
use civitrack_events::bus::{
    EVENT_ASSIGNMENT_RETURNED, EVENT_REPORT_COMPLETED, EVENT_REPORT_REJECTED, EVENT_REPORT_ROUTED,
};
use civitrack_events::{EmailDelivery, PlatformEvent};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Routes platform events to recipient emails.
pub struct NotificationDispatcher {
    pool: DbPool,
    /// `None` when SMTP is not configured; events are then dropped silently.
    email: Option<EmailDelivery>,
}

impl NotificationDispatcher {
    pub fn new(pool: DbPool, email: Option<EmailDelivery>) -> Self {
        Self { pool, email }
    }

    /// Run the dispatch loop until the bus closes or `cancel` fires.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("Notification dispatcher cancelled");
                    break;
                }
                result = receiver.recv() => match result {
                    Ok(event) => self.dispatch(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Notification dispatcher lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, notification dispatcher shutting down");
                        break;
                    }
                },
            }
        }
    }

    /// Resolve the recipient and deliver one event. Best-effort throughout.
    async fn dispatch(&self, event: &PlatformEvent) {
        let Some(email) = &self.email else {
            tracing::debug!(event_type = %event.event_type, "SMTP not configured, skipping");
            return;
        };

        let recipient = match self.resolve_recipient(event).await {
            Ok(Some(address)) => address,
            Ok(None) => {
                tracing::debug!(event_type = %event.event_type, "No recipient for event");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, event_type = %event.event_type,
                    "Failed to resolve notification recipient");
                return;
            }
        };

        if let Err(e) = email.deliver(&recipient, event).await {
            tracing::warn!(error = %e, event_type = %event.event_type,
                "Notification email delivery failed");
        }
    }

    /// Who should hear about this event.
    async fn resolve_recipient(&self, event: &PlatformEvent) -> Result<Option<String>, sqlx::Error> {
        let Some(entity_id) = event.source_entity_id else {
            return Ok(None);
        };

        match event.event_type.as_str() {
            // Report lifecycle events go to the reporting citizen.
            EVENT_REPORT_ROUTED | EVENT_REPORT_COMPLETED | EVENT_REPORT_REJECTED => {
                let Some(report) = ReportRepo::find_by_id(&self.pool, entity_id).await? else {
                    return Ok(None);
                };
                let user = UserRepo::find_by_id(&self.pool, report.citizen_id).await?;
                Ok(user.map(|u| u.email))
            }
            // Revision requests go to the assigned field worker.
            EVENT_ASSIGNMENT_RETURNED => {
                let Some(assignment) = AssignmentRepo::find_by_id(&self.pool, entity_id).await?
                else {
                    return Ok(None);
                };
                let Some(worker_id) = assignment.worker_id else {
                    return Ok(None);
                };
                let user = UserRepo::find_by_id(&self.pool, worker_id).await?;
                Ok(user.map(|u| u.email))
            }
            _ => Ok(None),
        }
    }
}
