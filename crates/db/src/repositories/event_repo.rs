//! Repository for the `events` table and the `event_types` lookup.

use civitrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{EventRow, EventType};

/// Provides inserts for the durable event log.
pub struct EventRepo;

impl EventRepo {
    /// Resolve an event type name (e.g. `"report.completed"`) to its row.
    pub async fn get_event_type_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<EventType>, sqlx::Error> {
        sqlx::query_as::<_, EventType>("SELECT id, name FROM event_types WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Insert an event row, returning its ID.
    pub async fn insert(
        pool: &PgPool,
        event_type_id: DbId,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events \
                 (event_type_id, source_entity_type, source_entity_id, actor_user_id, payload) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(event_type_id)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor_user_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// Most recent events, newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<EventRow>, sqlx::Error> {
        sqlx::query_as::<_, EventRow>(
            "SELECT id, event_type_id, source_entity_type, source_entity_id, \
                    actor_user_id, payload, created_at \
             FROM events \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
