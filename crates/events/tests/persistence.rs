//! Integration tests for the durable event log: bus -> persistence -> table.

use civitrack_db::repositories::EventRepo;
use civitrack_events::bus::{EventBus, EVENT_REPORT_REJECTED, EVENT_REPORT_ROUTED};
use civitrack_events::{EventPersistence, PlatformEvent};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn published_events_are_written_to_the_log(pool: PgPool) {
    let bus = EventBus::default();
    let task = tokio::spawn(EventPersistence::run(pool.clone(), bus.subscribe()));

    bus.publish(
        PlatformEvent::new(EVENT_REPORT_ROUTED)
            .with_source("report", 7)
            .with_payload(json!({ "agency_ids": [1, 2] })),
    );
    bus.publish(
        PlatformEvent::new(EVENT_REPORT_REJECTED)
            .with_source("report", 7)
            .with_payload(json!({ "reason": "duplicate of #12" })),
    );

    // Dropping the bus closes the channel; the loop drains and exits.
    drop(bus);
    task.await.expect("persistence task");

    let rows = EventRepo::list_recent(&pool, 10).await.unwrap();
    assert_eq!(rows.len(), 2);

    // Newest first.
    let rejected_type = EventRepo::get_event_type_by_name(&pool, EVENT_REPORT_REJECTED)
        .await
        .unwrap()
        .expect("seeded event type");
    assert_eq!(rows[0].event_type_id, rejected_type.id);
    assert_eq!(rows[0].source_entity_type.as_deref(), Some("report"));
    assert_eq!(rows[0].source_entity_id, Some(7));
    assert_eq!(rows[0].actor_user_id, None);
    assert_eq!(rows[0].payload["reason"], "duplicate of #12");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_event_types_are_skipped_not_fatal(pool: PgPool) {
    let bus = EventBus::default();
    let task = tokio::spawn(EventPersistence::run(pool.clone(), bus.subscribe()));

    bus.publish(PlatformEvent::new("report.renamed_out_from_under_us"));
    bus.publish(PlatformEvent::new(EVENT_REPORT_ROUTED).with_source("report", 3));

    drop(bus);
    task.await.expect("persistence task");

    // The unknown type is logged and dropped; the loop keeps going.
    let rows = EventRepo::list_recent(&pool, 10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source_entity_id, Some(3));
}
