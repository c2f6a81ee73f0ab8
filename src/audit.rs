use serde_json::Value;
use uuid::Uuid;

use crate::db::DbPool;

/// Append an entry to `audit_logs`.
///
/// Failures are logged and swallowed: the business write has already
/// committed by the time this runs.
pub async fn record(pool: &DbPool, user_id: Uuid, action: &str, resource: &str, metadata: Value) {
    let result = sqlx::query(
        "INSERT INTO audit_logs (user_id, action, resource, metadata) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await;

    if let Err(err) = result {
        tracing::warn!(error = %err, action, resource, "audit log failed");
    }
}
