use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::AppResult;

/// One row reported by `PRAGMA foreign_key_check`.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ForeignKeyViolation {
    pub table: String,
    pub rowid: Option<i64>,
    pub parent: String,
    pub fkid: i64,
}

pub async fn foreign_keys_enabled(pool: &SqlitePool) -> AppResult<bool> {
    let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(pool)
        .await?;
    Ok(enabled == 1)
}

pub async fn foreign_key_violations(pool: &SqlitePool) -> AppResult<Vec<ForeignKeyViolation>> {
    let rows = sqlx::query_as::<_, ForeignKeyViolation>("PRAGMA foreign_key_check")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Items whose `order_id` does not resolve to an order.
pub async fn orphaned_item_count(pool: &SqlitePool) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM items
        LEFT JOIN orders ON orders.id = items.order_id
        WHERE orders.id IS NULL
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
