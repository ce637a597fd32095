//! Metadata Repository

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use crate::db::models::{MetadataRecord, MetadataStats, NewMetadataRecord};
use crate::utils::time::now_millis;

const METADATA_SELECT: &str = "SELECT id, type, timestamp, traffic_light_id, sensor_count, stage, created_at FROM metadata_index";

/// Append one metadata row. Always an insert — replays of the same composite
/// key produce a second row, they do not upsert.
pub async fn insert(pool: &SqlitePool, data: NewMetadataRecord) -> RepoResult<MetadataRecord> {
    let now = now_millis();
    let result = sqlx::query(
        "INSERT INTO metadata_index (type, timestamp, traffic_light_id, sensor_count, stage, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(&data.kind)
    .bind(data.timestamp)
    .bind(&data.traffic_light_id)
    .bind(data.sensor_count)
    .bind(&data.stage)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| RepoError::Database("Failed to insert metadata record".into()))
}

/// Find a row by its rowid
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MetadataRecord>> {
    let sql = format!("{METADATA_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, MetadataRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// All rows for one traffic light, newest batch instant first
pub async fn find_by_traffic_light(
    pool: &SqlitePool,
    traffic_light_id: &str,
    limit: i64,
) -> RepoResult<Vec<MetadataRecord>> {
    let sql = format!(
        "{METADATA_SELECT} WHERE traffic_light_id = ? ORDER BY timestamp DESC, id DESC LIMIT ?"
    );
    let rows = sqlx::query_as::<_, MetadataRecord>(&sql)
        .bind(traffic_light_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// All rows of one kind ("data" / "optimization"), newest batch instant first
pub async fn find_by_kind(
    pool: &SqlitePool,
    kind: &str,
    limit: i64,
) -> RepoResult<Vec<MetadataRecord>> {
    let sql = format!("{METADATA_SELECT} WHERE type = ? ORDER BY timestamp DESC, id DESC LIMIT ?");
    let rows = sqlx::query_as::<_, MetadataRecord>(&sql)
        .bind(kind)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Most recently created rows first
pub async fn find_recent(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<MetadataRecord>> {
    let sql = format!("{METADATA_SELECT} ORDER BY created_at DESC, id DESC LIMIT ?");
    let rows = sqlx::query_as::<_, MetadataRecord>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Aggregate counts by kind plus distinct traffic lights
pub async fn stats(pool: &SqlitePool) -> RepoResult<MetadataStats> {
    let stats = sqlx::query_as::<_, MetadataStats>(
        "SELECT COUNT(*) AS total_entries, \
         (SELECT COUNT(*) FROM metadata_index WHERE type = 'data') AS data_entries, \
         (SELECT COUNT(*) FROM metadata_index WHERE type = 'optimization') AS optimization_entries, \
         (SELECT COUNT(DISTINCT traffic_light_id) FROM metadata_index) AS unique_traffic_lights \
         FROM metadata_index",
    )
    .fetch_one(pool)
    .await?;
    Ok(stats)
}

/// Delete every row for one traffic light, returning the count removed.
/// Idempotent: a second call reports zero and does not error.
pub async fn delete_by_traffic_light(pool: &SqlitePool, traffic_light_id: &str) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM metadata_index WHERE traffic_light_id = ?")
        .bind(traffic_light_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        // Single never-reaped connection: each pooled connection would
        // otherwise open its own empty in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn record(kind: &str, timestamp: i64, tls: &str) -> NewMetadataRecord {
        NewMetadataRecord {
            kind: kind.to_string(),
            timestamp,
            traffic_light_id: tls.to_string(),
            sensor_count: 1,
            stage: "uploaded".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_round_trips() {
        let pool = test_pool().await;

        let row = insert(&pool, record("data", 1747664400, "21")).await.unwrap();

        assert!(row.id > 0);
        assert_eq!(row.kind, "data");
        assert_eq!(row.traffic_light_id, "21");
        assert_eq!(row.stage, "uploaded");

        let found = find_by_id(&pool, row.id).await.unwrap().unwrap();
        assert_eq!(found, row);
    }

    #[tokio::test]
    async fn insert_is_append_not_upsert() {
        let pool = test_pool().await;

        insert(&pool, record("data", 1747664400, "21")).await.unwrap();
        insert(&pool, record("data", 1747664400, "21")).await.unwrap();

        let rows = find_by_traffic_light(&pool, "21", 10).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn lookups_filter_and_order() {
        let pool = test_pool().await;
        insert(&pool, record("data", 100, "21")).await.unwrap();
        insert(&pool, record("optimization", 200, "21")).await.unwrap();
        insert(&pool, record("data", 300, "7")).await.unwrap();

        let by_light = find_by_traffic_light(&pool, "21", 10).await.unwrap();
        assert_eq!(by_light.len(), 2);
        assert_eq!(by_light[0].timestamp, 200);

        let by_kind = find_by_kind(&pool, "data", 10).await.unwrap();
        assert_eq!(by_kind.len(), 2);
        assert!(by_kind.iter().all(|r| r.kind == "data"));

        let recent = find_recent(&pool, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        // Same-millisecond inserts fall back to rowid order
        assert_eq!(recent[0].timestamp, 300);
    }

    #[tokio::test]
    async fn stats_counts_by_kind_and_light() {
        let pool = test_pool().await;
        insert(&pool, record("data", 100, "21")).await.unwrap();
        insert(&pool, record("optimization", 100, "21")).await.unwrap();
        insert(&pool, record("data", 200, "7")).await.unwrap();

        let s = stats(&pool).await.unwrap();
        assert_eq!(s.total_entries, 3);
        assert_eq!(s.data_entries, 2);
        assert_eq!(s.optimization_entries, 1);
        assert_eq!(s.unique_traffic_lights, 2);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let pool = test_pool().await;
        insert(&pool, record("data", 100, "21")).await.unwrap();
        insert(&pool, record("optimization", 100, "21")).await.unwrap();

        assert_eq!(delete_by_traffic_light(&pool, "21").await.unwrap(), 2);
        assert_eq!(delete_by_traffic_light(&pool, "21").await.unwrap(), 0);
    }
}
