use chrono::Utc;
use sqlx::SqlitePool;

pub async fn fetch_value(db: &SqlitePool, key: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT value FROM client_state WHERE key = ?1")
        .bind(key)
        .fetch_optional(db)
        .await
}

pub async fn upsert_value(db: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO client_state (key, value, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .bind(now)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn delete_values(db: &SqlitePool, keys: &[&str]) -> Result<u64, sqlx::Error> {
    let mut removed = 0;
    for key in keys {
        let result = sqlx::query("DELETE FROM client_state WHERE key = ?1")
            .bind(*key)
            .execute(db)
            .await?;
        removed += result.rows_affected();
    }
    Ok(removed)
}
