use chrono::{DateTime, Utc};

use crate::types::Address;

/// Standard column list for Address queries.
/// Does not include the SELECT keyword or FROM clause.
/// Use with `concat!` for compile-time string composition:
/// ```ignore
/// concat!("SELECT ", address_columns!(), " FROM addresses WHERE id = ?")
/// ```
#[macro_export]
macro_rules! address_columns {
    () => {
        "id, label, latitude, longitude, created_at, updated_at"
    };
}

/// Insert an address and return the stored row
pub async fn insert(
    executor: impl sqlx::SqliteExecutor<'_>,
    label: &str,
    latitude: f64,
    longitude: f64,
    now: DateTime<Utc>,
) -> Result<Address, sqlx::Error> {
    sqlx::query_as::<_, Address>(concat!(
        r#"
        INSERT INTO addresses (label, latitude, longitude, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        RETURNING "#,
        address_columns!()
    ))
    .bind(label)
    .bind(latitude)
    .bind(longitude)
    .bind(now)
    .fetch_one(executor)
    .await
}

/// Get a single address by id
pub async fn get(
    executor: impl sqlx::SqliteExecutor<'_>,
    id: i64,
) -> Result<Option<Address>, sqlx::Error> {
    sqlx::query_as::<_, Address>(concat!(
        "SELECT ",
        address_columns!(),
        " FROM addresses WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Get a page of addresses ordered by id
pub async fn list(
    executor: impl sqlx::SqliteExecutor<'_>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Address>, sqlx::Error> {
    sqlx::query_as::<_, Address>(concat!(
        "SELECT ",
        address_columns!(),
        " FROM addresses ORDER BY id LIMIT ?1 OFFSET ?2"
    ))
    .bind(limit)
    .bind(skip)
    .fetch_all(executor)
    .await
}

/// Get every address
pub async fn all(executor: impl sqlx::SqliteExecutor<'_>) -> Result<Vec<Address>, sqlx::Error> {
    sqlx::query_as::<_, Address>(concat!(
        "SELECT ",
        address_columns!(),
        " FROM addresses ORDER BY id"
    ))
    .fetch_all(executor)
    .await
}

/// Write the mutable fields and `updated_at` of an existing row
pub async fn update(
    executor: impl sqlx::SqliteExecutor<'_>,
    address: &Address,
) -> Result<Option<Address>, sqlx::Error> {
    sqlx::query_as::<_, Address>(concat!(
        r#"
        UPDATE addresses
        SET label = ?2, latitude = ?3, longitude = ?4, updated_at = ?5
        WHERE id = ?1
        RETURNING "#,
        address_columns!()
    ))
    .bind(address.id)
    .bind(&address.label)
    .bind(address.latitude)
    .bind(address.longitude)
    .bind(address.updated_at)
    .fetch_optional(executor)
    .await
}

/// Delete an address. Returns whether a row was removed.
pub async fn delete(executor: impl sqlx::SqliteExecutor<'_>, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM addresses WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Count stored addresses
pub async fn count(executor: impl sqlx::SqliteExecutor<'_>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM addresses")
        .fetch_one(executor)
        .await
}
