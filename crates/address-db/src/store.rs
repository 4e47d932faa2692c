//! Address store backed by a SQLite connection pool
//!
//! Every mutation runs inside its own transaction. A transaction that is
//! dropped before `commit` is rolled back by sqlx, so an early return on any
//! error leaves the table unchanged.
//!
//! Write transactions start with `BEGIN IMMEDIATE`. A deferred transaction
//! that reads before it writes has to upgrade its lock, and two such upgrades
//! on separate connections fail with `SQLITE_BUSY` without waiting.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};
use sqlx::Transaction;
use tracing::{debug, error, info};

use crate::addresses;
use crate::error::{Result, StoreError, ValidationError};
use crate::types::{Address, AddressPatch, NewAddress};
use crate::validation::validate_pagination;

/// How long a writer waits for the database lock before giving up
const BUSY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Handle to the address table. Clones share the same pool.
#[derive(Debug, Clone)]
pub struct AddressStore {
    pool: SqlitePool,
}

impl AddressStore {
    /// Connect to the database, creating the file if it does not exist.
    ///
    /// An in-memory database lives only as long as its connection, so
    /// `sqlite::memory:` URLs get a single connection that is never recycled.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        info!("Connecting to database...");
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);

        let (options, pool_options) = if is_in_memory(database_url) {
            let pool_options = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            (options, pool_options)
        } else {
            // WAL lets readers proceed while a writer holds the lock
            let options = options.journal_mode(SqliteJournalMode::Wal);
            (options, SqlitePoolOptions::new().max_connections(max_connections))
        };

        let pool = pool_options.connect_with(options).await?;
        info!("Database connection established");
        Ok(Self { pool })
    }

    /// Apply the embedded migrations under `migrations/`.
    /// Applied versions are tracked in `_sqlx_migrations`.
    pub async fn migrate(&self) -> Result<()> {
        info!("Applying address schema migrations");
        let migrator = sqlx::migrate!();
        if let Err(e) = migrator.run(&self.pool).await {
            error!(error = %e, "Address schema migration failed");
            return Err(StoreError::from(sqlx::Error::from(e)));
        }
        info!(
            migrations = migrator.iter().count(),
            "Address schema is up to date"
        );
        Ok(())
    }

    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    /// Number of stored addresses. Doubles as a connectivity check.
    pub async fn count(&self) -> Result<i64> {
        addresses::count(&self.pool)
            .await
            .map_err(storage_failure("count", None))
    }

    pub async fn create(&self, new: &NewAddress) -> Result<Address> {
        new.validate()?;

        let mut tx = self.begin_write("create", None).await?;
        let address = addresses::insert(
            &mut *tx,
            &new.label,
            new.latitude,
            new.longitude,
            Utc::now(),
        )
        .await
        .map_err(storage_failure("create", None))?;
        tx.commit().await.map_err(storage_failure("create", None))?;

        info!(id = address.id, label = %address.label, "Address created");
        Ok(address)
    }

    pub async fn get(&self, id: i64) -> Result<Address> {
        addresses::get(&self.pool, id)
            .await
            .map_err(storage_failure("get", Some(id)))?
            .ok_or(StoreError::NotFound(id))
    }

    /// Page through addresses in ascending id order
    pub async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Address>> {
        validate_pagination(skip, limit)?;
        addresses::list(&self.pool, skip, limit)
            .await
            .map_err(storage_failure("list", None))
    }

    /// Apply a partial update.
    ///
    /// Field values are validated first, then existence is checked, then the
    /// patch must name at least one field.
    pub async fn update(&self, id: i64, patch: &AddressPatch) -> Result<Address> {
        patch.validate()?;

        let mut tx = self.begin_write("update", Some(id)).await?;

        let mut address = addresses::get(&mut *tx, id)
            .await
            .map_err(storage_failure("update", Some(id)))?
            .ok_or(StoreError::NotFound(id))?;

        if patch.is_empty() {
            return Err(ValidationError::EmptyUpdate.into());
        }

        patch.apply_to(&mut address);
        address.updated_at = next_updated_at(address.updated_at);

        let updated = addresses::update(&mut *tx, &address)
            .await
            .map_err(storage_failure("update", Some(id)))?
            .ok_or(StoreError::NotFound(id))?;
        tx.commit()
            .await
            .map_err(storage_failure("update", Some(id)))?;

        info!(id, fields = ?patch.changed_fields(), "Address updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.begin_write("delete", Some(id)).await?;

        let removed = addresses::delete(&mut *tx, id)
            .await
            .map_err(storage_failure("delete", Some(id)))?;
        if !removed {
            return Err(StoreError::NotFound(id));
        }

        tx.commit()
            .await
            .map_err(storage_failure("delete", Some(id)))?;

        info!(id, "Address deleted");
        Ok(())
    }

    /// Open a transaction that takes the write lock up front
    async fn begin_write(
        &self,
        op: &'static str,
        id: Option<i64>,
    ) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(storage_failure(op, id))
    }

    /// Every stored address, read in a single statement
    pub async fn all(&self) -> Result<Vec<Address>> {
        let rows = addresses::all(&self.pool)
            .await
            .map_err(storage_failure("all", None))?;
        debug!(count = rows.len(), "Loaded all addresses");
        Ok(rows)
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// `updated_at` must strictly advance even if the clock has not moved.
fn next_updated_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Log a persistence failure with its operation context and wrap it.
fn storage_failure(op: &'static str, id: Option<i64>) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        error!(op, id, error = %e, "Address store operation failed");
        StoreError::from(e)
    }
}
