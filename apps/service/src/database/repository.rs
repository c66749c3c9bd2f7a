use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Row, params};

use super::models::MonitoredService;
use crate::error::RepositoryError;
use crate::monitoring::validation::{
    DEFAULT_CHECK_INTERVAL_SECS, validate_check_interval, validate_endpoint,
};
use crate::pool::{DbManager, DbPool};

/// Narrow persistence interface consumed by the monitoring engine.
///
/// Everything that touches a specific user's services is owner-scoped:
/// callers can only delete or reconfigure records they registered.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Register a new service. Validates the URL and interval before
    /// persisting anything; `check_interval` defaults to 300s.
    async fn add_service(
        &self,
        name: &str,
        url: &str,
        owner: &str,
        check_interval: Option<u64>,
    ) -> Result<MonitoredService, RepositoryError>;

    /// All services registered by one owner.
    async fn list_services(&self, owner: &str) -> Result<Vec<MonitoredService>, RepositoryError>;

    /// Every registered service, for the scheduled sweep.
    async fn list_all_services(&self) -> Result<Vec<MonitoredService>, RepositoryError>;

    /// Fetch one service by id.
    async fn get_service(&self, id: i64) -> Result<Option<MonitoredService>, RepositoryError>;

    /// Owner-scoped delete; false when the (id, owner) pair matches nothing.
    async fn delete_service(&self, id: i64, owner: &str) -> Result<bool, RepositoryError>;

    /// Owner-scoped interval update; validates the minimum first.
    async fn update_interval(
        &self,
        id: i64,
        owner: &str,
        seconds: u64,
    ) -> Result<bool, RepositoryError>;

    /// Persist the result of a completed check: `last_status`,
    /// `last_checked` and `is_active` change together in one statement.
    /// The write is conditional on `last_checked <= checked_at`, so a check
    /// that finished earlier can never clobber a fresher one. Returns
    /// whether the write landed; false means a fresher check already
    /// recorded and this result is stale.
    async fn update_status(
        &self,
        id: i64,
        is_up: bool,
        checked_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;
}

/// libsql-backed repository.
pub struct LibsqlServiceRepository {
    pool: DbPool,
}

const SERVICE_COLUMNS: &str =
    "id, name, url, owner, is_active, check_interval, last_checked, last_status, created_at";

impl LibsqlServiceRepository {
    pub fn new_from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> Result<deadpool::managed::Object<DbManager>, RepositoryError> {
        Ok(self.pool.get().await?)
    }
}

fn service_from_row(row: &Row) -> Result<MonitoredService, RepositoryError> {
    Ok(MonitoredService {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        owner: row.get(3)?,
        is_active: row.get::<i64>(4)? != 0,
        check_interval: row.get::<i64>(5)? as u64,
        last_checked: row.get::<Option<i64>>(6)?.map(MonitoredService::i64_to_timestamp),
        last_status: MonitoredService::status_from_column(row.get::<Option<i64>>(7)?),
        created_at: MonitoredService::i64_to_timestamp(row.get(8)?),
    })
}

#[async_trait]
impl ServiceRepository for LibsqlServiceRepository {
    async fn add_service(
        &self,
        name: &str,
        url: &str,
        owner: &str,
        check_interval: Option<u64>,
    ) -> Result<MonitoredService, RepositoryError> {
        validate_endpoint(url)?;
        let check_interval = check_interval.unwrap_or(DEFAULT_CHECK_INTERVAL_SECS);
        validate_check_interval(check_interval)?;

        let created_at = Utc::now();
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO services (name, url, owner, is_active, check_interval, created_at)
             VALUES (?, ?, ?, 1, ?, ?)",
            params![
                name,
                url,
                owner,
                check_interval as i64,
                MonitoredService::timestamp_to_i64(created_at)
            ],
        )
        .await?;

        Ok(MonitoredService {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            url: url.to_string(),
            owner: owner.to_string(),
            is_active: true,
            check_interval,
            last_checked: None,
            last_status: crate::monitoring::types::ServiceStatus::Unknown,
            created_at,
        })
    }

    async fn list_services(&self, owner: &str) -> Result<Vec<MonitoredService>, RepositoryError> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare(&format!("SELECT {SERVICE_COLUMNS} FROM services WHERE owner = ? ORDER BY id"))
            .await?;

        let mut rows = stmt.query(params![owner]).await?;
        let mut services = Vec::new();
        while let Some(row) = rows.next().await? {
            services.push(service_from_row(&row)?);
        }
        Ok(services)
    }

    async fn list_all_services(&self) -> Result<Vec<MonitoredService>, RepositoryError> {
        let conn = self.get_conn().await?;
        let mut stmt =
            conn.prepare(&format!("SELECT {SERVICE_COLUMNS} FROM services ORDER BY id")).await?;

        let mut rows = stmt.query(()).await?;
        let mut services = Vec::new();
        while let Some(row) = rows.next().await? {
            services.push(service_from_row(&row)?);
        }
        Ok(services)
    }

    async fn get_service(&self, id: i64) -> Result<Option<MonitoredService>, RepositoryError> {
        let conn = self.get_conn().await?;
        let mut stmt =
            conn.prepare(&format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?")).await?;

        let mut rows = stmt.query(params![id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(service_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_service(&self, id: i64, owner: &str) -> Result<bool, RepositoryError> {
        let conn = self.get_conn().await?;
        let affected = conn
            .execute("DELETE FROM services WHERE id = ? AND owner = ?", params![id, owner])
            .await?;
        Ok(affected > 0)
    }

    async fn update_interval(
        &self,
        id: i64,
        owner: &str,
        seconds: u64,
    ) -> Result<bool, RepositoryError> {
        validate_check_interval(seconds)?;

        let conn = self.get_conn().await?;
        let affected = conn
            .execute(
                "UPDATE services SET check_interval = ? WHERE id = ? AND owner = ?",
                params![seconds as i64, id, owner],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn update_status(
        &self,
        id: i64,
        is_up: bool,
        checked_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let status = i64::from(is_up);
        let checked_at = MonitoredService::timestamp_to_i64(checked_at);

        let conn = self.get_conn().await?;
        let affected = conn
            .execute(
                "UPDATE services SET last_status = ?, last_checked = ?, is_active = ?
                 WHERE id = ? AND (last_checked IS NULL OR last_checked <= ?)",
                params![status, checked_at, status, id, checked_at],
            )
            .await?;
        Ok(affected > 0)
    }
}
