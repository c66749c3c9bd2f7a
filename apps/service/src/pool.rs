use anyhow::Result;
use deadpool::managed::{self, Pool, RecycleResult};
use libsql::{Connection, Database, Error as LibsqlError};

pub struct DbManager {
    database: Database,
}

impl DbManager {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl managed::Manager for DbManager {
    type Type = Connection;
    type Error = LibsqlError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        self.database.connect()
    }

    async fn recycle(
        &self,
        conn: &mut Self::Type,
        _: &managed::Metrics,
    ) -> RecycleResult<Self::Error> {
        conn.query("SELECT 1", ())
            .await?
            .next()
            .await?
            .ok_or(LibsqlError::QueryReturnedNoRows)?;
        Ok(())
    }
}

pub type DbPool = Pool<DbManager>;

/// Open (or create) a local database file and wrap it in a pool.
pub async fn connect(path: &str) -> Result<DbPool> {
    let database = libsql::Builder::new_local(path).build().await?;
    let pool = Pool::builder(DbManager::new(database)).build()?;
    Ok(pool)
}
