//! SQLite geo store
//!
//! Schema is created on connect. Samples and voltage levels are stored as
//! JSON text columns.

use async_trait::async_trait;
use geo_model::{Country, Position, RawLine, ResolvedLine, Substation};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::traits::GeoStore;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS substations (
        id TEXT PRIMARY KEY,
        country TEXT NOT NULL,
        lat REAL NOT NULL,
        lon REAL NOT NULL,
        voltage_levels TEXT NOT NULL DEFAULT '[]'
    )",
    "CREATE TABLE IF NOT EXISTS lines (
        id TEXT PRIMARY KEY,
        country TEXT NOT NULL,
        voltage INTEGER NOT NULL,
        aerial INTEGER NOT NULL,
        samples TEXT NOT NULL DEFAULT '[]',
        resolved INTEGER NOT NULL DEFAULT 0
    )",
];

/// SQLite-backed geo store
#[derive(Clone)]
pub struct SqliteGeoStore {
    pool: SqlitePool,
}

impl SqliteGeoStore {
    /// Open (or create) the database file and ensure the schema
    pub async fn connect(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Unavailable(format!("{}: {}", parent.display(), e)))?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        info!("SQLite geo store connected: {}", db_path.display());
        Self::from_pool(pool).await
    }

    /// Private in-memory database (single connection)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and ensure the schema
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        debug!("SQLite geo schema ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn parse_country(id: &str, code: &str) -> Result<Country> {
        code.parse().map_err(|_| StoreError::Corrupted {
            id: id.to_string(),
            reason: format!("unknown country {}", code),
        })
    }

    fn substation_from_row(row: &SqliteRow) -> Result<Substation> {
        let id: String = row.try_get("id")?;
        let country: String = row.try_get("country")?;
        let voltage_levels: String = row.try_get("voltage_levels")?;
        Ok(Substation {
            country: Self::parse_country(&id, &country)?,
            position: Position::new(row.try_get("lat")?, row.try_get("lon")?),
            voltage_levels: serde_json::from_str::<BTreeSet<u32>>(&voltage_levels)?,
            id,
        })
    }

    fn line_from_row(row: &SqliteRow) -> Result<RawLine> {
        let id: String = row.try_get("id")?;
        let country: String = row.try_get("country")?;
        let voltage: i64 = row.try_get("voltage")?;
        let samples: String = row.try_get("samples")?;
        Ok(RawLine {
            country: Self::parse_country(&id, &country)?,
            voltage: u32::try_from(voltage).map_err(|_| StoreError::Corrupted {
                id: id.clone(),
                reason: format!("voltage {} out of range", voltage),
            })?,
            aerial: row.try_get("aerial")?,
            samples: serde_json::from_str(&samples)?,
            resolved: row.try_get("resolved")?,
            id,
        })
    }

    async fn fetch_line(&self, line_id: &str) -> Result<Option<RawLine>> {
        let row =
            sqlx::query("SELECT id, country, voltage, aerial, samples, resolved FROM lines WHERE id = ?")
                .bind(line_id)
                .fetch_optional(&self.pool)
                .await?;
        row.as_ref().map(Self::line_from_row).transpose()
    }
}

#[async_trait]
impl GeoStore for SqliteGeoStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn save_substations(&self, substations: Vec<Substation>) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for substation in &substations {
            sqlx::query(
                "INSERT INTO substations (id, country, lat, lon, voltage_levels)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    country = excluded.country,
                    lat = excluded.lat,
                    lon = excluded.lon,
                    voltage_levels = excluded.voltage_levels",
            )
            .bind(&substation.id)
            .bind(substation.country.code())
            .bind(substation.position.lat)
            .bind(substation.position.lon)
            .bind(serde_json::to_string(&substation.voltage_levels)?)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        debug!("Saved {} substations", substations.len());
        Ok(())
    }

    async fn get_substation(&self, id: &str) -> Result<Option<Substation>> {
        let row = sqlx::query(
            "SELECT id, country, lat, lon, voltage_levels FROM substations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::substation_from_row).transpose()
    }

    async fn save_lines(&self, lines: Vec<RawLine>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;
        for line in &lines {
            let result = sqlx::query(
                "INSERT INTO lines (id, country, voltage, aerial, samples, resolved)
                 VALUES (?, ?, ?, ?, ?, 0)
                 ON CONFLICT(id) DO NOTHING",
            )
            .bind(&line.id)
            .bind(line.country.code())
            .bind(i64::from(line.voltage))
            .bind(line.aerial)
            .bind(serde_json::to_string(&line.samples)?)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;
        Ok(inserted as usize)
    }

    async fn get_raw_samples(&self, line_id: &str) -> Result<Vec<Position>> {
        Ok(self
            .fetch_line(line_id)
            .await?
            .map(|line| line.samples)
            .unwrap_or_default())
    }

    async fn get_resolved(&self, line_id: &str) -> Result<Option<ResolvedLine>> {
        Ok(self.fetch_line(line_id).await?.and_then(ResolvedLine::from_raw))
    }

    async fn put_resolved(&self, line: ResolvedLine) -> Result<()> {
        sqlx::query(
            "INSERT INTO lines (id, country, voltage, aerial, samples, resolved)
             VALUES (?, ?, ?, ?, ?, 1)
             ON CONFLICT(id) DO UPDATE SET
                country = excluded.country,
                voltage = excluded.voltage,
                aerial = excluded.aerial,
                samples = excluded.samples,
                resolved = 1",
        )
        .bind(&line.id)
        .bind(line.country.code())
        .bind(i64::from(line.voltage))
        .bind(line.aerial)
        .bind(serde_json::to_string(&line.path)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_resolved(&self, line_id: &str) -> Result<bool> {
        let resolved: Option<bool> = sqlx::query_scalar("SELECT resolved FROM lines WHERE id = ?")
            .bind(line_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(resolved.unwrap_or(false))
    }

    async fn line_count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lines")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}
