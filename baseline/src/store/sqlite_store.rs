//! SQLite-backed baseline table.
//!
//! One row per instrument. `name` is not declared UNIQUE so that databases
//! created by earlier deployments keep opening; the store never inserts a
//! second row for a name because `upsert` only inserts when the UPDATE
//! matched nothing.
//!
//! All access goes through a single long-lived connection. Each statement
//! commits on its own; there are no multi-row transactions.

use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::BaselineStore;
use crate::model::Baseline;

pub struct SqliteBaselineStore {
    pool: SqlitePool,
}

impl SqliteBaselineStore {
    /// Opens (creating if missing) the database at `url` and ensures the
    /// schema exists.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url {url}"))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open database {url}"))?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS baselines (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                accepted_delta  REAL,
                price           REAL,
                last_update     TEXT
            );
        "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to create baselines table")?;

        Ok(())
    }

    /// Releases the underlying connection. Further calls fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl BaselineStore for SqliteBaselineStore {
    async fn get_all(&self) -> anyhow::Result<BTreeMap<String, Baseline>> {
        let rows = sqlx::query(
            "SELECT name, accepted_delta, price, last_update FROM baselines ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to read baselines")?;

        let mut out = BTreeMap::new();
        for row in rows {
            match row_to_baseline(&row) {
                // Oldest row wins if a legacy table holds duplicates.
                Ok(b) => {
                    out.entry(b.name.clone()).or_insert(b);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed baseline row");
                }
            }
        }

        Ok(out)
    }

    async fn upsert(
        &self,
        name: &str,
        accepted_delta: Option<f64>,
        price: Option<f64>,
    ) -> anyhow::Result<()> {
        let now = Utc::now();

        let query = match price {
            Some(p) => sqlx::query(
                "UPDATE baselines SET accepted_delta = ?, price = ?, last_update = ? WHERE name = ?",
            )
            .bind(accepted_delta)
            .bind(p)
            .bind(now)
            .bind(name),
            None => sqlx::query(
                "UPDATE baselines SET accepted_delta = ?, last_update = ? WHERE name = ?",
            )
            .bind(accepted_delta)
            .bind(now)
            .bind(name),
        };

        let updated = query
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to update baseline for {name}"))?
            .rows_affected();

        if updated == 0 {
            sqlx::query(
                "INSERT INTO baselines (name, accepted_delta, price, last_update) VALUES (?, ?, ?, ?)",
            )
            .bind(name)
            .bind(accepted_delta)
            .bind(price)
            .bind(now)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to insert baseline for {name}"))?;
        }

        Ok(())
    }
}

fn row_to_baseline(row: &SqliteRow) -> anyhow::Result<Baseline> {
    Ok(Baseline {
        name: row.try_get("name")?,
        accepted_delta: row.try_get("accepted_delta")?,
        last_price: row.try_get("price")?,
        // An unreadable timestamp does not make the row unusable.
        last_update: row
            .try_get::<Option<DateTime<Utc>>, _>("last_update")
            .ok()
            .flatten(),
    })
}
