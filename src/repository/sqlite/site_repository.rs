use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::domain::models::{Site, SiteStatus};
use crate::repository::sqlite::map_site_status;
use crate::repository::SiteRepository;

#[derive(Clone)]
pub struct SqliteSiteRepository {
    pool: SqlitePool,
}

impl SqliteSiteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn site_from_row(row: &SqliteRow) -> Site {
        Site {
            id: row.get("id"),
            url: row.get("url"),
            name: row.get("name"),
            status: map_site_status(&row.get::<String, _>("status")),
            status_time: row.get("status_time"),
            last_error: row.get("last_error"),
        }
    }
}

#[async_trait]
impl SiteRepository for SqliteSiteRepository {
    async fn all(&self) -> Result<Vec<Site>> {
        let rows = sqlx::query(
            "SELECT id, url, name, status, status_time, last_error FROM site ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch sites")?;

        Ok(rows.iter().map(Self::site_from_row).collect())
    }

    async fn ensure(&self, url: &str, name: &str, status: SiteStatus) -> Result<Site> {
        let row = sqlx::query(
            "INSERT INTO site (url, name, status, status_time, last_error) \
             VALUES (?, ?, ?, ?, '') \
             ON CONFLICT(url) DO UPDATE SET name = excluded.name \
             RETURNING id, url, name, status, status_time, last_error",
        )
        .bind(url)
        .bind(name)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert site")?;

        Ok(Self::site_from_row(&row))
    }

    async fn update_status(
        &self,
        site_id: i64,
        status: SiteStatus,
        error: Option<&str>,
    ) -> Result<()> {
        sqlx::query("UPDATE site SET status = ?, status_time = ?, last_error = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(error.unwrap_or(""))
            .bind(site_id)
            .execute(&self.pool)
            .await
            .context("Failed to update site status")?;

        Ok(())
    }
}
