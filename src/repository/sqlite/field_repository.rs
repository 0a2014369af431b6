use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::lemma::FieldWeights;
use crate::repository::FieldRepository;

#[derive(Clone)]
pub struct SqliteFieldRepository {
    pool: SqlitePool,
}

impl SqliteFieldRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FieldRepository for SqliteFieldRepository {
    async fn weights(&self) -> Result<FieldWeights> {
        let rows = sqlx::query("SELECT selector, weight FROM search_field")
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch search field weights")?;

        let mut weights = FieldWeights::default();
        for row in &rows {
            let selector: String = row.get("selector");
            match selector.as_str() {
                "title" => weights.title = row.get("weight"),
                "body" => weights.body = row.get("weight"),
                _ => {}
            }
        }
        Ok(weights)
    }
}
