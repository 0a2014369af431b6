use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::models::IndexEntry;
use crate::repository::IndexRepository;

#[derive(Clone)]
pub struct SqliteIndexRepository {
    pool: SqlitePool,
}

impl SqliteIndexRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IndexRepository for SqliteIndexRepository {
    async fn save_batch(&self, entries: &[IndexEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        const CHUNK_SIZE: usize = 100;
        let mut tx = self.pool.begin().await?;

        for chunk in entries.chunks(CHUNK_SIZE) {
            let mut query_builder =
                sqlx::QueryBuilder::new("INSERT INTO lemma_index (id, page_id, lemma_id, rank) ");

            query_builder.push_values(chunk, |mut b, entry| {
                b.push_bind(entry.id)
                    .push_bind(entry.page_id)
                    .push_bind(entry.lemma_id)
                    .push_bind(entry.rank);
            });

            query_builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn max_id(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(id), 0) FROM lemma_index")
            .fetch_one(&self.pool)
            .await
            .context("Failed to read max index id")
    }

    async fn truncate(&self) -> Result<()> {
        sqlx::query("DELETE FROM lemma_index")
            .execute(&self.pool)
            .await
            .context("Failed to truncate index")?;
        Ok(())
    }
}
