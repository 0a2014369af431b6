use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::models::Lemma;
use crate::repository::LemmaRepository;

#[derive(Clone)]
pub struct SqliteLemmaRepository {
    pool: SqlitePool,
}

impl SqliteLemmaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LemmaRepository for SqliteLemmaRepository {
    async fn save_batch(&self, lemmas: &[Lemma]) -> Result<()> {
        if lemmas.is_empty() {
            return Ok(());
        }

        const CHUNK_SIZE: usize = 100;
        let mut tx = self.pool.begin().await?;

        for chunk in lemmas.chunks(CHUNK_SIZE) {
            let mut query_builder =
                sqlx::QueryBuilder::new("INSERT INTO lemma (id, site_id, lemma, frequency) ");

            query_builder.push_values(chunk, |mut b, lemma| {
                b.push_bind(lemma.id)
                    .push_bind(lemma.site_id)
                    .push_bind(&lemma.lemma)
                    .push_bind(lemma.frequency);
            });

            query_builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn count_by_site(&self, site_id: i64) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lemma WHERE site_id = ?")
            .bind(site_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count lemmas")
    }

    async fn max_id(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(id), 0) FROM lemma")
            .fetch_one(&self.pool)
            .await
            .context("Failed to read max lemma id")
    }

    async fn truncate(&self) -> Result<()> {
        sqlx::query("DELETE FROM lemma")
            .execute(&self.pool)
            .await
            .context("Failed to truncate lemmas")?;
        Ok(())
    }
}
