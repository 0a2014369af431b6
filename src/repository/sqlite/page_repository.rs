use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::models::Page;
use crate::repository::PageRepository;

#[derive(Clone)]
pub struct SqlitePageRepository {
    pool: SqlitePool,
}

impl SqlitePageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PageRepository for SqlitePageRepository {
    async fn save_batch(&self, pages: &[Page]) -> Result<()> {
        if pages.is_empty() {
            return Ok(());
        }

        const CHUNK_SIZE: usize = 100;
        let mut tx = self.pool.begin().await?;

        for chunk in pages.chunks(CHUNK_SIZE) {
            let mut query_builder =
                sqlx::QueryBuilder::new("INSERT INTO page (id, site_id, path, code, content) ");

            query_builder.push_values(chunk, |mut b, page| {
                b.push_bind(page.id)
                    .push_bind(page.site_id)
                    .push_bind(&page.path)
                    .push_bind(page.code)
                    .push_bind(&page.content);
            });

            query_builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn by_lemma(&self, lemma: &str) -> Result<Vec<Page>> {
        // Duplicate lemma rows can exist across flushes; DISTINCT folds them.
        let pages = sqlx::query_as::<_, Page>(
            "SELECT DISTINCT p.id, p.site_id, p.path, p.code, p.content \
             FROM page p \
             JOIN lemma_index li ON li.page_id = p.id \
             JOIN lemma l ON l.id = li.lemma_id \
             WHERE l.lemma = ? \
             ORDER BY p.id",
        )
        .bind(lemma)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch pages by lemma")?;

        Ok(pages)
    }

    async fn count_by_site(&self, site_id: i64) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM page WHERE site_id = ?")
            .bind(site_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count pages")
    }

    async fn max_id(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(id), 0) FROM page")
            .fetch_one(&self.pool)
            .await
            .context("Failed to read max page id")
    }

    async fn truncate(&self) -> Result<()> {
        sqlx::query("DELETE FROM page")
            .execute(&self.pool)
            .await
            .context("Failed to truncate pages")?;
        Ok(())
    }
}
