use crate::domain::models::SiteStatus;

mod field_repository;
mod index_repository;
mod lemma_repository;
mod page_repository;
mod site_repository;

pub use field_repository::SqliteFieldRepository;
pub use index_repository::SqliteIndexRepository;
pub use lemma_repository::SqliteLemmaRepository;
pub use page_repository::SqlitePageRepository;
pub use site_repository::SqliteSiteRepository;

pub fn map_site_status(s: &str) -> SiteStatus {
    match s {
        "INDEXING" => SiteStatus::Indexing,
        "INDEXED" => SiteStatus::Indexed,
        "FAILED" => SiteStatus::Failed,
        _ => SiteStatus::Failed,
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::models::*,
        repository::{
            sqlite::{
                SqliteFieldRepository, SqliteIndexRepository, SqliteLemmaRepository,
                SqlitePageRepository, SqliteSiteRepository,
            },
            FieldRepository, IndexRepository, LemmaRepository, PageRepository, SiteRepository,
        },
        test_utils::fixtures,
    };

    #[tokio::test]
    async fn test_site_lifecycle() {
        let pool = fixtures::setup_test_db().await;
        let repo = SqliteSiteRepository::new(pool);

        // 1. Create
        let site = repo
            .ensure("https://example.com", "Example", SiteStatus::Indexing)
            .await
            .expect("Failed to create site");
        assert_eq!(site.status, SiteStatus::Indexing);
        assert_eq!(site.last_error, "");

        // 2. Ensuring again only refreshes the name
        let again = repo
            .ensure("https://example.com", "Example (renamed)", SiteStatus::Indexed)
            .await
            .unwrap();
        assert_eq!(again.id, site.id);
        assert_eq!(again.name, "Example (renamed)");
        assert_eq!(
            again.status,
            SiteStatus::Indexing,
            "Existing status must not change"
        );

        // 3. Fail with a message
        repo.update_status(site.id, SiteStatus::Failed, Some("Stopped by user"))
            .await
            .expect("Update status failed");

        let all = repo.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, SiteStatus::Failed);
        assert_eq!(all[0].last_error, "Stopped by user");

        // 4. Completing clears the error
        repo.update_status(site.id, SiteStatus::Indexed, None)
            .await
            .expect("Update status failed");

        let all = repo.all().await.unwrap();
        assert_eq!(all[0].status, SiteStatus::Indexed);
        assert_eq!(all[0].last_error, "");
    }

    #[tokio::test]
    async fn test_index_persistence_and_lookup() {
        let pool = fixtures::setup_test_db().await;
        let sites = SqliteSiteRepository::new(pool.clone());
        let pages = SqlitePageRepository::new(pool.clone());
        let lemmas = SqliteLemmaRepository::new(pool.clone());
        let index = SqliteIndexRepository::new(pool.clone());

        let site = sites
            .ensure("https://example.com", "Example", SiteStatus::Indexing)
            .await
            .unwrap();

        pages
            .save_batch(&[
                fixtures::sample_page(1, site.id, "https://example.com/a", "<html>fox</html>"),
                fixtures::sample_page(2, site.id, "https://example.com/b", "<html>dog</html>"),
            ])
            .await
            .expect("Failed to save pages");

        lemmas
            .save_batch(&[Lemma {
                id: 1,
                site_id: site.id,
                lemma: "fox".into(),
                frequency: 1,
            }])
            .await
            .expect("Failed to save lemmas");

        index
            .save_batch(&[
                IndexEntry {
                    id: 1,
                    page_id: 1,
                    lemma_id: 1,
                    rank: 0.8,
                },
                IndexEntry {
                    id: 2,
                    page_id: 1,
                    lemma_id: 1,
                    rank: 1.0,
                },
            ])
            .await
            .expect("Failed to save index entries");

        // Lookup joins through the index and folds duplicate entries
        let hits = pages.by_lemma("fox").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "https://example.com/a");

        assert!(pages.by_lemma("cat").await.unwrap().is_empty());

        assert_eq!(pages.count_by_site(site.id).await.unwrap(), 2);
        assert_eq!(lemmas.count_by_site(site.id).await.unwrap(), 1);
        assert_eq!(pages.max_id().await.unwrap(), 2);
        assert_eq!(lemmas.max_id().await.unwrap(), 1);
        assert_eq!(index.max_id().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_truncate_clears_index_data() {
        let pool = fixtures::setup_test_db().await;
        let sites = SqliteSiteRepository::new(pool.clone());
        let pages = SqlitePageRepository::new(pool.clone());
        let lemmas = SqliteLemmaRepository::new(pool.clone());
        let index = SqliteIndexRepository::new(pool.clone());

        let site = sites
            .ensure("https://example.com", "Example", SiteStatus::Indexing)
            .await
            .unwrap();
        pages
            .save_batch(&[fixtures::sample_page(
                1,
                site.id,
                "https://example.com/",
                "<html></html>",
            )])
            .await
            .unwrap();
        lemmas
            .save_batch(&[Lemma {
                id: 1,
                site_id: site.id,
                lemma: "fox".into(),
                frequency: 1,
            }])
            .await
            .unwrap();
        index
            .save_batch(&[IndexEntry {
                id: 1,
                page_id: 1,
                lemma_id: 1,
                rank: 0.8,
            }])
            .await
            .unwrap();

        index.truncate().await.expect("Failed to truncate index");
        lemmas.truncate().await.expect("Failed to truncate lemmas");
        pages.truncate().await.expect("Failed to truncate pages");

        assert_eq!(pages.count_by_site(site.id).await.unwrap(), 0);
        assert_eq!(lemmas.count_by_site(site.id).await.unwrap(), 0);
        assert_eq!(pages.max_id().await.unwrap(), 0);
        assert_eq!(lemmas.max_id().await.unwrap(), 0);
        assert_eq!(index.max_id().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_batches_above_chunk_size() {
        let pool = fixtures::setup_test_db().await;
        let sites = SqliteSiteRepository::new(pool.clone());
        let pages = SqlitePageRepository::new(pool.clone());

        let site = sites
            .ensure("https://example.com", "Example", SiteStatus::Indexing)
            .await
            .unwrap();

        // 250 rows crosses the insert chunk boundary
        let batch: Vec<Page> = (1..=250)
            .map(|i| {
                fixtures::sample_page(
                    i,
                    site.id,
                    &format!("https://example.com/p{}", i),
                    "<html></html>",
                )
            })
            .collect();

        pages
            .save_batch(&batch)
            .await
            .expect("Failed to save large batch");
        assert_eq!(pages.count_by_site(site.id).await.unwrap(), 250);
        assert_eq!(pages.max_id().await.unwrap(), 250);
    }

    #[tokio::test]
    async fn test_seeded_field_weights() {
        let pool = fixtures::setup_test_db().await;
        let fields = SqliteFieldRepository::new(pool);

        let weights = fields.weights().await.expect("Failed to load weights");
        assert_eq!(weights.title, 1.0);
        assert_eq!(weights.body, 0.8);
    }
}
