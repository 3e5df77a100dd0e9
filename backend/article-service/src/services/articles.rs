/// Article service - store and cache call ordering per operation
///
/// Writes always reach the store first. The listing snapshot is reconciled
/// afterwards and separately; a failed cache write after a committed store
/// write is reported, and the two stay apart until the snapshot expires.
use crate::db::ArticleStore;
use crate::error::{AppError, Result};
use crate::models::{
    Article, ArticleListing, ArticlePage, ArticlePatch, ArticleQuery, NewArticle,
    ARTICLES_PER_PAGE,
};
use entity_cache::{CacheKey, CacheStore, ListCacheSync, PointCacheSync, WriteDiscipline};
use std::sync::Arc;
use tracing::{debug, error, info};
use validator::Validate;

pub struct ArticleService {
    store: Arc<dyn ArticleStore>,
    list_cache: ListCacheSync<Article>,
    point_cache: PointCacheSync<Article>,
}

impl ArticleService {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        cache: Arc<dyn CacheStore>,
        discipline: WriteDiscipline,
    ) -> Self {
        Self {
            store,
            list_cache: ListCacheSync::new(cache.clone(), CacheKey::article_list())
                .with_discipline(discipline),
            point_cache: PointCacheSync::new(cache, CacheKey::ARTICLE),
        }
    }

    /// Build from prepared synchronizers
    pub fn with_caches(
        store: Arc<dyn ArticleStore>,
        list_cache: ListCacheSync<Article>,
        point_cache: PointCacheSync<Article>,
    ) -> Self {
        Self {
            store,
            list_cache,
            point_cache,
        }
    }

    /// Create an article. The listing snapshot does not learn about it.
    pub async fn create(&self, article: NewArticle) -> Result<Article> {
        article.validate()?;

        let created = self.store.insert(&article).await?;
        self.list_cache.reconcile_create(&created);

        info!(article_id = created.id, "Article created");
        Ok(created)
    }

    /// List articles.
    ///
    /// A non-empty cached snapshot is returned as is, whatever the query.
    /// Otherwise the store is queried and its items become the new snapshot.
    pub async fn list(&self, query: ArticleQuery) -> Result<ArticleListing> {
        query.validate()?;

        if let Some(snapshot) = self.list_cache.read().await {
            if !snapshot.is_empty() {
                debug!(count = snapshot.len(), "Serving article listing from snapshot");
                return Ok(ArticleListing::Cached(snapshot));
            }
        }

        let (items, total) = self.store.find_page(&query, ARTICLES_PER_PAGE).await?;
        self.list_cache.populate(&items).await?;

        Ok(ArticleListing::Page(ArticlePage::new(items, total, &query)))
    }

    /// Get one article: listing snapshot, then point entry, then store.
    ///
    /// A store hit populates neither cache.
    pub async fn get_by_id(&self, id: i32) -> Result<Article> {
        if let Some(snapshot) = self.list_cache.read().await {
            if let Some(article) = snapshot.into_iter().find(|a| a.id == id) {
                debug!(article_id = id, "Article served from listing snapshot");
                return Ok(article);
            }
        }

        if let Some(article) = self.point_cache.read(id).await {
            debug!(article_id = id, "Article served from point entry");
            return Ok(article);
        }

        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))
    }

    /// Update the store, then merge the same fields into the snapshot
    pub async fn update(&self, id: i32, patch: ArticlePatch) -> Result<Article> {
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::Validation(
                "at least one of title, content or author is required".to_string(),
            ));
        }

        let updated = self
            .store
            .update(id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;

        if let Err(err) = self
            .list_cache
            .reconcile_update(i64::from(id), &patch)
            .await
        {
            error!(article_id = id, error = %err, "Article updated but listing snapshot reconciliation failed");
            return Err(err.into());
        }

        info!(article_id = id, "Article updated");
        Ok(updated)
    }

    /// Delete from the store, then drop the entry from the snapshot
    pub async fn delete(&self, id: i32) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound("Article not found".to_string()));
        }

        if let Err(err) = self.list_cache.reconcile_delete(i64::from(id)).await {
            error!(article_id = id, error = %err, "Article deleted but listing snapshot reconciliation failed");
            return Err(err.into());
        }

        info!(article_id = id, "Article deleted");
        Ok(())
    }
}
