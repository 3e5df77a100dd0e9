/// Relational store access
///
/// Services depend on the traits below; the PostgreSQL repositories are the
/// production implementations.
use crate::error::Result;
use crate::models::{Account, Article, ArticlePatch, ArticleQuery, NewArticle};
use async_trait::async_trait;

pub mod accounts;
pub mod articles;

pub use accounts::PgAccountStore;
pub use articles::PgArticleStore;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn insert(&self, article: &NewArticle) -> Result<Article>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Article>>;

    /// One page of matching articles plus the total match count
    async fn find_page(&self, query: &ArticleQuery, per_page: i64) -> Result<(Vec<Article>, i64)>;

    /// Apply `patch`, `None` when no row has `id`
    async fn update(&self, id: i32, patch: &ArticlePatch) -> Result<Option<Article>>;

    /// `false` when no row has `id`
    async fn delete(&self, id: i32) -> Result<bool>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    async fn insert(&self, username: &str, password_hash: &str) -> Result<Account>;
}
