//! In-memory fakes for service and HTTP tests
//!
//! The relational stores count their calls so tests can tell whether a
//! request was served from cache. `SwitchableCache` wraps a `MemoryStore`
//! and can be told to fail reads or writes.

#![allow(dead_code)]

use article_service::db::{AccountStore, ArticleStore};
use article_service::error::Result;
use article_service::models::{Account, Article, ArticlePatch, ArticleQuery, NewArticle, SortOrder};
use article_service::security::{PasswordHasher, TokenIssuer};
use article_service::services::{AccountService, ArticleService};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use entity_cache::{
    CacheError, CacheKey, CacheResult, CacheStore, ListCacheSync, MemoryStore, PointCacheSync,
    WriteDiscipline,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_SECRET: &str = "test-secret-for-article-service";

/// Article table held in a vector
#[derive(Default)]
pub struct InMemoryArticles {
    rows: Mutex<Vec<Article>>,
    next_id: AtomicUsize,
    pub page_queries: AtomicUsize,
    pub id_lookups: AtomicUsize,
}

impl InMemoryArticles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows directly, bypassing the service
    pub fn seed(&self, title: &str, author: Option<&str>) -> Article {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let article = Article {
            id,
            title: title.to_string(),
            content: format!("{title} body"),
            author: author.map(str::to_string),
            created_at: base + Duration::minutes(i64::from(id)),
        };
        self.rows.lock().unwrap().push(article.clone());
        article
    }

    pub fn row(&self, id: i32) -> Option<Article> {
        self.rows.lock().unwrap().iter().find(|a| a.id == id).cloned()
    }

    pub fn page_query_count(&self) -> usize {
        self.page_queries.load(Ordering::SeqCst)
    }

    pub fn id_lookup_count(&self) -> usize {
        self.id_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticles {
    async fn insert(&self, article: &NewArticle) -> Result<Article> {
        let created = self.seed(&article.title, article.author.as_deref());
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|a| a.id == created.id)
            .expect("row just inserted");
        row.content = article.content.clone();
        Ok(row.clone())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Article>> {
        self.id_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.row(id))
    }

    async fn find_page(&self, query: &ArticleQuery, per_page: i64) -> Result<(Vec<Article>, i64)> {
        self.page_queries.fetch_add(1, Ordering::SeqCst);

        let mut matching: Vec<Article> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| match query.author_filter() {
                Some(author) => a
                    .author
                    .as_deref()
                    .is_some_and(|value| value.contains(author)),
                None => true,
            })
            .cloned()
            .collect();

        matching.sort_by_key(|a| (a.created_at, a.id));
        if query.order == SortOrder::Desc {
            matching.reverse();
        }

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset(per_page) as usize)
            .take(per_page as usize)
            .collect();
        Ok((page, total))
    }

    async fn update(&self, id: i32, patch: &ArticlePatch) -> Result<Option<Article>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|a| a.id == id).map(|row| {
            if let Some(title) = &patch.title {
                row.title = title.clone();
            }
            if let Some(content) = &patch.content {
                row.content = content.clone();
            }
            if let Some(author) = &patch.author {
                row.author = Some(author.clone());
            }
            row.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|a| a.id != id);
        Ok(rows.len() != before)
    }
}

/// Users table keyed by username
#[derive(Default)]
pub struct InMemoryAccounts {
    rows: Mutex<HashMap<String, Account>>,
    pub lookups: AtomicUsize,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for InMemoryAccounts {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().unwrap().get(username).cloned())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<Account> {
        let mut rows = self.rows.lock().unwrap();
        let account = Account {
            id: rows.len() as i32 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        rows.insert(username.to_string(), account.clone());
        Ok(account)
    }
}

/// Memory cache whose writes can be switched off
#[derive(Default)]
pub struct SwitchableCache {
    pub inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl SwitchableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStore for SwitchableCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("cache read refused".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("cache write refused".to_string()));
        }
        self.inner.set_ex(key, value, ttl_secs).await
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("cache delete refused".to_string()));
        }
        self.inner.del(key).await
    }
}

pub struct ArticleHarness {
    pub store: Arc<InMemoryArticles>,
    pub cache: Arc<SwitchableCache>,
    pub service: ArticleService,
}

pub fn article_harness() -> ArticleHarness {
    let store = Arc::new(InMemoryArticles::new());
    let cache = Arc::new(SwitchableCache::new());
    let service = ArticleService::with_caches(
        store.clone(),
        ListCacheSync::new(cache.clone(), CacheKey::article_list())
            .with_discipline(WriteDiscipline::SingleWriter),
        PointCacheSync::new(cache.clone(), CacheKey::ARTICLE),
    );
    ArticleHarness {
        store,
        cache,
        service,
    }
}

pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_cost(1024, 1, 1).expect("valid argon2 parameters")
}

pub fn token_issuer() -> Arc<TokenIssuer> {
    Arc::new(TokenIssuer::new(TEST_SECRET, 3600))
}

pub struct AccountHarness {
    pub store: Arc<InMemoryAccounts>,
    pub cache: Arc<SwitchableCache>,
    pub tokens: Arc<TokenIssuer>,
    pub service: AccountService,
}

pub fn account_harness() -> AccountHarness {
    let store = Arc::new(InMemoryAccounts::new());
    let cache = Arc::new(SwitchableCache::new());
    let tokens = token_issuer();
    let service = AccountService::new(store.clone(), cache.clone(), fast_hasher(), tokens.clone());
    AccountHarness {
        store,
        cache,
        tokens,
        service,
    }
}
