/// Data models for article-service
///
/// - Article: content item with title, body and optional author
/// - Account: login identity with an Argon2 password hash
/// - Request shapes validated before any store or cache access
use chrono::{DateTime, Utc};
use entity_cache::CachedEntity;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Articles returned per listing page
pub const ARTICLES_PER_PAGE: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Field changes for an article; `None` leaves the field as stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ArticlePatch {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(length(max = 100))]
    pub author: Option<String>,
}

impl ArticlePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.author.is_none()
    }
}

impl CachedEntity for Article {
    type Patch = ArticlePatch;

    fn entity_id(&self) -> i64 {
        i64::from(self.id)
    }

    fn apply_patch(&mut self, patch: &ArticlePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(author) = &patch.author {
            self.author = Some(author.clone());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewArticle {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(length(max = 100))]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Listing filter, page and order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ArticleQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub author: Option<String>,
    #[serde(default = "first_page")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default)]
    pub order: SortOrder,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            author: None,
            page: first_page(),
            order: SortOrder::default(),
        }
    }
}

impl ArticleQuery {
    pub fn offset(&self, per_page: i64) -> i64 {
        (i64::from(self.page.max(1)) - 1) * per_page
    }

    /// Author substring to filter on; blank means no filter
    pub fn author_filter(&self) -> Option<&str> {
        self.author.as_deref().filter(|a| !a.trim().is_empty())
    }

    /// `LIKE` pattern for the author filter, matched with `ESCAPE '\'`
    pub fn author_pattern(&self) -> Option<String> {
        self.author_filter().map(|author| {
            let mut pattern = String::with_capacity(author.len() + 2);
            pattern.push('%');
            for c in author.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }
}

fn first_page() -> u32 {
    1
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// One page read through from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlePage {
    pub data: Vec<Article>,
    pub total: i64,
    pub articles_per_page: i64,
    pub current_page: u32,
    pub total_pages: i64,
}

impl ArticlePage {
    pub fn new(data: Vec<Article>, total: i64, query: &ArticleQuery) -> Self {
        let total_pages = (total + ARTICLES_PER_PAGE - 1) / ARTICLES_PER_PAGE;
        Self {
            data,
            total,
            articles_per_page: ARTICLES_PER_PAGE,
            current_page: query.page,
            total_pages,
        }
    }
}

/// Listing result: the cached snapshot as stored, or a fresh page.
///
/// A snapshot hit carries no pagination metadata and may not match the
/// requested filter, page or order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArticleListing {
    Cached(Vec<Article>),
    Page(ArticlePage),
}

impl ArticleListing {
    pub fn articles(&self) -> &[Article] {
        match self {
            ArticleListing::Cached(items) => items,
            ArticleListing::Page(page) => &page.data,
        }
    }
}

/// Stored account. The point cache holds this full record, hash included,
/// so cached logins can verify passwords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 6, max = 20))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}
