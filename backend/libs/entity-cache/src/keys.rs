//! Cache key schema
//!
//! Key format: v{VERSION}:{entity}:{identifier}[:sub_key]
//!
//! The article listing key carries no filter, page or order component. Every
//! listing request shares the one snapshot stored under it.

use std::fmt::Display;

/// Cache schema version - increment when changing key formats
pub const CACHE_VERSION: u32 = 1;

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Point namespace for articles addressed by id
    pub const ARTICLE: &'static str = "article";

    /// Point namespace for accounts addressed by username
    pub const ACCOUNT_BY_USERNAME: &'static str = "account:username";

    /// Shared article listing snapshot
    /// Format: v1:articles:list
    pub fn article_list() -> String {
        format!("v{}:articles:list", CACHE_VERSION)
    }

    /// Article point entry
    /// Format: v1:article:{id}
    pub fn article(article_id: i32) -> String {
        Self::point(Self::ARTICLE, article_id)
    }

    /// Account point entry keyed by its natural key
    /// Format: v1:account:username:{username}
    pub fn account_by_username(username: &str) -> String {
        Self::point(Self::ACCOUNT_BY_USERNAME, username)
    }

    /// Point entry in an arbitrary namespace
    pub fn point(namespace: &str, id: impl Display) -> String {
        format!("v{}:{}:{}", CACHE_VERSION, namespace, id)
    }

    /// Extract entity type from key
    pub fn entity_type(key: &str) -> Option<&str> {
        let mut parts = key.split(':');
        match (parts.next(), parts.next()) {
            (Some(_), Some(entity)) => Some(entity),
            _ => None,
        }
    }
}
