//! Integration Tests: Article listing snapshot synchronization
//!
//! Runs `ArticleService` against an in-memory article table and cache.
//!
//! Coverage:
//! - Snapshot population and reuse
//! - Create leaves the snapshot stale
//! - Update merges fields into the cached copy
//! - Delete removes the cached copy
//! - Missing ids fail before the cache is touched
//! - One snapshot serves every filter
//! - Cache write failure after a committed store write
//! - Cache read failure degrades to the store
//! - Blank author filter lists every article
//! - Point entries and the snapshot are never reconciled with each other

mod common;

use article_service::models::{Article, ArticleListing, ArticlePatch, ArticleQuery, NewArticle};
use article_service::ErrorKind;
use common::article_harness;
use entity_cache::{CacheKey, CacheStore};

fn title_patch(title: &str) -> ArticlePatch {
    ArticlePatch {
        title: Some(title.to_string()),
        ..Default::default()
    }
}

fn by_author(author: &str) -> ArticleQuery {
    ArticleQuery {
        author: Some(author.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn second_listing_is_served_from_snapshot() {
    let h = article_harness();
    h.store.seed("A", None);
    h.store.seed("B", None);

    let first = h.service.list(ArticleQuery::default()).await.unwrap();
    assert!(matches!(first, ArticleListing::Page(_)));
    assert_eq!(h.store.page_query_count(), 1);

    let second = h.service.list(ArticleQuery::default()).await.unwrap();
    assert!(matches!(second, ArticleListing::Cached(_)));
    assert_eq!(second.articles(), first.articles());
    assert_eq!(h.store.page_query_count(), 1);
}

#[tokio::test]
async fn populate_is_idempotent() {
    let h = article_harness();
    h.store.seed("A", None);

    h.service.list(ArticleQuery::default()).await.unwrap();
    let once = h.cache.get(&CacheKey::article_list()).await.unwrap();

    h.cache.del(&CacheKey::article_list()).await.unwrap();
    h.service.list(ArticleQuery::default()).await.unwrap();
    let twice = h.cache.get(&CacheKey::article_list()).await.unwrap();

    assert!(once.is_some());
    assert_eq!(once, twice);
}

#[tokio::test]
async fn created_article_is_absent_from_snapshot() {
    let h = article_harness();
    h.store.seed("A", None);
    h.service.list(ArticleQuery::default()).await.unwrap();

    let created = h
        .service
        .create(NewArticle {
            title: "Fresh".to_string(),
            content: "new body".to_string(),
            author: None,
        })
        .await
        .unwrap();

    let listing = h.service.list(ArticleQuery::default()).await.unwrap();
    assert!(matches!(listing, ArticleListing::Cached(_)));
    assert!(listing.articles().iter().all(|a| a.id != created.id));
    assert!(h.store.row(created.id).is_some());
}

#[tokio::test]
async fn update_merges_into_cached_copy() {
    let h = article_harness();
    let a = h.store.seed("A", None);
    let b = h.store.seed("B", None);
    h.service.list(ArticleQuery::default()).await.unwrap();

    let updated = h.service.update(a.id, title_patch("A2")).await.unwrap();
    assert_eq!(updated.title, "A2");

    let listing = h.service.list(ArticleQuery::default()).await.unwrap();
    let items = listing.articles();
    assert_eq!(items.len(), 2);
    assert_eq!(items.iter().find(|x| x.id == a.id).unwrap().title, "A2");
    assert_eq!(items.iter().find(|x| x.id == b.id).unwrap().title, "B");
    assert_eq!(h.store.page_query_count(), 1);
}

#[tokio::test]
async fn update_keeps_unpatched_fields() {
    let h = article_harness();
    let a = h.store.seed("A", Some("alice"));
    h.service.list(ArticleQuery::default()).await.unwrap();

    let patch = ArticlePatch {
        content: Some("rewritten".to_string()),
        ..Default::default()
    };
    h.service.update(a.id, patch).await.unwrap();

    let cached = h.service.get_by_id(a.id).await.unwrap();
    assert_eq!(cached.title, "A");
    assert_eq!(cached.content, "rewritten");
    assert_eq!(cached.author.as_deref(), Some("alice"));
}

#[tokio::test]
async fn delete_removes_cached_copy() {
    let h = article_harness();
    let a = h.store.seed("A", None);
    let b = h.store.seed("B", None);
    h.service.list(ArticleQuery::default()).await.unwrap();

    h.service.delete(b.id).await.unwrap();

    let listing = h.service.list(ArticleQuery::default()).await.unwrap();
    let ids: Vec<i32> = listing.articles().iter().map(|x| x.id).collect();
    assert_eq!(ids, vec![a.id]);
    assert!(h.store.row(b.id).is_none());
}

#[tokio::test]
async fn missing_id_fails_before_touching_snapshot() {
    let h = article_harness();
    h.store.seed("A", None);
    h.service.list(ArticleQuery::default()).await.unwrap();
    let before = h.cache.get(&CacheKey::article_list()).await.unwrap();

    let err = h.service.update(999, title_patch("X")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = h.service.delete(999).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let after = h.cache.get(&CacheKey::article_list()).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn missing_id_short_circuits_even_when_cache_is_down() {
    let h = article_harness();
    h.cache.fail_writes(true);

    let err = h.service.update(999, title_patch("X")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn one_snapshot_serves_every_filter() {
    let h = article_harness();
    h.store.seed("by alice", Some("alice"));
    h.store.seed("by bob", Some("bob"));

    let alice = h.service.list(by_author("alice")).await.unwrap();
    assert_eq!(alice.articles().len(), 1);

    let bob = h.service.list(by_author("bob")).await.unwrap();
    assert!(matches!(bob, ArticleListing::Cached(_)));
    assert_eq!(bob.articles(), alice.articles());
    assert_eq!(bob.articles()[0].author.as_deref(), Some("alice"));
}

#[tokio::test]
async fn empty_snapshot_falls_through_to_store() {
    let h = article_harness();
    h.service.list(ArticleQuery::default()).await.unwrap();
    h.store.seed("A", None);

    let listing = h.service.list(ArticleQuery::default()).await.unwrap();
    assert!(matches!(listing, ArticleListing::Page(_)));
    assert_eq!(listing.articles().len(), 1);
    assert_eq!(h.store.page_query_count(), 2);
}

#[tokio::test]
async fn cache_failure_after_update_is_infrastructure() {
    let h = article_harness();
    let a = h.store.seed("A", None);
    h.service.list(ArticleQuery::default()).await.unwrap();

    h.cache.fail_writes(true);
    let err = h.service.update(a.id, title_patch("A2")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Infrastructure);

    // Store committed; the snapshot still has the old copy
    assert_eq!(h.store.row(a.id).unwrap().title, "A2");
    let cached = h.service.get_by_id(a.id).await.unwrap();
    assert_eq!(cached.title, "A");
}

#[tokio::test]
async fn get_by_id_prefers_snapshot_then_store() {
    let h = article_harness();
    let a = h.store.seed("A", None);
    h.service.list(ArticleQuery::default()).await.unwrap();
    let late = h.store.seed("Late", None);

    let cached = h.service.get_by_id(a.id).await.unwrap();
    assert_eq!(cached.id, a.id);
    assert_eq!(h.store.id_lookup_count(), 0);

    let stored = h.service.get_by_id(late.id).await.unwrap();
    assert_eq!(stored.title, "Late");
    assert_eq!(h.store.id_lookup_count(), 1);

    // A store hit is not cached anywhere
    h.service.get_by_id(late.id).await.unwrap();
    assert_eq!(h.store.id_lookup_count(), 2);
    assert!(h.cache.get(&CacheKey::article(late.id)).await.unwrap().is_none());
}

#[tokio::test]
async fn get_by_id_unknown_is_not_found() {
    let h = article_harness();
    let err = h.service.get_by_id(42).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn empty_patch_is_rejected_before_store() {
    let h = article_harness();
    let a = h.store.seed("A", None);

    let err = h
        .service
        .update(a.id, ArticlePatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(h.store.row(a.id).unwrap(), a);
}

#[tokio::test]
async fn invalid_new_article_is_rejected() {
    let h = article_harness();
    let err = h
        .service
        .create(NewArticle {
            title: String::new(),
            content: "body".to_string(),
            author: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn repeated_reads_by_id_agree() {
    let h = article_harness();
    let a = h.store.seed("A", Some("alice"));

    let first = h.service.get_by_id(a.id).await.unwrap();
    let second = h.service.get_by_id(a.id).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, a);
}

#[tokio::test]
async fn unreadable_cache_degrades_to_store() {
    let h = article_harness();
    let a = h.store.seed("A", None);
    h.service.list(ArticleQuery::default()).await.unwrap();

    h.cache.fail_reads(true);
    let listing = h.service.list(ArticleQuery::default()).await.unwrap();
    assert!(matches!(listing, ArticleListing::Page(_)));
    assert_eq!(h.store.page_query_count(), 2);

    let found = h.service.get_by_id(a.id).await.unwrap();
    assert_eq!(found, a);
    assert_eq!(h.store.id_lookup_count(), 1);
}

#[tokio::test]
async fn blank_author_filter_lists_everything() {
    let h = article_harness();
    let anonymous = h.store.seed("anonymous", None);
    h.store.seed("by alice", Some("alice"));

    let query: ArticleQuery = serde_json::from_str(r#"{"author":""}"#).unwrap();
    let listing = h.service.list(query).await.unwrap();
    assert_eq!(listing.articles().len(), 2);
    assert!(listing.articles().iter().any(|a| a.id == anonymous.id));

    // A blank filter built in code is treated the same way
    h.cache.del(&CacheKey::article_list()).await.unwrap();
    let listing = h.service.list(by_author("  ")).await.unwrap();
    assert_eq!(listing.articles().len(), 2);
}

#[tokio::test]
async fn point_entry_serves_reads_and_is_not_reconciled() {
    let h = article_harness();
    let a = h.store.seed("A", None);

    let stale = Article {
        title: "STALE".to_string(),
        ..a.clone()
    };
    h.cache
        .set_ex(
            &CacheKey::article(a.id),
            &serde_json::to_string(&stale).unwrap(),
            3600,
        )
        .await
        .unwrap();

    let found = h.service.get_by_id(a.id).await.unwrap();
    assert_eq!(found.title, "STALE");
    assert_eq!(h.store.id_lookup_count(), 0);

    h.service.update(a.id, title_patch("NEW")).await.unwrap();
    assert_eq!(h.store.row(a.id).unwrap().title, "NEW");

    let found = h.service.get_by_id(a.id).await.unwrap();
    assert_eq!(found.title, "STALE");
    assert_eq!(h.store.id_lookup_count(), 0);
}
