use super::ArticleStore;
use crate::error::Result;
use crate::models::{Article, ArticlePatch, ArticleQuery, NewArticle};
use async_trait::async_trait;
use sqlx::PgPool;

const ARTICLE_COLUMNS: &str = "id, title, content, author, created_at";

/// PostgreSQL article repository
#[derive(Clone)]
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn insert(&self, article: &NewArticle) -> Result<Article> {
        let created = sqlx::query_as::<_, Article>(&format!(
            r#"
            INSERT INTO article (title, content, author)
            VALUES ($1, $2, $3)
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.author.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM article WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(article)
    }

    async fn find_page(&self, query: &ArticleQuery, per_page: i64) -> Result<(Vec<Article>, i64)> {
        let author_pattern = query.author_pattern();

        // ORDER BY direction comes from a closed enum, never from user text
        let articles = sqlx::query_as::<_, Article>(&format!(
            r#"
            SELECT {ARTICLE_COLUMNS}
            FROM article
            WHERE ($1::text IS NULL OR author LIKE $1 ESCAPE '\')
            ORDER BY created_at {order}, id {order}
            LIMIT $2 OFFSET $3
            "#,
            order = query.order.as_sql()
        ))
        .bind(author_pattern.as_deref())
        .bind(per_page)
        .bind(query.offset(per_page))
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r"SELECT COUNT(*) FROM article WHERE ($1::text IS NULL OR author LIKE $1 ESCAPE '\')",
        )
        .bind(author_pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((articles, total))
    }

    async fn update(&self, id: i32, patch: &ArticlePatch) -> Result<Option<Article>> {
        let updated = sqlx::query_as::<_, Article>(&format!(
            r#"
            UPDATE article
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                author = COALESCE($4, author)
            WHERE id = $1
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.content.as_deref())
        .bind(patch.author.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM article WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
