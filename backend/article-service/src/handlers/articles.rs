/// Article handlers - HTTP endpoints for article operations
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::{ArticlePatch, ArticleQuery, NewArticle};
use crate::services::ArticleService;
use actix_web::{web, HttpResponse};

/// Create a new article
pub async fn create_article(
    service: web::Data<ArticleService>,
    user: AuthenticatedUser,
    req: web::Json<NewArticle>,
) -> Result<HttpResponse> {
    tracing::debug!(account_id = user.account_id, "create_article");
    let article = service.create(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(article))
}

/// List articles (public)
pub async fn list_articles(
    service: web::Data<ArticleService>,
    query: web::Query<ArticleQuery>,
) -> Result<HttpResponse> {
    let listing = service.list(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

/// Get an article by ID
pub async fn get_article(
    service: web::Data<ArticleService>,
    _user: AuthenticatedUser,
    article_id: web::Path<i32>,
) -> Result<HttpResponse> {
    let article = service.get_by_id(article_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(article))
}

/// Update an article
pub async fn update_article(
    service: web::Data<ArticleService>,
    _user: AuthenticatedUser,
    article_id: web::Path<i32>,
    req: web::Json<ArticlePatch>,
) -> Result<HttpResponse> {
    let article = service
        .update(article_id.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(article))
}

/// Delete an article
pub async fn delete_article(
    service: web::Data<ArticleService>,
    _user: AuthenticatedUser,
    article_id: web::Path<i32>,
) -> Result<HttpResponse> {
    service.delete(article_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
