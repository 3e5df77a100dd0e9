/// HTTP request handlers
pub mod articles;
pub mod auth;
pub mod health;

pub use articles::{create_article, delete_article, get_article, list_articles, update_article};
pub use auth::{login, register};

use actix_web::web;

/// Mount the `/api/v1` article and auth routes.
///
/// Expects `web::Data<ArticleService>`, `web::Data<AccountService>` and
/// `web::Data<Arc<TokenIssuer>>` as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login)),
            )
            .service(
                web::scope("/articles")
                    .service(
                        web::resource("")
                            .route(web::get().to(list_articles))
                            .route(web::post().to(create_article)),
                    )
                    .service(
                        web::resource("/{article_id}")
                            .route(web::get().to(get_article))
                            .route(web::put().to(update_article))
                            .route(web::delete().to(delete_article)),
                    ),
            ),
    );
}
