/// Auth handlers - registration and login
use crate::error::Result;
use crate::models::Credentials;
use crate::services::AccountService;
use actix_web::{web, HttpResponse};

pub async fn register(
    service: web::Data<AccountService>,
    req: web::Json<Credentials>,
) -> Result<HttpResponse> {
    let token = service.register(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(token))
}

pub async fn login(
    service: web::Data<AccountService>,
    req: web::Json<Credentials>,
) -> Result<HttpResponse> {
    let token = service.authenticate(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(token))
}
