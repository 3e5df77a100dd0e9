/// Account service - registration and login with a username point cache
use crate::db::AccountStore;
use crate::error::{AppError, Result};
use crate::models::{AccessToken, Account, Credentials};
use crate::security::{PasswordHasher, TokenIssuer};
use entity_cache::{CacheKey, CacheStore, PointCacheSync};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

pub struct AccountService {
    store: Arc<dyn AccountStore>,
    point_cache: PointCacheSync<Account>,
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        cache: Arc<dyn CacheStore>,
        hasher: PasswordHasher,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            store,
            point_cache: PointCacheSync::new(cache, CacheKey::ACCOUNT_BY_USERNAME),
            hasher,
            tokens,
        }
    }

    /// Create an account and cache it under its username
    pub async fn register(&self, credentials: Credentials) -> Result<AccessToken> {
        credentials.validate()?;

        if self
            .store
            .find_by_username(&credentials.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = self.hasher.hash(&credentials.password)?;
        let account = self
            .store
            .insert(&credentials.username, &password_hash)
            .await?;

        self.point_cache
            .populate(&account.username, &account)
            .await?;

        info!(account_id = account.id, "Account registered");
        self.tokens.issue(&account)
    }

    /// Check credentials against the cached account, or the store on a miss
    pub async fn authenticate(&self, credentials: Credentials) -> Result<AccessToken> {
        credentials.validate()?;

        let account = match self.point_cache.read(&credentials.username).await {
            Some(account) => {
                debug!(account_id = account.id, "Account served from point entry");
                account
            }
            None => self
                .store
                .find_by_username(&credentials.username)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?,
        };

        if !self
            .hasher
            .verify(&credentials.password, &account.password_hash)?
        {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        self.point_cache
            .populate(&account.username, &account)
            .await?;

        self.tokens.issue(&account)
    }
}
