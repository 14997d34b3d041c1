//! Application context construction
//!
//! Picks the storage backend once at startup and wires the canonicalizer,
//! rate limiter, token manager, cleanup and verification services on top of
//! it. Nothing switches backend after this point.

use std::sync::Arc;
use tracing::info;

use sv_core::domain::{IpLimit, PhoneLimit, TokenRecord};
use sv_core::repositories::{StorageBackend, StoredRecord};
use sv_core::services::{
    Canonicalizer, CleanupService, Clock, RateLimitPolicy, RateLimiter, SmsSender, SystemClock,
    TokenConfig, TokenManager, VerificationService, VerificationServiceConfig,
};
use sv_shared::{AppConfig, StorageKind};

use crate::cache::RedisClient;
use crate::sms::LoggingSender;
use crate::storage::{MemoryStore, RedisStore};
use crate::InfrastructureError;


/// Every long-lived service of a running verifier
#[derive(Clone)]
pub struct AppContext {
    pub canonicalizer: Arc<Canonicalizer>,
    pub rate_limiter: Arc<RateLimiter>,
    pub token_manager: Arc<TokenManager>,
    pub cleanup: Arc<CleanupService>,
    pub verification: Arc<VerificationService>,
    /// Present when the Redis backend is selected
    pub redis: Option<RedisClient>,
}

impl AppContext {
    /// Name of the selected backend, as reported by its stores
    pub fn backend_name(&self) -> &'static str {
        if self.redis.is_some() {
            "redis"
        } else {
            "memory"
        }
    }
}

/// One store per record type, all on the same backend
struct Stores {
    ip: Arc<dyn StorageBackend<IpLimit>>,
    phone: Arc<dyn StorageBackend<PhoneLimit>>,
    tokens: Arc<dyn StorageBackend<TokenRecord>>,
}

impl Stores {
    fn memory() -> Self {
        Self {
            ip: Arc::new(MemoryStore::<IpLimit>::new()),
            phone: Arc::new(MemoryStore::<PhoneLimit>::new()),
            tokens: Arc::new(MemoryStore::<TokenRecord>::new()),
        }
    }

    fn redis(client: &RedisClient) -> Self {
        fn store<R: StoredRecord>(client: &RedisClient) -> Arc<dyn StorageBackend<R>> {
            Arc::new(RedisStore::<R>::new(client.clone()))
        }
        Self {
            ip: store(client),
            phone: store(client),
            tokens: store(client),
        }
    }
}

/// Build the context with the logging sender and the system clock
pub async fn build_context(config: &AppConfig) -> Result<AppContext, InfrastructureError> {
    build_context_with(config, Arc::new(LoggingSender::new()), Arc::new(SystemClock)).await
}

/// Build the context with an explicit sender and clock
pub async fn build_context_with(
    config: &AppConfig,
    sender: Arc<dyn SmsSender>,
    clock: Arc<dyn Clock>,
) -> Result<AppContext, InfrastructureError> {
    config.validate()?;

    let (stores, redis) = match config.storage.kind {
        StorageKind::Memory => (Stores::memory(), None),
        StorageKind::Redis => {
            let client = RedisClient::new(config.cache.clone()).await?;
            client.health_check().await?;
            (Stores::redis(&client), Some(client))
        }
    };
    info!(backend = %config.storage.kind, "Storage backend selected");

    let canonicalizer = Arc::new(Canonicalizer::from_config(&config.verification)?);
    let rate_limiter = Arc::new(RateLimiter::new(
        stores.ip,
        stores.phone,
        RateLimitPolicy::from_config(&config.rate_limit)?,
        clock.clone(),
    ));
    let token_manager = Arc::new(TokenManager::new(
        stores.tokens,
        TokenConfig::from_config(&config.verification),
        clock,
    ));
    let cleanup = Arc::new(CleanupService::new(
        rate_limiter.clone(),
        token_manager.clone(),
        config.cleanup.clone(),
    ));
    let verification = Arc::new(VerificationService::new(
        canonicalizer.clone(),
        rate_limiter.clone(),
        token_manager.clone(),
        sender,
        VerificationServiceConfig::from_config(&config.verification),
    ));

    Ok(AppContext {
        canonicalizer,
        rate_limiter,
        token_manager,
        cleanup,
        verification,
        redis,
    })
}
