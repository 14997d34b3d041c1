//! Redis client implementation
//!
//! Wraps a multiplexed connection for single commands and hands out
//! dedicated connections for optimistic transactions, since WATCH state
//! belongs to a connection and cannot be shared. Transaction connections come
//! from a bounded pool and are reused; one whose transaction did not finish
//! cleanly is dropped instead of being returned, so a late reply can never be
//! read by the next transaction.

use redis::{
    aio::{Connection, MultiplexedConnection},
    Client, ErrorKind, RedisError, RedisResult,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::cache::CacheConfig;
use crate::InfrastructureError;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis client with connection retry, per-call timeouts and key layout
#[derive(Clone)]
pub struct RedisClient {
    client: Client,
    /// Redis multiplexed connection for single commands
    connection: MultiplexedConnection,
    transactions: Arc<TransactionPool>,
    config: CacheConfig,
}

/// Idle dedicated connections plus a permit per connection that may exist
struct TransactionPool {
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
}

/// A dedicated connection checked out of the pool.
///
/// Dropping it closes the connection; only [`release`](Self::release) puts it
/// back for reuse.
pub struct TransactionConnection {
    conn: Connection,
    pool: Arc<TransactionPool>,
    _permit: OwnedSemaphorePermit,
}

impl TransactionConnection {
    pub fn connection(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Return the connection to the pool; call only after a transaction that
    /// left no WATCH and no pending reply behind
    pub fn release(self) {
        let mut idle = self.pool.idle.lock().unwrap_or_else(|e| e.into_inner());
        idle.push(self.conn);
    }
}

impl RedisClient {
    /// Connect using `config`, retrying with exponential backoff
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!("Creating Redis client with URL: {}", mask_url(&config.url));

        // Parse Redis URL and create client
        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(&client, &config).await?;

        info!("Redis client created successfully");

        let transactions = Arc::new(TransactionPool {
            idle: Mutex::new(Vec::new()),
            permits: Arc::new(Semaphore::new(config.transaction_pool_size.max(1))),
        });

        Ok(Self {
            client,
            connection,
            transactions,
            config,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Shared connection for single commands and scans
    pub fn multiplexed(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// Bound for a single round trip
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.config.response_timeout_ms)
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = config.retry_delay_ms;
        let connect_timeout = Duration::from_millis(config.connection_timeout_ms);

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let result = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result,
                Err(_) => Err(timed_out()),
            };

            match result {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < config.max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, config.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!(
                        "Failed to connect to Redis after {} attempts: {}",
                        attempts, e
                    );
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Check out a dedicated connection for a WATCH/MULTI/EXEC transaction
    ///
    /// Reuses an idle pooled connection when there is one; waits for a free
    /// slot when all of them are in use.
    pub async fn transaction_connection(&self) -> Result<TransactionConnection, InfrastructureError> {
        let connect_timeout = Duration::from_millis(self.config.connection_timeout_ms);
        let permit = match timeout(
            connect_timeout,
            self.transactions.permits.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) | Err(_) => {
                warn!("No transaction connection available");
                return Err(InfrastructureError::Timeout("transaction pool".to_string()));
            }
        };

        let reused = self
            .transactions
            .idle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop();
        let conn = match reused {
            Some(conn) => conn,
            None => match timeout(connect_timeout, self.client.get_async_connection()).await {
                Ok(Ok(conn)) => {
                    debug!("Opened transaction connection");
                    conn
                }
                Ok(Err(e)) => {
                    error!("Failed to open transaction connection: {}", e);
                    return Err(InfrastructureError::Cache(e));
                }
                Err(_) => {
                    error!("Timed out opening transaction connection");
                    return Err(InfrastructureError::Timeout("connect".to_string()));
                }
            },
        };

        Ok(TransactionConnection {
            conn,
            pool: self.transactions.clone(),
            _permit: permit,
        })
    }

    /// Pooled transaction connections currently idle
    pub fn idle_transaction_connections(&self) -> usize {
        self.transactions
            .idle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Run `fut` bounded by the response timeout
    pub async fn timed<T, F>(&self, fut: F) -> RedisResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match timeout(self.response_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(timed_out()),
        }
    }

    /// Execute a Redis operation on the shared connection with retry logic
    ///
    /// Each attempt is bounded by the response timeout; transient failures are
    /// retried with exponential backoff.
    pub async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match self.timed(operation(conn)).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.config.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.config.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!(
                        "Redis operation failed after {} attempts: {}",
                        attempts, e
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move {
                    redis::cmd("PING").query_async::<_, String>(&mut conn).await
                })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => {
                debug!("Redis health check passed");
                Ok(true)
            }
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }
}

fn timed_out() -> RedisError {
    RedisError::from((ErrorKind::IoError, "Redis call timed out"))
}

/// Check if a Redis error is retriable
///
/// Determines if an error is transient and the operation should be retried.
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        ErrorKind::IoError | ErrorKind::BusyLoadingError | ErrorKind::TryAgain
    )
}

/// Mask sensitive parts of Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
