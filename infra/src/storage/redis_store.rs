//! Redis storage backend
//!
//! Keys follow `<prefix>:<namespace>:<key>:`. Scalar records are plain
//! strings and structured records are hashes with named fields. Every
//! read-modify-write runs as WATCH, read, MULTI/EXEC on a connection checked
//! out of the client's transaction pool; an aborted EXEC is retried a bounded
//! number of times and then reported as a failure, never as success.

use async_trait::async_trait;
use redis::aio::{Connection, MultiplexedConnection};
use redis::{RedisError, RedisResult};
use std::marker::PhantomData;
use tracing::{debug, error, warn};

use sv_core::errors::{DomainError, DomainResult};
use sv_core::repositories::{
    Change, ExpiryFn, RecordShape, StorageBackend, StoredRecord, UpdateFn, Updated,
};

use crate::cache::RedisClient;

/// What a key holds, as seen inside a transaction
enum Stored<R> {
    Missing,
    Valid(R),
    /// Present but not decodable as `R`
    Corrupt,
}

impl<R> Stored<R> {
    fn record(&self) -> Option<&R> {
        match self {
            Stored::Valid(record) => Some(record),
            _ => None,
        }
    }

    fn into_record(self) -> Option<R> {
        match self {
            Stored::Valid(record) => Some(record),
            _ => None,
        }
    }
}

type DecideFn<'a, R> = &'a (dyn Fn(&Stored<R>) -> Change<R> + Send + Sync);

/// Redis-backed store for one record type
pub struct RedisStore<R> {
    client: RedisClient,
    _record: PhantomData<fn() -> R>,
}

impl<R: StoredRecord> RedisStore<R> {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }

    fn full_key(&self, key: &str) -> String {
        self.client.config().make_key(R::NAMESPACE, key)
    }

    fn failure(&self, operation: &str, key: &str, err: RedisError) -> DomainError {
        error!(
            namespace = R::NAMESPACE,
            key = %key,
            operation,
            error = %err,
            "Redis storage operation failed"
        );
        DomainError::storage(operation, key, err.to_string())
    }

    /// Read the raw values of `full_key` in shape order
    async fn read<C>(conn: &mut C, full_key: &str) -> RedisResult<Stored<R>>
    where
        C: redis::aio::ConnectionLike + Send,
    {
        let values: Vec<Option<String>> = match R::SHAPE {
            RecordShape::Scalar => {
                let value: Option<String> =
                    redis::cmd("GET").arg(full_key).query_async(conn).await?;
                vec![value]
            }
            RecordShape::Fields(fields) => {
                redis::cmd("HMGET")
                    .arg(full_key)
                    .arg(fields)
                    .query_async(conn)
                    .await?
            }
        };

        if values.iter().all(Option::is_none) {
            return Ok(Stored::Missing);
        }
        let present: Option<Vec<String>> = values.into_iter().collect();
        Ok(match present.as_deref().and_then(R::decode) {
            Some(record) => Stored::Valid(record),
            None => Stored::Corrupt,
        })
    }

    /// Queue the commands that write `record` under `full_key`
    fn queue_write(pipe: &mut redis::Pipeline, full_key: &str, record: &R) {
        let values = record.encode();
        match R::SHAPE {
            RecordShape::Scalar => {
                if let Some(value) = values.first() {
                    pipe.set(full_key, value).ignore();
                }
            }
            RecordShape::Fields(fields) => {
                let pairs: Vec<(&str, &String)> = fields.iter().copied().zip(values.iter()).collect();
                pipe.del(full_key).ignore();
                pipe.hset_multiple(full_key, &pairs).ignore();
            }
        }
    }

    /// WATCH, read, decide and EXEC on `full_key`, retrying on conflict
    async fn transact(
        &self,
        conn: &mut Connection,
        operation: &str,
        full_key: &str,
        decide: DecideFn<'_, R>,
    ) -> DomainResult<Updated<R>> {
        let max_attempts = self.client.config().max_conflict_retries + 1;

        for attempt in 1..=max_attempts {
            self.client
                .timed(redis::cmd("WATCH").arg(full_key).query_async::<_, ()>(conn))
                .await
                .map_err(|e| self.failure(operation, full_key, e))?;

            let stored = self
                .client
                .timed(Self::read(conn, full_key))
                .await
                .map_err(|e| self.failure(operation, full_key, e))?;
            if let Stored::Corrupt = stored {
                warn!(namespace = R::NAMESPACE, key = %full_key, "Undecodable record in Redis");
            }

            let change = decide(&stored);
            if matches!(change, Change::Keep) {
                self.client
                    .timed(redis::cmd("UNWATCH").query_async::<_, ()>(conn))
                    .await
                    .map_err(|e| self.failure(operation, full_key, e))?;
                return Ok(Updated {
                    previous: stored.into_record(),
                    change,
                });
            }

            let mut pipe = redis::pipe();
            pipe.atomic();
            match &change {
                Change::Keep => {}
                Change::Put(record) => Self::queue_write(&mut pipe, full_key, record),
                Change::Delete => {
                    pipe.del(full_key).ignore();
                }
            }

            let committed: Option<()> = self
                .client
                .timed(pipe.query_async(conn))
                .await
                .map_err(|e| self.failure(operation, full_key, e))?;

            match committed {
                Some(()) => {
                    return Ok(Updated {
                        previous: stored.into_record(),
                        change,
                    })
                }
                None => warn!(
                    namespace = R::NAMESPACE,
                    key = %full_key,
                    attempt,
                    max_attempts,
                    "Redis transaction aborted by a concurrent write"
                ),
            }
        }

        error!(
            namespace = R::NAMESPACE,
            key = %full_key,
            operation,
            "Redis transaction kept conflicting, giving up"
        );
        Err(DomainError::storage(operation, full_key, "conflict"))
    }

    /// [`transact`](Self::transact) on a pooled connection.
    ///
    /// The connection goes back to the pool only after a clean run. After an
    /// error (a timeout may leave a reply in flight or a WATCH active) it is
    /// closed, and the same happens when this future is dropped midway.
    async fn transact_pooled(
        &self,
        operation: &str,
        full_key: &str,
        decide: DecideFn<'_, R>,
    ) -> DomainResult<Updated<R>> {
        let mut tx = self.client.transaction_connection().await?;
        let result = self
            .transact(tx.connection(), operation, full_key, decide)
            .await;
        if result.is_ok() {
            tx.release();
        }
        result
    }

    async fn scan_batch(
        &self,
        conn: &mut MultiplexedConnection,
        cursor: u64,
        pattern: &str,
    ) -> DomainResult<(u64, Vec<String>)> {
        self.client
            .timed(
                redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(self.client.config().scan_batch_size)
                    .query_async(conn),
            )
            .await
            .map_err(|e| self.failure("scan", pattern, e))
    }
}

#[async_trait]
impl<R: StoredRecord> StorageBackend<R> for RedisStore<R> {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn store(&self, key: &str, record: &R) -> DomainResult<()> {
        let full_key = self.full_key(key);
        let record = record.clone();
        let target = full_key.clone();

        self.client
            .execute_with_retry(move |mut conn| {
                let full_key = target.clone();
                let record = record.clone();
                Box::pin(async move {
                    let mut pipe = redis::pipe();
                    pipe.atomic();
                    Self::queue_write(&mut pipe, &full_key, &record);
                    pipe.query_async::<_, ()>(&mut conn).await
                })
            })
            .await
            .map_err(|e| self.failure("store", &full_key, e))?;

        debug!(namespace = R::NAMESPACE, "Record stored");
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> DomainResult<Option<R>> {
        let full_key = self.full_key(key);
        let target = full_key.clone();

        let stored = self
            .client
            .execute_with_retry(move |mut conn| {
                let full_key = target.clone();
                Box::pin(async move { Self::read(&mut conn, &full_key).await })
            })
            .await
            .map_err(|e| self.failure("retrieve", &full_key, e))?;

        if let Stored::Corrupt = stored {
            warn!(namespace = R::NAMESPACE, key = %full_key, "Undecodable record in Redis");
        }
        Ok(stored.into_record())
    }

    async fn remove(&self, key: &str) -> DomainResult<bool> {
        let full_key = self.full_key(key);
        let target = full_key.clone();

        let deleted: u32 = self
            .client
            .execute_with_retry(move |mut conn| {
                let full_key = target.clone();
                Box::pin(async move { redis::cmd("DEL").arg(full_key).query_async(&mut conn).await })
            })
            .await
            .map_err(|e| self.failure("remove", &full_key, e))?;
        Ok(deleted > 0)
    }

    async fn update(&self, key: &str, apply: UpdateFn<'_, R>) -> DomainResult<Updated<R>> {
        let full_key = self.full_key(key);
        self.transact_pooled("update", &full_key, &|stored| apply(stored.record()))
            .await
    }

    async fn remove_expired(&self, is_expired: ExpiryFn<'_, R>) -> DomainResult<usize> {
        let pattern = self.client.config().namespace_pattern(R::NAMESPACE);
        let mut scan_conn = self.client.multiplexed();
        let decide = |stored: &Stored<R>| match stored {
            Stored::Valid(record) if is_expired(record) => Change::Delete,
            Stored::Corrupt => Change::Delete,
            _ => Change::Keep,
        };

        let mut cursor = 0u64;
        let mut removed = 0;
        loop {
            let (next, keys) = self.scan_batch(&mut scan_conn, cursor, &pattern).await?;

            for full_key in keys {
                match self
                    .transact_pooled("remove_expired", &full_key, &decide)
                    .await
                {
                    Ok(Updated {
                        change: Change::Delete,
                        ..
                    }) => removed += 1,
                    Ok(_) => {}
                    // One stubborn key does not abort the sweep
                    Err(e) => warn!(key = %full_key, error = %e, "Skipping key during sweep"),
                }
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(namespace = R::NAMESPACE, removed, "Redis sweep finished");
        Ok(removed)
    }
}
