//! Redis-backed effective permission cache.
//!
//! Keys embed a generation counter so `invalidate_all` is a single `INCR`;
//! entries of older generations simply age out through their TTL.

use async_trait::async_trait;
use innkeep_application::PermissionCache;
use innkeep_core::{AppError, AppResult, UserId};
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

/// Redis implementation of the permission cache port.
#[derive(Clone)]
pub struct RedisPermissionCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisPermissionCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn generation_key(&self) -> String {
        format!("{}:generation", self.key_prefix)
    }

    fn key_for(&self, generation: i64, user_id: UserId) -> String {
        format!("{}:{generation}:user={user_id}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }

    async fn generation(&self, connection: &mut MultiplexedConnection) -> AppResult<i64> {
        let generation: Option<i64> = connection
            .get(self.generation_key())
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read permission cache generation: {error}"))
            })?;

        Ok(generation.unwrap_or_default())
    }

    fn encode_permissions(permissions: &[String]) -> AppResult<String> {
        serde_json::to_string(permissions).map_err(|error| {
            AppError::Internal(format!("failed to encode permission cache entry: {error}"))
        })
    }

    fn decode_permissions(value: &str) -> AppResult<Vec<String>> {
        serde_json::from_str(value).map_err(|error| {
            AppError::Internal(format!(
                "invalid permission cache value '{value}': {error}"
            ))
        })
    }
}

#[async_trait]
impl PermissionCache for RedisPermissionCache {
    async fn get_permissions(&self, user_id: UserId) -> AppResult<Option<Vec<String>>> {
        let mut connection = self.connection().await?;
        let generation = self.generation(&mut connection).await?;

        let encoded: Option<String> = connection
            .get(self.key_for(generation, user_id))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read permission cache entry: {error}"))
            })?;

        encoded.as_deref().map(Self::decode_permissions).transpose()
    }

    async fn set_permissions(
        &self,
        user_id: UserId,
        permissions: Vec<String>,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let value = Self::encode_permissions(&permissions)?;
        let mut connection = self.connection().await?;
        let generation = self.generation(&mut connection).await?;

        connection
            .set_ex(
                self.key_for(generation, user_id),
                value,
                u64::from(ttl_seconds),
            )
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write permission cache entry: {error}"))
            })
    }

    async fn invalidate(&self, user_id: UserId) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let generation = self.generation(&mut connection).await?;

        connection
            .del(self.key_for(generation, user_id))
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to invalidate permission cache entry: {error}"
                ))
            })
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        let mut connection = self.connection().await?;

        let _: i64 = connection
            .incr(self.generation_key(), 1)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to advance permission cache generation: {error}"
                ))
            })?;

        Ok(())
    }
}
