//! Persisted client state: the bearer token and the last-known profile.

pub mod repository;

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::AppError;
use crate::models::User;

pub const TOKEN_KEY: &str = "access_token";
pub const PROFILE_KEY: &str = "user";

#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load_token(&self) -> Result<Option<String>, AppError>;
    async fn save_token(&self, token: &str) -> Result<(), AppError>;
    async fn load_profile(&self) -> Result<Option<User>, AppError>;
    async fn save_profile(&self, user: &User) -> Result<(), AppError>;
    /// Removes token and profile. Clearing empty storage is not an error.
    async fn clear(&self) -> Result<(), AppError>;
}

pub struct SqliteSessionStorage {
    db: SqlitePool,
}

impl SqliteSessionStorage {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        // One long-lived connection so `sqlite::memory:` keeps its data.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(db: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .map_err(|e| AppError::Database(e.into()))?;
        Ok(Self { db })
    }
}

#[async_trait]
impl SessionStorage for SqliteSessionStorage {
    async fn load_token(&self) -> Result<Option<String>, AppError> {
        Ok(repository::fetch_value(&self.db, TOKEN_KEY).await?)
    }

    async fn save_token(&self, token: &str) -> Result<(), AppError> {
        Ok(repository::upsert_value(&self.db, TOKEN_KEY, token).await?)
    }

    async fn load_profile(&self) -> Result<Option<User>, AppError> {
        let Some(raw) = repository::fetch_value(&self.db, PROFILE_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("discarding unreadable stored profile: {}", e);
                repository::delete_values(&self.db, &[PROFILE_KEY]).await?;
                Ok(None)
            }
        }
    }

    async fn save_profile(&self, user: &User) -> Result<(), AppError> {
        let raw = serde_json::to_string(user).map_err(|_| AppError::InternalServerError)?;
        Ok(repository::upsert_value(&self.db, PROFILE_KEY, &raw).await?)
    }

    async fn clear(&self) -> Result<(), AppError> {
        repository::delete_values(&self.db, &[TOKEN_KEY, PROFILE_KEY]).await?;
        Ok(())
    }
}

/// Non-persistent storage for tests and throwaway sessions.
#[derive(Default)]
pub struct MemorySessionStorage {
    values: RwLock<HashMap<&'static str, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load_token(&self) -> Result<Option<String>, AppError> {
        Ok(self.values.read().await.get(TOKEN_KEY).cloned())
    }

    async fn save_token(&self, token: &str) -> Result<(), AppError> {
        self.values.write().await.insert(TOKEN_KEY, token.to_string());
        Ok(())
    }

    async fn load_profile(&self) -> Result<Option<User>, AppError> {
        let values = self.values.read().await;
        Ok(values
            .get(PROFILE_KEY)
            .and_then(|raw| serde_json::from_str(raw).ok()))
    }

    async fn save_profile(&self, user: &User) -> Result<(), AppError> {
        let raw = serde_json::to_string(user).map_err(|_| AppError::InternalServerError)?;
        self.values.write().await.insert(PROFILE_KEY, raw);
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        let mut values = self.values.write().await;
        values.remove(TOKEN_KEY);
        values.remove(PROFILE_KEY);
        Ok(())
    }
}
