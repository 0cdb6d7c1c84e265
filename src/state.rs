use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::auth::users::StaticUser;
use crate::config::AppConfig;
use crate::relay::client::{HttpRelayClient, RelayClient};
use crate::relay::repo::{EncryptedTextRepo, PgEncryptedTextRepo};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub user: Arc<StaticUser>,
    pub texts: Arc<dyn EncryptedTextRepo>,
    pub upstream: Arc<dyn RelayClient>,
}

impl AppState {
    /// Connects to the database and builds the outbound HTTP client.
    /// Returns the pool too so the caller can run migrations on it.
    pub async fn init() -> anyhow::Result<(Self, PgPool)> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let texts = Arc::new(PgEncryptedTextRepo::new(db.clone())) as Arc<dyn EncryptedTextRepo>;
        let upstream = Arc::new(
            HttpRelayClient::new(config.upstream.clone()).context("build upstream client")?,
        ) as Arc<dyn RelayClient>;

        Ok((Self::from_parts(config, texts, upstream), db))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        texts: Arc<dyn EncryptedTextRepo>,
        upstream: Arc<dyn RelayClient>,
    ) -> Self {
        let user = Arc::new(StaticUser::from_config(&config.user));
        Self {
            config,
            user,
            texts,
            upstream,
        }
    }
}
