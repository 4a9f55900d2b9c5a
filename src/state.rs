use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::bot::api::{BotApi, Notifier};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub bot: BotApi,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        let bot = BotApi::new(&config.bot_token)?;
        let notifier = Arc::new(bot.clone()) as Arc<dyn Notifier>;
        Ok(Self {
            db,
            config,
            bot,
            notifier,
        })
    }

    pub fn from_parts(
        db: SqlitePool,
        config: Arc<AppConfig>,
        bot: BotApi,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            config,
            bot,
            notifier,
        }
    }

    #[cfg(test)]
    pub fn fake(db: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        let config = Arc::new(AppConfig {
            bot_token: "1234567:test-token".into(),
            admin_id: 1,
            webapp_url: "https://example.test/".into(),
            database_url: "sqlite::memory:".into(),
            port: 8080,
        });
        let bot = BotApi::new(&config.bot_token).expect("bot client");
        Self::from_parts(db, config, bot, notifier)
    }
}
