use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bot_token: String,
    pub admin_id: i64,
    pub webapp_url: String,
    pub database_url: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bot_token =
            std::env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN must be set"))?;
        Ok(Self {
            bot_token,
            admin_id: std::env::var("ADMIN_ID")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(570_269_160),
            webapp_url: std::env::var("WEBAPP_URL")
                .unwrap_or_else(|_| "https://akfazakazbot.netlify.app/".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://zakaz.db?mode=rwc".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
        })
    }
}
