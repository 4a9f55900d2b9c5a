use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::trace;

use super::types::{Message, Update};

/// Callback data attached to the forward button on admin notifications.
pub const FORWARD_CALLBACK: &str = "fwd";

const FORWARD_BUTTON: &str = "📤 Переслать";

#[derive(Debug, Error)]
pub enum BotApiError {
    #[error("failed to initialize the bot client: {0}")]
    Initialization(String),
    #[error("Bot API request failed: {0}")]
    RequestError(String),
    #[error("Bot API error {code}: {description}")]
    Api { code: i64, description: String },
    #[error("could not decode Bot API response: {0}")]
    JsonError(String),
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

/// Thin Telegram Bot API client over long polling.
#[derive(Clone)]
pub struct BotApi {
    token: String,
    client: Arc<Client>,
}

impl BotApi {
    pub fn new(token: &str) -> Result<Self, BotApiError> {
        let client = Client::builder()
            .build()
            .map_err(|e| BotApiError::Initialization(e.to_string()))?;
        Ok(Self {
            token: token.to_string(),
            client: Arc::new(client),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.token)
    }

    async fn call<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, BotApiError> {
        trace!("calling Bot API method {method}");
        let response = self
            .client
            .post(self.url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| BotApiError::RequestError(e.to_string()))?;
        let envelope = response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|e| BotApiError::JsonError(e.to_string()))?;
        if envelope.ok {
            envelope
                .result
                .ok_or_else(|| BotApiError::JsonError("ok response without result".into()))
        } else {
            Err(BotApiError::Api {
                code: envelope.error_code.unwrap_or_default(),
                description: envelope
                    .description
                    .unwrap_or_else(|| "unknown error".into()),
            })
        }
    }

    pub async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>, BotApiError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, BotApiError> {
        self.call("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await
    }

    pub async fn send_message_with_markup(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Value,
    ) -> Result<Message, BotApiError> {
        self.call(
            "sendMessage",
            &json!({ "chat_id": chat_id, "text": text, "reply_markup": reply_markup }),
        )
        .await
    }

    pub async fn forward_message(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
    ) -> Result<Message, BotApiError> {
        self.call(
            "forwardMessage",
            &json!({
                "chat_id": chat_id,
                "from_chat_id": from_chat_id,
                "message_id": message_id,
            }),
        )
        .await
    }

    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: &str,
    ) -> Result<bool, BotApiError> {
        self.call(
            "answerCallbackQuery",
            &json!({ "callback_query_id": callback_query_id, "text": text }),
        )
        .await
    }
}

/// Admin-notification delivery seam. The order service talks to this trait so
/// tests can swap in a recording fake.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a new-order notification with the forward action attached.
    async fn notify_new_order(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;
    /// Deliver a generic failure alert.
    async fn notify_alert(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;
    /// Re-deliver a previously sent notification message to `chat_id`.
    async fn forward(&self, chat_id: i64, from_chat_id: i64, message_id: i64)
        -> anyhow::Result<()>;
}

#[async_trait]
impl Notifier for BotApi {
    async fn notify_new_order(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        let markup = json!({
            "inline_keyboard": [[{ "text": FORWARD_BUTTON, "callback_data": FORWARD_CALLBACK }]],
        });
        self.send_message_with_markup(chat_id, text, markup).await?;
        Ok(())
    }

    async fn notify_alert(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.send_message(chat_id, text).await?;
        Ok(())
    }

    async fn forward(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
    ) -> anyhow::Result<()> {
        self.forward_message(chat_id, from_chat_id, message_id).await?;
        Ok(())
    }
}
