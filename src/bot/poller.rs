use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::api::{BotApi, FORWARD_CALLBACK};
use super::types::{Message, Update};
use crate::orders::repo::Order;
use crate::orders::service::{self, AccessDenied};
use crate::state::AppState;

const MSG_WELCOME: &str = "Добро пожаловать 👋\nНажмите «Маркет», чтобы открыть магазин.";
const MARKET_BUTTON: &str = "🛒 Маркет";
const MSG_MARKET_OPEN: &str = "Открываю маркет 👇";
const MSG_ORDER_ACCEPTED: &str = "✅ Заказ принят! Мы свяжемся с вами.";
const MSG_NO_ACCESS: &str = "❌ У вас нет доступа к этому разделу.";
const MSG_NO_ORDERS: &str = "У вас пока нет заказов.";
const MSG_NO_ORDERS_ADMIN: &str = "Заказов пока нет.";
const MSG_FORWARDED: &str = "✅ Переслано";
const MSG_FORWARD_FAILED: &str = "⚠️ Не удалось переслать";
const MSG_ADMIN_ALERT: &str = "⚠️ Ошибка при обработке обновления. Подробности в логах.";

const POLL_TIMEOUT_SECS: u64 = 30;

/// Starts the long-polling loop. Do not await the returned handle, it runs
/// for the lifetime of the process.
pub fn start_poller(state: AppState, bot: BotApi) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("🤖 bot poller started");
        let mut offset = 0i64;
        loop {
            match bot.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        if let Err(e) = handle_update(&state, &bot, update).await {
                            error!(error = %e, "update handling failed");
                            let alerted = state
                                .notifier
                                .notify_alert(state.config.admin_id, MSG_ADMIN_ALERT)
                                .await;
                            if let Err(e) = alerted {
                                error!(error = %e, "failed to alert admin");
                            }
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "getUpdates failed");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                }
            }
        }
    })
}

async fn handle_update(state: &AppState, bot: &BotApi, update: Update) -> anyhow::Result<()> {
    if let Some(query) = update.callback_query {
        if query.data.as_deref() == Some(FORWARD_CALLBACK) {
            let answer = match query.message {
                Some(msg) => match service::forward(state, msg.chat.id, msg.message_id).await {
                    Ok(()) => MSG_FORWARDED,
                    Err(e) => {
                        error!(error = %e, "forward failed");
                        MSG_FORWARD_FAILED
                    }
                },
                None => MSG_FORWARD_FAILED,
            };
            bot.answer_callback_query(&query.id, answer).await?;
        }
        return Ok(());
    }

    let Some(message) = update.message else {
        return Ok(());
    };
    let chat_id = message.chat.id;

    if let Some(web_app) = &message.web_app_data {
        let (user_id, username) = sender(&message);
        service::submit(state, &web_app.data, user_id, &username).await?;
        bot.send_message(chat_id, MSG_ORDER_ACCEPTED).await?;
        return Ok(());
    }

    match message.text.as_deref() {
        Some("/start") => {
            bot.send_message_with_markup(
                chat_id,
                MSG_WELCOME,
                market_keyboard(&state.config.webapp_url),
            )
            .await?;
        }
        Some(MARKET_BUTTON) => {
            bot.send_message_with_markup(
                chat_id,
                MSG_MARKET_OPEN,
                market_keyboard(&state.config.webapp_url),
            )
            .await?;
        }
        Some("/orders") => {
            let (caller_id, _) = sender(&message);
            match service::admin_recent(state, caller_id).await {
                Ok(orders) => {
                    let text = if orders.is_empty() {
                        MSG_NO_ORDERS_ADMIN.to_string()
                    } else {
                        render_orders(&orders)
                    };
                    bot.send_message(chat_id, &text).await?;
                }
                Err(e) if e.downcast_ref::<AccessDenied>().is_some() => {
                    warn!(caller_id, "admin command denied");
                    bot.send_message(chat_id, MSG_NO_ACCESS).await?;
                }
                Err(e) => return Err(e),
            }
        }
        Some("/myorders") => {
            let (caller_id, _) = sender(&message);
            let orders = service::my_orders(state, caller_id).await?;
            let text = if orders.is_empty() {
                MSG_NO_ORDERS.to_string()
            } else {
                render_orders(&orders)
            };
            bot.send_message(chat_id, &text).await?;
        }
        _ => {}
    }
    Ok(())
}

fn sender(message: &Message) -> (i64, String) {
    message
        .from
        .as_ref()
        .map(|u| (u.id, u.username.clone().unwrap_or_default()))
        .unwrap_or((message.chat.id, String::new()))
}

fn market_keyboard(webapp_url: &str) -> Value {
    json!({
        "keyboard": [[{ "text": MARKET_BUTTON, "web_app": { "url": webapp_url } }]],
        "resize_keyboard": true,
    })
}

fn render_orders(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| {
            let total = o
                .total
                .map(|v| v.to_string())
                .unwrap_or_else(|| "—".into());
            format!("#{} • {} • {} • {total}", o.id, o.name, o.phone)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
