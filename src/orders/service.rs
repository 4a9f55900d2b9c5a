use thiserror::Error;
use tracing::info;

use super::parse;
use super::repo::Order;
use crate::state::AppState;

/// Both history views are capped to the latest entries.
const HISTORY_LIMIT: i64 = 10;

#[derive(Debug, Error)]
#[error("caller is not the configured administrator")]
pub struct AccessDenied;

/// Parse a raw form payload, persist it, and notify the administrator.
///
/// The order row is written before the notification goes out; a delivery
/// failure therefore surfaces as an error while the order itself survives.
pub async fn submit(
    state: &AppState,
    raw: &str,
    user_id: i64,
    username: &str,
) -> anyhow::Result<Order> {
    let draft = parse::parse_order(raw);
    let order = Order::insert(&state.db, &draft, user_id, username).await?;
    info!(order_id = order.id, user_id, "order stored");

    let text = notification_text(&order);
    state
        .notifier
        .notify_new_order(state.config.admin_id, &text)
        .await?;
    Ok(order)
}

pub async fn my_orders(state: &AppState, user_id: i64) -> anyhow::Result<Vec<Order>> {
    Order::list_by_user(&state.db, user_id, HISTORY_LIMIT).await
}

pub async fn admin_recent(state: &AppState, caller_id: i64) -> anyhow::Result<Vec<Order>> {
    if caller_id != state.config.admin_id {
        return Err(AccessDenied.into());
    }
    Order::list_recent(&state.db, HISTORY_LIMIT).await
}

/// Re-deliver a notification message to the administrator chat.
pub async fn forward(state: &AppState, from_chat_id: i64, message_id: i64) -> anyhow::Result<()> {
    state
        .notifier
        .forward(state.config.admin_id, from_chat_id, message_id)
        .await
}

fn notification_text(order: &Order) -> String {
    let handle = if order.username.is_empty() {
        format!("id {}", order.user_id)
    } else {
        format!("@{} (id {})", order.username, order.user_id)
    };
    format!("🆕 Заказ #{} от {handle}:\n\n{}", order.id, order.raw_text)
}
