use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use super::parse::OrderDraft;

/// One persisted order row. Rows are append-only: there is no update or
/// delete path anywhere in the crate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub windows: String,
    pub window_square: Option<f64>,
    pub doors: String,
    pub door_square: Option<f64>,
    pub profile: String,
    pub color: String,
    pub glass: String,
    pub net: String,
    pub sill: String,
    pub total: Option<f64>,
    pub deposit: Option<f64>,
    pub rest: Option<f64>,
    pub install_date: String,
    pub raw_text: String,
    pub created_at: OffsetDateTime,
}

const ORDER_COLUMNS: &str = "id, user_id, username, name, phone, address, windows, window_square, \
     doors, door_square, profile, color, glass, net, sill, total, deposit, rest, \
     install_date, raw_text, created_at";

impl Order {
    pub async fn insert(
        db: &SqlitePool,
        draft: &OrderDraft,
        user_id: i64,
        username: &str,
    ) -> anyhow::Result<Order> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders
                (user_id, username, name, phone, address, windows, window_square,
                 doors, door_square, profile, color, glass, net, sill,
                 total, deposit, rest, install_date, raw_text, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(username)
        .bind(&draft.name)
        .bind(&draft.phone)
        .bind(&draft.address)
        .bind(&draft.windows)
        .bind(draft.window_square)
        .bind(&draft.doors)
        .bind(draft.door_square)
        .bind(&draft.profile)
        .bind(&draft.color)
        .bind(&draft.glass)
        .bind(&draft.net)
        .bind(&draft.sill)
        .bind(draft.total)
        .bind(draft.deposit)
        .bind(draft.rest)
        .bind(&draft.install_date)
        .bind(&draft.raw_text)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await?;
        Ok(order)
    }

    pub async fn list_by_user(
        db: &SqlitePool,
        user_id: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_recent(db: &SqlitePool, limit: i64) -> anyhow::Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#
        ))
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::orders::parse::parse_order;
    use sqlx::sqlite::SqlitePoolOptions;

    pub(crate) async fn test_pool() -> SqlitePool {
        // One connection, or every pool checkout would see its own :memory: db.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations");
        pool
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let pool = test_pool().await;
        let draft = parse_order("Ism: Ali\nTel: 123\nManzil: X");
        let order = Order::insert(&pool, &draft, 42, "ali").await.expect("insert");
        assert!(order.id > 0);
        assert_eq!(order.user_id, 42);
        assert_eq!(order.username, "ali");
        assert_eq!(order.name, "Ali");
        assert_eq!(order.raw_text, "Ism: Ali\nTel: 123\nManzil: X");
    }

    #[tokio::test]
    async fn list_by_user_returns_newest_first_and_only_own_rows() {
        let pool = test_pool().await;
        let draft = parse_order("Ism: A\nTel: 1\nManzil: X");
        let first = Order::insert(&pool, &draft, 7, "a").await.expect("insert");
        let second = Order::insert(&pool, &draft, 7, "a").await.expect("insert");
        Order::insert(&pool, &draft, 8, "b").await.expect("insert");

        let rows = Order::list_by_user(&pool, 7, 10).await.expect("list");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, second.id);
        assert_eq!(rows[1].id, first.id);
        assert!(rows.iter().all(|o| o.user_id == 7));
    }

    #[tokio::test]
    async fn list_recent_spans_all_users_and_honors_limit() {
        let pool = test_pool().await;
        let draft = parse_order("Ism: A\nTel: 1\nManzil: X");
        for user in 1..=3 {
            Order::insert(&pool, &draft, user, "u").await.expect("insert");
        }
        let rows = Order::list_recent(&pool, 2).await.expect("list");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].id > rows[1].id);
    }

    #[tokio::test]
    async fn numeric_fields_round_trip_as_null_or_value() {
        let pool = test_pool().await;
        let draft =
            parse_order("Ism: A\nTel: 1\nManzil: X\n🪟 Derazalar: 2 dona (3,5 м²)");
        let order = Order::insert(&pool, &draft, 1, "u").await.expect("insert");
        assert_eq!(order.window_square, Some(3.5));
        assert_eq!(order.door_square, None);
        assert_eq!(order.total, None);
    }
}
