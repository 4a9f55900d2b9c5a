use serde::Serialize;

use super::parse::NET_NONE;
use super::repo::Order;

/// Order as the web app consumes it: every field stringified, empty string
/// for absent numerics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub windows: String,
    pub window_square: String,
    pub doors: String,
    pub door_square: String,
    pub profile: String,
    pub color: String,
    pub glass: String,
    pub net: String,
    pub sill: String,
    pub total: String,
    pub deposit: String,
    pub rest: String,
    pub date: String,
}

fn num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            name: o.name,
            phone: o.phone,
            address: o.address,
            windows: o.windows,
            window_square: num(o.window_square),
            doors: o.doors,
            door_square: num(o.door_square),
            profile: o.profile,
            color: o.color,
            glass: o.glass,
            net: if o.net.is_empty() { NET_NONE.into() } else { o.net },
            sill: o.sill,
            total: num(o.total),
            deposit: num(o.deposit),
            rest: num(o.rest),
            date: o.install_date,
        }
    }
}
