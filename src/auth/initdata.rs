use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// Domain-separation constant fixed by the Telegram WebApp protocol.
const WEBAPP_DOMAIN: &[u8] = b"WebAppData";

/// User profile embedded in a verified initData blob. Lives for one request.
#[derive(Debug, Clone, Deserialize)]
pub struct WebAppUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Validate a Telegram WebApp `initData` query string against the bot token.
///
/// The check string is the percent-decoded `key=value` pairs minus `hash`,
/// sorted by key and joined with newlines. The signing secret is one keyed
/// hash of the bot token under the protocol constant; the supplied hash is
/// compared in constant time. Anything malformed yields `None` — callers
/// treat that as unauthenticated, never as partial trust.
pub fn verify_init_data(init_data: &str, bot_token: &str) -> Option<WebAppUser> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for part in init_data.split('&') {
        let (key, value) = part.split_once('=')?;
        let value = urlencoding::decode(value).ok()?;
        pairs.push((key.to_string(), value.into_owned()));
    }

    let hash_pos = pairs.iter().position(|(k, _)| k == "hash")?;
    let (_, supplied) = pairs.remove(hash_pos);
    let supplied = hex::decode(supplied).ok()?;

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    let check_string = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut mac = HmacSha256::new_from_slice(WEBAPP_DOMAIN).ok()?;
    mac.update(bot_token.as_bytes());
    let secret = mac.finalize().into_bytes();

    let mut mac = HmacSha256::new_from_slice(&secret).ok()?;
    mac.update(check_string.as_bytes());
    mac.verify_slice(&supplied).ok()?;

    let user_json = pairs
        .iter()
        .find_map(|(k, v)| (k == "user").then_some(v.as_str()))?;
    serde_json::from_str(user_json).ok()
}
