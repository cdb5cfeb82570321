//! Caller identity for the mini-app API.
//!
//! When a bot token is configured, requests must carry the Telegram WebApp
//! `initData` payload and its signature is verified once at the edge; the
//! identity handed to handlers comes from the signed `user` field, never from
//! a raw client header. Without a bot token (dev and tests) the plain
//! `x-telegram-*` headers are accepted as-is.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const INIT_DATA_HEADER: &str = "x-telegram-init-data";
pub const USER_ID_HEADER: &str = "x-telegram-user-id";
pub const USERNAME_HEADER: &str = "x-telegram-username";
pub const FIRST_NAME_HEADER: &str = "x-telegram-first-name";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramIdentity {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("not authenticated")]
    Missing,
    #[error("invalid init data")]
    InvalidInitData,
    #[error("init data signature mismatch")]
    SignatureMismatch,
}

/// Signed `user` field inside initData.
#[derive(Debug, Deserialize)]
struct InitDataUser {
    id: i64,
    username: Option<String>,
    first_name: Option<String>,
}

pub fn resolve_identity(
    headers: &HeaderMap,
    bot_token: Option<&str>,
) -> Result<TelegramIdentity, IdentityError> {
    match bot_token {
        Some(token) => {
            let init_data = headers
                .get(INIT_DATA_HEADER)
                .and_then(|value| value.to_str().ok())
                .ok_or(IdentityError::Missing)?;
            identity_from_init_data(init_data, token)
        }
        None => identity_from_plain_headers(headers),
    }
}

fn identity_from_plain_headers(headers: &HeaderMap) -> Result<TelegramIdentity, IdentityError> {
    let telegram_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .ok_or(IdentityError::Missing)?;

    Ok(TelegramIdentity {
        telegram_id,
        username: header_string(headers, USERNAME_HEADER),
        first_name: header_string(headers, FIRST_NAME_HEADER),
    })
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn identity_from_init_data(
    init_data: &str,
    bot_token: &str,
) -> Result<TelegramIdentity, IdentityError> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut provided_hash: Option<String> = None;

    for field in init_data.split('&') {
        let Some((key, value)) = field.split_once('=') else {
            continue;
        };
        let key = urlencoding::decode(key)
            .map_err(|_| IdentityError::InvalidInitData)?
            .into_owned();
        let value = urlencoding::decode(value)
            .map_err(|_| IdentityError::InvalidInitData)?
            .into_owned();
        if key == "hash" {
            provided_hash = Some(value);
        } else {
            pairs.push((key, value));
        }
    }

    let provided_hash = provided_hash.ok_or(IdentityError::InvalidInitData)?;
    verify_signature(&pairs, &provided_hash, bot_token)?;

    let user_json = pairs
        .iter()
        .find(|(key, _)| key == "user")
        .map(|(_, value)| value.as_str())
        .ok_or(IdentityError::InvalidInitData)?;

    let user: InitDataUser =
        serde_json::from_str(user_json).map_err(|_| IdentityError::InvalidInitData)?;

    Ok(TelegramIdentity {
        telegram_id: user.id,
        username: user.username,
        first_name: user.first_name,
    })
}

fn verify_signature(
    pairs: &[(String, String)],
    provided_hash: &str,
    bot_token: &str,
) -> Result<(), IdentityError> {
    // data-check-string: key=value lines sorted by key, joined with '\n'.
    let mut sorted: Vec<&(String, String)> = pairs.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let data_check_string = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n");

    // secret = HMAC_SHA256(key = "WebAppData", msg = bot_token)
    let mut secret_mac = HmacSha256::new_from_slice(b"WebAppData")
        .map_err(|_| IdentityError::InvalidInitData)?;
    secret_mac.update(bot_token.as_bytes());
    let secret = secret_mac.finalize().into_bytes();

    let mut mac =
        HmacSha256::new_from_slice(&secret).map_err(|_| IdentityError::InvalidInitData)?;
    mac.update(data_check_string.as_bytes());

    let expected = hex::decode(provided_hash).map_err(|_| IdentityError::SignatureMismatch)?;
    mac.verify_slice(&expected)
        .map_err(|_| IdentityError::SignatureMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_TOKEN: &str = "12345:test-token";

    fn sign(pairs: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = pairs.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let dcs = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n");

        let mut secret_mac = HmacSha256::new_from_slice(b"WebAppData").unwrap();
        secret_mac.update(BOT_TOKEN.as_bytes());
        let secret = secret_mac.finalize().into_bytes();

        let mut mac = HmacSha256::new_from_slice(&secret).unwrap();
        mac.update(dcs.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn encoded_init_data(pairs: &[(&str, &str)], hash: &str) -> String {
        let mut fields: Vec<String> = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        fields.push(format!("hash={hash}"));
        fields.join("&")
    }

    #[test]
    fn accepts_valid_init_data() {
        let user = r#"{"id":42,"first_name":"Wang","username":"wang"}"#;
        let pairs = [("auth_date", "1700000000"), ("user", user)];
        let init_data = encoded_init_data(&pairs, &sign(&pairs));

        let identity = identity_from_init_data(&init_data, BOT_TOKEN).unwrap();
        assert_eq!(identity.telegram_id, 42);
        assert_eq!(identity.username.as_deref(), Some("wang"));
        assert_eq!(identity.first_name.as_deref(), Some("Wang"));
    }

    #[test]
    fn rejects_tampered_init_data() {
        let user = r#"{"id":42,"first_name":"Wang"}"#;
        let pairs = [("auth_date", "1700000000"), ("user", user)];
        let hash = sign(&pairs);

        let forged_user = r#"{"id":99,"first_name":"Mallory"}"#;
        let forged = encoded_init_data(&[("auth_date", "1700000000"), ("user", forged_user)], &hash);

        assert!(matches!(
            identity_from_init_data(&forged, BOT_TOKEN),
            Err(IdentityError::SignatureMismatch)
        ));
    }

    #[test]
    fn rejects_missing_hash() {
        assert!(matches!(
            identity_from_init_data("user=%7B%22id%22%3A1%7D", BOT_TOKEN),
            Err(IdentityError::InvalidInitData)
        ));
    }

    #[test]
    fn plain_headers_require_numeric_user_id() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, "not-a-number".parse().unwrap());
        assert!(matches!(
            resolve_identity(&headers, None),
            Err(IdentityError::Missing)
        ));

        headers.insert(USER_ID_HEADER, "42".parse().unwrap());
        headers.insert(FIRST_NAME_HEADER, "Wang".parse().unwrap());
        let identity = resolve_identity(&headers, None).unwrap();
        assert_eq!(identity.telegram_id, 42);
        assert_eq!(identity.first_name.as_deref(), Some("Wang"));
    }
}
