//! OAuth 1.0a request signing (HMAC-SHA1)

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;

use super::api::{ApiError, ApiResult};
use crate::config::TwitterConfig;

/// RFC 3986 unreserved characters stay as-is, everything else is encoded
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub struct OAuthSigner {
    consumer_key: SecretString,
    consumer_secret: SecretString,
    access_token: SecretString,
    access_token_secret: SecretString,
}

impl std::fmt::Debug for OAuthSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSigner").finish_non_exhaustive()
    }
}

impl OAuthSigner {
    pub fn new(config: &TwitterConfig) -> Self {
        Self {
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
            access_token: config.access_token.clone(),
            access_token_secret: config.access_token_secret.clone(),
        }
    }

    /// `Authorization` header value for a request
    ///
    /// `url` must not carry a query string; query and form parameters go in
    /// `params`.
    pub fn authorization(&self, method: &str, url: &str, params: &[(String, String)]) -> ApiResult<String> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.authorization_with(method, url, params, &generate_nonce(), &timestamp)
    }

    fn authorization_with(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        nonce: &str,
        timestamp: &str,
    ) -> ApiResult<String> {
        let mut oauth_params = vec![
            ("oauth_consumer_key", self.consumer_key.expose_secret().to_string()),
            ("oauth_nonce", nonce.to_string()),
            ("oauth_signature_method", "HMAC-SHA1".to_string()),
            ("oauth_timestamp", timestamp.to_string()),
            ("oauth_token", self.access_token.expose_secret().to_string()),
            ("oauth_version", "1.0".to_string()),
        ];

        let mut encoded: Vec<(String, String)> = oauth_params
            .iter()
            .map(|(k, v)| (encode(k), encode(v)))
            .chain(params.iter().map(|(k, v)| (encode(k), encode(v))))
            .collect();
        encoded.sort();

        let parameter_string = encoded
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_ascii_uppercase(),
            encode(url),
            encode(&parameter_string)
        );
        let signing_key = format!(
            "{}&{}",
            encode(self.consumer_secret.expose_secret()),
            encode(self.access_token_secret.expose_secret())
        );

        oauth_params.push(("oauth_signature", hmac_sha1(&signing_key, &base_string)?));

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", header))
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn hmac_sha1(key: &str, data: &str) -> ApiResult<String> {
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes()).map_err(|e| ApiError::OAuth(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
