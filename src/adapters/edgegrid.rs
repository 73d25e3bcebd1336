use crate::adapters::edgerc::EdgeGridCredentials;
use crate::domain::ports::ApiClient;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use sha2::Sha256;
use std::time::Duration;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const AUTH_SCHEME: &str = "EG1-HMAC-SHA256";

/// Timestamp in the `yyyyMMddTHH:mm:ss+0000` form the signature expects.
pub fn eg_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H:%M:%S+0000").to_string()
}

/// `Authorization` header value for a body-less request to `url`.
pub fn sign_request(
    credentials: &EdgeGridCredentials,
    method: &str,
    url: &Url,
    timestamp: &str,
    nonce: &str,
) -> Result<String> {
    let auth_header = format!(
        "{} client_token={};access_token={};timestamp={};nonce={};",
        AUTH_SCHEME, credentials.client_token, credentials.access_token, timestamp, nonce
    );

    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => {
            return Err(EtlError::ConfigError {
                message: format!("request URL has no host: {}", url),
            })
        }
    };
    let relative_url = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };

    // Canonical headers and content hash stay empty for GET.
    let data_to_sign = [
        method.to_uppercase().as_str(),
        url.scheme(),
        host.as_str(),
        relative_url.as_str(),
        "",
        "",
        auth_header.as_str(),
    ]
    .join("\t");

    let signing_key = hmac_base64(credentials.client_secret.as_bytes(), timestamp.as_bytes())?;
    let signature = hmac_base64(signing_key.as_bytes(), data_to_sign.as_bytes())?;

    Ok(format!("{}signature={}", auth_header, signature))
}

fn hmac_base64(key: &[u8], data: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| EtlError::AuthError {
        message: format!("cannot build signing key: {}", e),
    })?;
    mac.update(data);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Read-only client that signs every request with EdgeGrid credentials.
pub struct EdgeGridClient {
    client: Client,
    credentials: EdgeGridCredentials,
    base_url: Url,
}

impl EdgeGridClient {
    pub fn new(credentials: EdgeGridCredentials, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&format!("https://{}", credentials.host)).map_err(|e| {
            EtlError::AuthError {
                message: format!("invalid host '{}' in credentials: {}", credentials.host, e),
            }
        })?;
        let client = Client::builder().timeout(timeout).build()?;

        tracing::info!("🔐 Initialized API client for host: {}", credentials.host);
        Ok(Self {
            client,
            credentials,
            base_url,
        })
    }

    /// Sends requests somewhere other than the credentials host.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn build_url(&self, path: &str, params: &[(String, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path).map_err(|e| EtlError::ConfigError {
            message: format!("invalid request path '{}': {}", path, e),
        })?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }
}

#[async_trait]
impl ApiClient for EdgeGridClient {
    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<serde_json::Value> {
        let url = self.build_url(path, params)?;
        let timestamp = eg_timestamp(Utc::now());
        let nonce = uuid::Uuid::new_v4().to_string();
        let authorization = sign_request(&self.credentials, "GET", &url, &timestamp, &nonce)?;

        tracing::info!("📡 GET {}", url);
        let response = self
            .client
            .get(url.as_str())
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("📡 Response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("📡 Error body: {}", body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => EtlError::AuthError {
                    message: format!("HTTP {} from {}: {}", status.as_u16(), url, body),
                },
                _ => EtlError::HttpStatusError {
                    status: status.as_u16(),
                    url: url.to_string(),
                    body,
                },
            });
        }

        let body = response.text().await?;
        tracing::debug!("📡 Response body: {}", body);
        Ok(serde_json::from_str(&body)?)
    }
}
