use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use super::models::{
    Account, AccountAchievement, ApiErrorBody, CommerceListings, CommercePrice, Currency, Item,
    TokenInfo, WalletEntry,
};

const API_URL: &str = "https://api.guildwars2.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while talking to the GW2 API.
#[derive(Debug)]
pub enum ApiError {
    /// Network or HTTP-level error from reqwest.
    Network(reqwest::Error),
    /// The API answered with a non-success status. Carries its `text` message when present.
    Status(StatusCode, String),
    /// The response JSON could not be deserialized into the expected type.
    Deserialize(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(e) if e.is_timeout() => {
                write!(f, "The GW2 API took too long to answer, try again later")
            }
            ApiError::Network(e) => write!(f, "Could not reach the GW2 API: {e}"),
            ApiError::Status(status, text) if *status == StatusCode::NOT_FOUND => {
                write!(f, "Not found: {text}")
            }
            ApiError::Status(status, text) => write!(f, "GW2 API error ({status}): {text}"),
            ApiError::Deserialize(msg) => {
                write!(f, "Unexpected response from the GW2 API: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status(status, _) if *status == StatusCode::NOT_FOUND)
    }

    pub fn is_invalid_key(&self) -> bool {
        match self {
            ApiError::Status(status, text) => {
                *status == StatusCode::UNAUTHORIZED
                    || *status == StatusCode::FORBIDDEN
                    || text.to_lowercase().contains("invalid access token")
            }
            _ => false,
        }
    }
}

#[derive(Clone)]
pub struct Gw2Client {
    http: reqwest::Client,
    base_url: String,
    currencies: Arc<RwLock<Option<HashMap<u32, Currency>>>>,
}

impl Gw2Client {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, API_URL)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            currencies: Arc::new(RwLock::new(None)),
        }
    }

    pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("gw2-community-bot/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        access_token: Option<&str>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url).query(query);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ApiError::Network)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::Network)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.text)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(ApiError::Status(status, message));
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Deserialize(e.to_string()))
    }

    pub async fn item(&self, id: u32) -> Result<Item, ApiError> {
        self.get(&format!("/v2/items/{id}"), &[], None).await
    }

    pub async fn price(&self, id: u32) -> Result<CommercePrice, ApiError> {
        self.get(&format!("/v2/commerce/prices/{id}"), &[], None)
            .await
    }

    pub async fn listings(&self, id: u32) -> Result<CommerceListings, ApiError> {
        self.get(&format!("/v2/commerce/listings/{id}"), &[], None)
            .await
    }

    pub async fn token_info(&self, api_key: &str) -> Result<TokenInfo, ApiError> {
        self.get("/v2/tokeninfo", &[], Some(api_key)).await
    }

    pub async fn account(&self, api_key: &str) -> Result<Account, ApiError> {
        self.get("/v2/account", &[], Some(api_key)).await
    }

    pub async fn wallet(&self, api_key: &str) -> Result<Vec<WalletEntry>, ApiError> {
        self.get("/v2/account/wallet", &[], Some(api_key)).await
    }

    pub async fn account_achievements(
        &self,
        api_key: &str,
    ) -> Result<Vec<AccountAchievement>, ApiError> {
        self.get("/v2/account/achievements", &[], Some(api_key))
            .await
    }

    /// Currency names by id. Fetched once, then served from memory.
    pub async fn currencies(&self) -> Result<HashMap<u32, Currency>, ApiError> {
        {
            let cached = self.currencies.read().await;
            if let Some(map) = cached.as_ref() {
                return Ok(map.clone());
            }
        }

        let list: Vec<Currency> = self.get("/v2/currencies", &[("ids", "all")], None).await?;
        let map: HashMap<u32, Currency> = list.into_iter().map(|c| (c.id, c)).collect();
        tracing::info!("loaded {} currencies", map.len());

        let mut cached = self.currencies.write().await;
        *cached = Some(map.clone());
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = Gw2Client::with_base_url(reqwest::Client::new(), "http://localhost:9000/");
        assert_eq!(client.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_invalid_key_detection() {
        let err = ApiError::Status(StatusCode::UNAUTHORIZED, "Invalid access token".into());
        assert!(err.is_invalid_key());

        let err = ApiError::Status(StatusCode::BAD_REQUEST, "invalid access token".into());
        assert!(err.is_invalid_key());

        let err = ApiError::Status(StatusCode::NOT_FOUND, "no such id".into());
        assert!(!err.is_invalid_key());
        assert!(err.is_not_found());
    }

    #[test]
    fn test_status_display() {
        let err = ApiError::Status(StatusCode::NOT_FOUND, "no such id".into());
        assert_eq!(err.to_string(), "Not found: no such id");

        let err = ApiError::Deserialize("missing field `sells`".into());
        assert!(err.to_string().contains("missing field"));
    }
}
