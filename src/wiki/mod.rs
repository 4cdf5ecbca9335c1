use serde_json::Value;

const API_URL: &str = "https://wiki.guildwars2.com/api.php";

#[derive(Debug)]
pub enum WikiError {
    Network(reqwest::Error),
    Deserialize(String),
}

impl std::fmt::Display for WikiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WikiError::Network(e) => write!(f, "Could not reach the wiki: {e}"),
            WikiError::Deserialize(msg) => write!(f, "Unexpected response from the wiki: {msg}"),
        }
    }
}

impl std::error::Error for WikiError {}

#[derive(Clone, Debug, PartialEq)]
pub struct WikiPage {
    pub title: String,
    pub url: String,
}

#[derive(Clone)]
pub struct WikiClient {
    http: reqwest::Client,
    api_url: String,
}

impl WikiClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            api_url: API_URL.to_string(),
        }
    }

    async fn get_json(&self, params: &[(&str, &str)]) -> Result<Value, WikiError> {
        let response = self
            .http
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(WikiError::Network)?
            .error_for_status()
            .map_err(WikiError::Network)?;

        let text = response.text().await.map_err(WikiError::Network)?;
        serde_json::from_str(&text).map_err(|e| WikiError::Deserialize(e.to_string()))
    }

    /// Page titles matching `query`, best match first.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<WikiPage>, WikiError> {
        let limit = limit.to_string();
        let body = self
            .get_json(&[
                ("action", "opensearch"),
                ("format", "json"),
                ("search", query),
                ("limit", limit.as_str()),
            ])
            .await?;
        parse_opensearch(&body)
    }

    /// Resolves an item name to its game id through the wiki's semantic properties.
    pub async fn item_id(&self, name: &str) -> Result<Option<u32>, WikiError> {
        let query = format!("[[Has canonical name::{name}]]|?Has game id|limit=5");
        let body = self
            .get_json(&[("action", "ask"), ("format", "json"), ("query", query.as_str())])
            .await?;
        Ok(parse_game_id(&body))
    }
}

fn parse_opensearch(body: &Value) -> Result<Vec<WikiPage>, WikiError> {
    let titles = body
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| WikiError::Deserialize("missing title list".to_string()))?;
    let urls = body
        .get(3)
        .and_then(Value::as_array)
        .ok_or_else(|| WikiError::Deserialize("missing url list".to_string()))?;

    Ok(titles
        .iter()
        .zip(urls)
        .filter_map(|(title, url)| {
            Some(WikiPage {
                title: title.as_str()?.to_string(),
                url: url.as_str()?.to_string(),
            })
        })
        .collect())
}

/// First `Has game id` printout in an `ask` response. An empty result set
/// comes back as a JSON array rather than an object.
fn parse_game_id(body: &Value) -> Option<u32> {
    let results = body.get("query")?.get("results")?.as_object()?;
    results.values().find_map(|page| {
        page.get("printouts")?
            .get("Has game id")?
            .as_array()?
            .iter()
            .find_map(Value::as_u64)
            .and_then(|id| u32::try_from(id).ok())
    })
}
