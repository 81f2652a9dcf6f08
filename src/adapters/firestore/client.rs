//! Minimal Firestore REST client.
//!
//! Only `documents:runQuery` with equality filters is needed. Credentials come
//! from a static bearer token, the GCE metadata server, or nothing at all
//! (local emulator).

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::FirestoreConfig;
use crate::ports::StoreError;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// A `structuredQuery` over one collection with AND-ed equality filters.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredQuery {
    collection: String,
    filters: Vec<(String, String)>,
    limit: Option<u32>,
}

impl StructuredQuery {
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            limit: None,
        }
    }

    /// Adds `field == value` (string comparison).
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Request body for `documents:runQuery`.
    pub fn to_request_body(&self) -> Value {
        let mut query = Map::new();
        query.insert(
            "from".to_string(),
            json!([{ "collectionId": self.collection }]),
        );

        let mut filters: Vec<Value> = self
            .filters
            .iter()
            .map(|(field, value)| {
                json!({
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": { "stringValue": value }
                    }
                })
            })
            .collect();

        match filters.len() {
            0 => {}
            1 => {
                query.insert("where".to_string(), filters.remove(0));
            }
            _ => {
                query.insert(
                    "where".to_string(),
                    json!({ "compositeFilter": { "op": "AND", "filters": filters } }),
                );
            }
        }

        if let Some(limit) = self.limit {
            query.insert("limit".to_string(), json!(limit));
        }

        json!({ "structuredQuery": Value::Object(query) })
    }
}

/// A document returned by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Native document id (last segment of the resource name).
    pub id: String,
    fields: HashMap<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: HashMap<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// A field as a string. Integer fields are rendered in decimal.
    pub fn string(&self, field: &str) -> Option<String> {
        let value = self.fields.get(field)?;
        value
            .get("stringValue")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| match value.get("integerValue")? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

/// Parses a `runQuery` response. Items without a document (read-time or
/// progress markers) are skipped.
pub fn parse_run_query_response(body: &str) -> Result<Vec<Document>, StoreError> {
    let items: Vec<RunQueryItem> =
        serde_json::from_str(body).map_err(|e| StoreError::Malformed(e.to_string()))?;

    Ok(items
        .into_iter()
        .filter_map(|item| item.document)
        .map(|raw| {
            let id = raw.name.rsplit('/').next().unwrap_or_default().to_string();
            Document::new(id, raw.fields)
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: Secret<String>,
    refresh_at: Instant,
}

enum TokenSource {
    Anonymous,
    Static(Secret<String>),
    MetadataServer(Mutex<Option<CachedToken>>),
}

/// Firestore REST client.
pub struct FirestoreClient {
    http: Client,
    run_query_url: String,
    tokens: TokenSource,
}

impl FirestoreClient {
    pub fn from_config(config: &FirestoreConfig) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let tokens = match (&config.access_token, config.use_metadata_server) {
            (Some(token), _) if !token.expose_secret().is_empty() => {
                TokenSource::Static(token.clone())
            }
            (_, true) => TokenSource::MetadataServer(Mutex::new(None)),
            _ => TokenSource::Anonymous,
        };

        Ok(Self {
            http,
            run_query_url: format!(
                "{}/{}:runQuery",
                config.base_url.trim_end_matches('/'),
                config.documents_path()
            ),
            tokens,
        })
    }

    pub fn run_query_url(&self) -> &str {
        &self.run_query_url
    }

    /// Runs a structured query and returns the matching documents.
    pub async fn run_query(&self, query: &StructuredQuery) -> Result<Vec<Document>, StoreError> {
        let mut request = self.http.post(&self.run_query_url).json(&query.to_request_body());
        if let Some(token) = self.bearer_token().await? {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(map_send_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_send_error)?;

        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        parse_run_query_response(&body)
    }

    async fn bearer_token(&self) -> Result<Option<Secret<String>>, StoreError> {
        match &self.tokens {
            TokenSource::Anonymous => Ok(None),
            TokenSource::Static(token) => Ok(Some(token.clone())),
            TokenSource::MetadataServer(cache) => {
                let mut cached = cache.lock().await;
                if let Some(existing) = cached.as_ref() {
                    if Instant::now() < existing.refresh_at {
                        return Ok(Some(existing.token.clone()));
                    }
                }

                let fresh = self.fetch_metadata_token().await?;
                let token = fresh.token.clone();
                *cached = Some(fresh);
                Ok(Some(token))
            }
        }
    }

    async fn fetch_metadata_token(&self) -> Result<CachedToken, StoreError> {
        let response = self
            .http
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(map_send_error)?;

        if response.status() != StatusCode::OK {
            return Err(StoreError::Rejected {
                status: response.status().as_u16(),
                message: "metadata server refused token request".to_string(),
            });
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        tracing::debug!(expires_in = token.expires_in, "Fetched Firestore access token");

        Ok(CachedToken {
            token: Secret::new(token.access_token),
            refresh_at: Instant::now() + lifetime,
        })
    }
}

fn map_send_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Unavailable(e.to_string())
    }
}
