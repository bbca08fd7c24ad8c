use crate::catalog::Movie;
use crate::error::TrendingError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const DEFAULT_APPWRITE_ENDPOINT: &str = "https://cloud.appwrite.io/v1";
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const POSTER_PLACEHOLDER: &str = "/no-movie.png";

/// How many trending terms are shown.
pub const TRENDING_LIMIT: usize = 5;

/// One search-term counter record in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    #[serde(rename = "$id")]
    pub record_id: String,
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub movie_id: i64,
}

/// Poster image for a movie, or the placeholder when it has none.
pub fn poster_url(movie: &Movie) -> String {
    match movie.poster_path.as_deref() {
        Some(path) if !path.is_empty() => format!("{}{}", POSTER_BASE_URL, path),
        _ => POSTER_PLACEHOLDER.to_string(),
    }
}

/// Counter store for search terms.
#[async_trait]
pub trait TrendingStore: Send + Sync + 'static {
    /// Entries ordered by count, highest first, at most `limit` of them.
    async fn top_searches(&self, limit: usize) -> Result<Vec<TrendingEntry>, TrendingError>;

    /// Bump the counter for `term`, creating it at 1 if missing.
    async fn record_search(&self, term: &str, movie: &Movie)
    -> Result<TrendingEntry, TrendingError>;
}

#[derive(Debug, Clone)]
pub struct AppwriteConfig {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: Option<String>,
    pub database_id: String,
    pub collection_id: String,
}

/// Appwrite document query, serialized the way the REST API expects.
#[derive(Debug, Clone, PartialEq)]
enum Query {
    Equal { attribute: &'static str, value: Value },
    OrderDesc(&'static str),
    Limit(usize),
}

impl Query {
    fn to_param(&self) -> String {
        let value = match self {
            Query::Equal { attribute, value } => {
                json!({ "method": "equal", "attribute": attribute, "values": [value] })
            }
            Query::OrderDesc(attribute) => json!({ "method": "orderDesc", "attribute": attribute }),
            Query::Limit(n) => json!({ "method": "limit", "values": [n] }),
        };
        value.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    total: u64,
    documents: Vec<TrendingEntry>,
}

/// Trending store backed by an Appwrite collection.
pub struct AppwriteStore {
    http: reqwest::Client,
    config: AppwriteConfig,
}

impl AppwriteStore {
    pub fn new(mut config: AppwriteConfig) -> Self {
        config.endpoint = config.endpoint.trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint, self.config.database_id, self.config.collection_id
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header("X-Appwrite-Project", &self.config.project_id);
        match &self.config.api_key {
            Some(key) => builder.header("X-Appwrite-Key", key),
            None => builder,
        }
    }

    async fn list(&self, queries: &[Query]) -> Result<Vec<TrendingEntry>, TrendingError> {
        let params: Vec<(&str, String)> = queries.iter().map(|q| ("queries[]", q.to_param())).collect();
        let response = self
            .request(reqwest::Method::GET, &self.documents_url())
            .query(&params)
            .send()
            .await?;
        let list: DocumentList = decode(response).await?;
        tracing::debug!(total = list.total, returned = list.documents.len(), "listed trending documents");
        Ok(list.documents)
    }
}

#[async_trait]
impl TrendingStore for AppwriteStore {
    async fn top_searches(&self, limit: usize) -> Result<Vec<TrendingEntry>, TrendingError> {
        self.list(&[Query::Limit(limit), Query::OrderDesc("count")]).await
    }

    async fn record_search(
        &self,
        term: &str,
        movie: &Movie,
    ) -> Result<TrendingEntry, TrendingError> {
        let existing = self
            .list(&[Query::Equal {
                attribute: "searchTerm",
                value: Value::String(term.to_string()),
            }])
            .await?;

        let response = match existing.first() {
            Some(entry) => {
                let url = format!("{}/{}", self.documents_url(), entry.record_id);
                self.request(reqwest::Method::PATCH, &url)
                    .json(&json!({ "data": { "count": entry.count + 1 } }))
                    .send()
                    .await?
            }
            None => {
                self.request(reqwest::Method::POST, &self.documents_url())
                    .json(&json!({
                        "documentId": "unique()",
                        "data": {
                            "searchTerm": term,
                            "count": 1,
                            "movie_id": movie.id,
                            "poster_url": poster_url(movie),
                        }
                    }))
                    .send()
                    .await?
            }
        };

        decode(response).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, TrendingError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        // Appwrite error bodies carry a "message" field.
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
        return Err(TrendingError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(poster: Option<&str>) -> Movie {
        let mut movie: Movie = serde_json::from_str(r#"{"id":42,"title":"Heat"}"#).unwrap();
        movie.poster_path = poster.map(str::to_string);
        movie
    }

    #[test]
    fn test_poster_url_with_path() {
        assert_eq!(
            poster_url(&movie(Some("/heat.jpg"))),
            "https://image.tmdb.org/t/p/w500/heat.jpg"
        );
    }

    #[test]
    fn test_poster_url_placeholder() {
        assert_eq!(poster_url(&movie(None)), POSTER_PLACEHOLDER);
        assert_eq!(poster_url(&movie(Some(""))), POSTER_PLACEHOLDER);
    }

    #[test]
    fn test_query_params() {
        let limit: Value = serde_json::from_str(&Query::Limit(5).to_param()).unwrap();
        assert_eq!(limit, json!({ "method": "limit", "values": [5] }));
        let order: Value = serde_json::from_str(&Query::OrderDesc("count").to_param()).unwrap();
        assert_eq!(order, json!({ "method": "orderDesc", "attribute": "count" }));
        let equal = Query::Equal {
            attribute: "searchTerm",
            value: Value::String("batman".to_string()),
        };
        let parsed: Value = serde_json::from_str(&equal.to_param()).unwrap();
        assert_eq!(parsed["method"], "equal");
        assert_eq!(parsed["attribute"], "searchTerm");
        assert_eq!(parsed["values"][0], "batman");
    }

    #[test]
    fn test_document_list_decoding() {
        let body = r#"{"total":2,"documents":[
            {"$id":"a1","$createdAt":"2025-01-01T00:00:00.000+00:00","searchTerm":"batman","count":7,"poster_url":"/x.png","movie_id":1},
            {"$id":"b2","searchTerm":"heat","count":3,"poster_url":"/y.png","movie_id":42}
        ]}"#;
        let list: DocumentList = serde_json::from_str(body).unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.documents[0].record_id, "a1");
        assert_eq!(list.documents[0].search_term, "batman");
        assert_eq!(list.documents[1].count, 3);
        assert_eq!(list.documents[1].movie_id, 42);
    }

    #[test]
    fn test_documents_url_trims_trailing_slash() {
        let store = AppwriteStore::new(AppwriteConfig {
            endpoint: "https://cloud.appwrite.io/v1/".to_string(),
            project_id: "p".to_string(),
            api_key: None,
            database_id: "db".to_string(),
            collection_id: "metrics".to_string(),
        });
        assert_eq!(
            store.documents_url(),
            "https://cloud.appwrite.io/v1/databases/db/collections/metrics/documents"
        );
    }
}
