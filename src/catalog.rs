use crate::error::CatalogError;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";

/// A movie as returned by the catalog. Fields we don't display are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// TMDB sends `null` for some fields it normally fills in.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Movie {
    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date.as_deref()?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(|d| d.year())
    }
}

/// Which catalog endpoint a query maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieQuery {
    Search(String),
    Discover,
}

impl MovieQuery {
    /// Empty text discovers popular movies, anything else searches.
    pub fn from_term(term: &str) -> Self {
        if term.is_empty() {
            Self::Discover
        } else {
            Self::Search(term.to_string())
        }
    }
}

/// Source of movie listings.
#[async_trait]
pub trait Catalog: Send + Sync + 'static {
    async fn fetch_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>, CatalogError>;
}

/// HTTP client for the TMDB v3 API.
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self, query: &MovieQuery) -> String {
        match query {
            MovieQuery::Search(term) => format!(
                "{}/search/movie?query={}",
                self.base_url,
                urlencoding::encode(term)
            ),
            MovieQuery::Discover => {
                format!("{}/discover/movie?sort_by=popularity.desc", self.base_url)
            }
        }
    }
}

#[async_trait]
impl Catalog for TmdbClient {
    async fn fetch_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>, CatalogError> {
        let url = self.endpoint(query);
        tracing::debug!(%url, "fetching movies");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: status_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string()),
            });
        }

        parse_envelope(&body)
    }
}

/// Parse the `{ results: [...] }` envelope.
///
/// A body that is not JSON at all is a transport failure. A `results` field
/// that is not a list is a malformed payload; if it is a string, that string
/// becomes the error message. Entries that cannot be read as a movie (no
/// usable `id`, wrong field types) are skipped.
pub fn parse_envelope(body: &str) -> Result<Vec<Movie>, CatalogError> {
    let mut value: Value = serde_json::from_str(body)?;
    match value.get_mut("results").map(Value::take) {
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value::<Movie>(item) {
                Ok(movie) => Some(movie),
                Err(e) => {
                    tracing::debug!(index, error = %e, "skipping undecodable movie");
                    None
                }
            })
            .collect()),
        Some(Value::String(message)) => Err(CatalogError::Malformed(message)),
        _ => Err(CatalogError::Malformed(String::new())),
    }
}

// TMDB error bodies look like {"status_code":7,"status_message":"..."}
fn status_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("status_message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FETCH_FALLBACK_MESSAGE, FETCH_RETRY_MESSAGE};

    #[test]
    fn test_query_mode_selection() {
        assert_eq!(MovieQuery::from_term(""), MovieQuery::Discover);
        assert_eq!(
            MovieQuery::from_term("batman"),
            MovieQuery::Search("batman".to_string())
        );
    }

    #[test]
    fn test_search_endpoint_is_percent_encoded() {
        let client = TmdbClient::new("https://api.example.test/3/", "key");
        let url = client.endpoint(&MovieQuery::Search("the dark knight & co?".to_string()));
        assert_eq!(
            url,
            "https://api.example.test/3/search/movie?query=the%20dark%20knight%20%26%20co%3F"
        );
    }

    #[test]
    fn test_discover_endpoint() {
        let client = TmdbClient::new(DEFAULT_API_BASE_URL, "key");
        assert_eq!(
            client.endpoint(&MovieQuery::Discover),
            "https://api.themoviedb.org/3/discover/movie?sort_by=popularity.desc"
        );
    }

    #[test]
    fn test_parse_envelope_keeps_order_and_extra_fields() {
        let body = r#"{"page":1,"results":[
            {"id":1,"title":"Batman","poster_path":"/b.jpg","popularity":12.5,"adult":false},
            {"id":2,"title":"Batman Returns","poster_path":null,"popularity":9.0}
        ]}"#;
        let movies = parse_envelope(body).unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].id, 1);
        assert_eq!(movies[0].poster_path.as_deref(), Some("/b.jpg"));
        assert_eq!(movies[0].extra.get("adult"), Some(&Value::Bool(false)));
        assert_eq!(movies[1].title, "Batman Returns");
        assert_eq!(movies[1].poster_path, None);
    }

    #[test]
    fn test_parse_envelope_empty_list_is_ok() {
        let movies = parse_envelope(r#"{"results":[]}"#).unwrap();
        assert!(movies.is_empty());
    }

    #[test]
    fn test_parse_envelope_tolerates_null_fields() {
        let body = r#"{"results":[
            {"id":1,"title":"Batman"},
            {"id":2,"title":null,"popularity":null,"vote_average":null}
        ]}"#;
        let movies = parse_envelope(body).unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title, "Batman");
        assert_eq!(movies[1].id, 2);
        assert_eq!(movies[1].title, "");
        assert_eq!(movies[1].popularity, 0.0);
        assert_eq!(movies[1].vote_average, None);
    }

    #[test]
    fn test_parse_envelope_skips_unreadable_entries() {
        let body = r#"{"results":[
            {"id":1,"title":"Batman"},
            {"title":"No id"},
            {"id":3,"title":["not","a","string"]},
            "garbage",
            {"id":4,"title":"Batman Returns"}
        ]}"#;
        let movies = parse_envelope(body).unwrap();
        let ids: Vec<i64> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_parse_envelope_non_json_body_is_transport() {
        let err = parse_envelope("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
        assert!(err.is_transport());
        assert_eq!(err.user_message(), FETCH_RETRY_MESSAGE);
    }

    #[test]
    fn test_parse_envelope_string_results_is_message() {
        let err = parse_envelope(r#"{"results":"Invalid page"}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
        assert_eq!(err.user_message(), "Invalid page");
    }

    #[test]
    fn test_parse_envelope_missing_results_uses_fallback() {
        let err = parse_envelope(r#"{"status_code":34}"#).unwrap_err();
        assert_eq!(err.user_message(), FETCH_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_status_message_extraction() {
        let body = r#"{"status_code":7,"status_message":"Invalid API key"}"#;
        assert_eq!(status_message(body).as_deref(), Some("Invalid API key"));
        assert_eq!(status_message("<html>"), None);
    }

    #[test]
    fn test_release_year() {
        let mut movie: Movie = serde_json::from_str(r#"{"id":5,"release_date":"1989-06-23"}"#).unwrap();
        assert_eq!(movie.release_year(), Some(1989));
        movie.release_date = Some(String::new());
        assert_eq!(movie.release_year(), None);
        assert_eq!(movie.popularity, 0.0);
    }
}
