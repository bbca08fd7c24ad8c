use thiserror::Error;

/// Message shown for any transport-level catalog failure.
pub const FETCH_RETRY_MESSAGE: &str = "Error fetching movies Please try again";

/// Fallback when a malformed envelope carries no message of its own.
pub const FETCH_FALLBACK_MESSAGE: &str = "Failed to fetch movies";

/// Errors from the movie catalog API.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog API error: HTTP {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Malformed catalog payload: {0}")]
    Malformed(String),

    #[error("Could not decode catalog payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CatalogError {
    /// Transport failures: the request never produced a usable response.
    /// A 2xx body that is not JSON (proxy or gateway pages) counts too.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CatalogError::Http(_) | CatalogError::Status { .. } | CatalogError::Decode(_)
        )
    }

    /// Text placed in the error region of the search screen.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Http(_) | CatalogError::Status { .. } | CatalogError::Decode(_) => {
                FETCH_RETRY_MESSAGE.to_string()
            }
            CatalogError::Malformed(msg) if !msg.is_empty() => msg.clone(),
            CatalogError::Malformed(_) => FETCH_FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Errors from the trending store. Never shown to the user.
#[derive(Error, Debug)]
pub enum TrendingError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Trending store error: HTTP {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Could not decode trending payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Startup configuration problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Debounce period must be greater than zero")]
    ZeroDebounce,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_is_transport() {
        let error = CatalogError::Status {
            status: 500,
            message: "Internal Server Error".to_string(),
        };
        assert!(error.is_transport());
        assert_eq!(error.user_message(), FETCH_RETRY_MESSAGE);
    }

    #[test]
    fn test_malformed_uses_payload_message() {
        let error = CatalogError::Malformed("Invalid API key".to_string());
        assert!(!error.is_transport());
        assert_eq!(error.user_message(), "Invalid API key");
    }

    #[test]
    fn test_malformed_without_message_falls_back() {
        let error = CatalogError::Malformed(String::new());
        assert_eq!(error.user_message(), FETCH_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_undecodable_body_asks_for_retry() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = CatalogError::from(err);
        assert!(error.is_transport());
        assert_eq!(error.user_message(), FETCH_RETRY_MESSAGE);
    }
}
