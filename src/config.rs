use crate::catalog::DEFAULT_API_BASE_URL;
use crate::debounce::DEBOUNCE_QUIET_PERIOD;
use crate::error::ConfigError;
use crate::trending::{AppwriteConfig, DEFAULT_APPWRITE_ENDPOINT};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

pub const LOG_FILE_NAME: &str = "movie-finder.log";

/// Connection and runtime settings. Every flag can also come from the environment.
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Base URL of the movie catalog API
    #[arg(long, env = "TMDB_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Bearer token for the movie catalog API
    #[arg(long, env = "TMDB_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Appwrite REST endpoint
    #[arg(long, env = "APPWRITE_ENDPOINT", default_value = DEFAULT_APPWRITE_ENDPOINT)]
    pub appwrite_endpoint: String,

    /// Appwrite project id
    #[arg(long, env = "APPWRITE_PROJECT_ID", default_value = "")]
    pub appwrite_project: String,

    /// Appwrite API key (optional when the collection allows guest access)
    #[arg(long, env = "APPWRITE_API_KEY", hide_env_values = true)]
    pub appwrite_key: Option<String>,

    /// Appwrite database id
    #[arg(long, env = "APPWRITE_DATABASE_ID", default_value = "")]
    pub appwrite_database: String,

    /// Appwrite collection holding the search counters
    #[arg(long, env = "APPWRITE_COLLECTION_ID", default_value = "")]
    pub appwrite_collection: String,

    /// Quiet period before a typed query is searched, in milliseconds
    #[arg(long, env = "MOVIE_FINDER_DEBOUNCE_MS", default_value_t = DEBOUNCE_QUIET_PERIOD.as_millis() as u64)]
    pub debounce_ms: u64,

    /// Log file (defaults to the user data directory)
    #[arg(long, env = "MOVIE_FINDER_LOG")]
    pub log_file: Option<PathBuf>,

    /// Log filter, e.g. "info" or "movie_finder=debug"
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Settings {
    /// Check the URLs parse. A missing API key is not an error here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("api-base-url", &self.api_base_url)?;
        check_url("appwrite-endpoint", &self.appwrite_endpoint)?;
        if self.debounce_ms == 0 {
            return Err(ConfigError::ZeroDebounce);
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn appwrite(&self) -> AppwriteConfig {
        AppwriteConfig {
            endpoint: self.appwrite_endpoint.clone(),
            project_id: self.appwrite_project.clone(),
            api_key: self.appwrite_key.clone().filter(|k| !k.is_empty()),
            database_id: self.appwrite_database.clone(),
            collection_id: self.appwrite_collection.clone(),
        }
    }

    /// Where logs go: the explicit flag, else the platform data directory.
    pub fn log_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.log_file {
            return Some(path.clone());
        }
        directories::ProjectDirs::from("com", "moviefinder", "movie-finder")
            .map(|dirs| dirs.data_local_dir().join(LOG_FILE_NAME))
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    reqwest::Url::parse(value)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        })
}
