use std::io;
use thiserror::Error;

/// Custom error types for the country-explorer application
#[derive(Error, Debug)]
pub enum AppError {
    /// Error when the country service answers with an unsuccessful status code
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// Error when the service has no country matching the query
    #[error("Country not found: {0}")]
    CountryNotFound(String),

    /// Error when the matched country carries no timezone information
    #[error("Timezone not found for country: {0}")]
    TimezoneNotFound(String),

    /// Error when a UTC offset string is not of the form `UTC+HH:MM`
    #[error("Malformed UTC offset: {0}")]
    InvalidOffset(String),

    /// Error when a login is attempted with something that is not an email
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Error when an action needs a logged-in user
    #[error("Login required to {0}")]
    LoginRequired(String),

    /// Error when an environment override cannot be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidConfig { name: &'static str, value: String },

    /// Wrapper for reqwest errors
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Wrapper for I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Wrapper for JSON deserialization errors on API responses
    #[error("Failed to parse API response: {0}")]
    ResponseParseError(#[from] serde_json::Error),
}

impl AppError {
    /// Transport or service failure.
    pub fn is_network(&self) -> bool {
        matches!(self, AppError::RequestError(_) | AppError::ApiRequestFailed(_))
    }

    /// No matching country, or no timezone data for it.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::CountryNotFound(_) | AppError::TimezoneNotFound(_)
        )
    }
}
