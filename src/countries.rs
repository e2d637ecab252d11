// Module containing response data structures for country records
mod response;

pub use response::{CountryName, CountryRecord, Flags};

use std::future::Future;
use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use tracing::{debug, error, info};

use crate::error::AppError;

// Public restcountries endpoint, v3.1 API
pub const DEFAULT_ENDPOINT: &str = "https://restcountries.com/v3.1";

// Characters left untouched by JavaScript's encodeURIComponent
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Lookup operations the live timer needs from the country service.
///
/// Implemented by [`CountryClient`] against the real service, and by fakes in
/// tests so debounce and clock behaviour can be checked without a network.
pub trait CountryLookup: Send + Sync + 'static {
    /// Common names of every country matching `query`.
    fn search_by_name(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<String>, AppError>> + Send;

    /// First country matching `name`, which must carry timezone data.
    fn resolve_one(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<CountryRecord, AppError>> + Send;
}

/// HTTP client for the restcountries name endpoint. No caching: every call
/// goes to the service.
#[derive(Debug, Clone)]
pub struct CountryClient {
    http: reqwest::Client,
    base_url: String,
}

impl CountryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the name endpoint for `query`, percent-encoded.
    pub fn name_url(&self, query: &str) -> String {
        format!(
            "{}/name/{}",
            self.base_url,
            utf8_percent_encode(query, QUERY_ENCODE_SET)
        )
    }

    /// Fetches the full records of every country matching `query`.
    ///
    /// # Returns
    /// * The records in service order
    /// * `CountryNotFound` when the service answers 404
    /// * `ApiRequestFailed` / `RequestError` for other failures
    pub async fn fetch_by_name(&self, query: &str) -> Result<Vec<CountryRecord>, AppError> {
        info!("Fetching country data for query: {}", query);

        let url = self.name_url(query);
        let response = self.http.get(&url).send().await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.text().await?;
                let records = parse_records(&body)?;
                debug!("Fetched {} country records for {:?}", records.len(), query);
                Ok(records)
            }
            StatusCode::NOT_FOUND => {
                debug!("No country matches {:?}", query);
                Err(AppError::CountryNotFound(query.to_string()))
            }
            status => {
                error!("Failed to fetch country data: {}", status);
                Err(AppError::ApiRequestFailed(format!(
                    "Failed to fetch country data: {}",
                    status
                )))
            }
        }
    }
}

impl CountryLookup for CountryClient {
    async fn search_by_name(&self, query: &str) -> Result<Vec<String>, AppError> {
        let records = self.fetch_by_name(query).await?;
        Ok(records.into_iter().map(|record| record.name.common).collect())
    }

    async fn resolve_one(&self, name: &str) -> Result<CountryRecord, AppError> {
        let records = self.fetch_by_name(name).await?;
        first_with_timezone(records, name)
    }
}

/// Parses a name endpoint body into records.
pub fn parse_records(body: &str) -> Result<Vec<CountryRecord>, AppError> {
    Ok(serde_json::from_str(body)?)
}

/// Takes the first record, which must list at least one timezone.
pub fn first_with_timezone(
    records: Vec<CountryRecord>,
    name: &str,
) -> Result<CountryRecord, AppError> {
    let record = records
        .into_iter()
        .next()
        .ok_or_else(|| AppError::CountryNotFound(name.to_string()))?;

    if record.timezones.is_empty() {
        return Err(AppError::TimezoneNotFound(record.name.common));
    }
    Ok(record)
}
