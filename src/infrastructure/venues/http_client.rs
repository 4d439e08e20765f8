//! # Venue HTTP Client
//!
//! Shared HTTP client for venue adapters.
//!
//! Wraps `reqwest` with a bounded request timeout and maps transport and
//! status failures into the [`VenueError`] taxonomy, so every adapter speaks
//! the same error language. Requests are cancellable mid-flight: dropping the
//! future aborts the in-flight request.

use crate::domain::value_objects::VenueId;
use crate::infrastructure::venues::error::{VenueError, VenueResult};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// HTTP client with venue-error mapping.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `VenueError::Internal` if the underlying client cannot be
    /// constructed.
    pub fn new(venue: &VenueId, timeout_ms: u64) -> VenueResult<Self> {
        Self::with_headers(venue, timeout_ms, HeaderMap::new())
    }

    /// Creates a client with default headers applied to every request.
    ///
    /// # Errors
    ///
    /// Returns `VenueError::Internal` if the underlying client cannot be
    /// constructed.
    pub fn with_headers(venue: &VenueId, timeout_ms: u64, headers: HeaderMap) -> VenueResult<Self> {
        let timeout = Duration::from_millis(timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| VenueError::internal(venue.clone(), e.to_string()))?;
        Ok(Self { client, timeout })
    }

    /// Returns the configured request timeout.
    #[inline]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Performs a GET request with query parameters and decodes a JSON body.
    ///
    /// # Errors
    ///
    /// Maps timeouts to `VenueError::Timeout`, HTTP 429 to
    /// `VenueError::RateLimited`, other non-2xx statuses and decode failures
    /// to `VenueError::Upstream`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        venue: &VenueId,
        url: &str,
        params: &[(&str, String)],
    ) -> VenueResult<T> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.map_transport_error(venue, e))?;
        self.decode(venue, response).await
    }

    /// Performs a POST request with a JSON body and decodes a JSON response.
    ///
    /// # Errors
    ///
    /// Same mapping as [`get_json`](Self::get_json).
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        venue: &VenueId,
        url: &str,
        params: &[(&str, String)],
        body: &B,
    ) -> VenueResult<T> {
        let response = self
            .client
            .post(url)
            .query(params)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(venue, e))?;
        self.decode(venue, response).await
    }

    /// Probes a URL, returning true on any 2xx response.
    pub async fn health_check(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn map_transport_error(&self, venue: &VenueId, error: reqwest::Error) -> VenueError {
        if error.is_timeout() {
            VenueError::timeout(venue.clone(), self.timeout.as_millis() as u64)
        } else {
            VenueError::upstream(venue.clone(), None, error.to_string())
        }
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        venue: &VenueId,
        response: Response,
    ) -> VenueResult<T> {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1_000);
            return Err(VenueError::rate_limited(venue.clone(), retry_after_ms));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VenueError::upstream(
                venue.clone(),
                Some(status.as_u16()),
                truncate(&message, 256),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            VenueError::upstream(
                venue.clone(),
                Some(status.as_u16()),
                format!("invalid payload: {e}"),
            )
        })
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
