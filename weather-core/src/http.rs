//! HTTP transport and fetch-with-retry.

use std::{error::Error as StdError, fmt::Debug, io, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    config::RetryPolicy,
    error::{ConnectionKind, WeatherError},
};

/// Query parameters appended to a request URL.
pub type Query<'a> = &'a [(&'a str, String)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single HTTP GET. Implementations report connection-level failures as
/// [`WeatherError::Connection`] or [`WeatherError::Timeout`] and never inspect
/// the status code.
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    async fn get(&self, url: &str, query: Query<'_>) -> Result<HttpResponse, WeatherError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, query: Query<'_>) -> Result<HttpResponse, WeatherError> {
        let res = self.http.get(url).query(query).send().await.map_err(classify)?;

        let status = res.status().as_u16();
        let body = res.text().await.map_err(classify)?;

        Ok(HttpResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> WeatherError {
    if err.is_timeout() {
        return WeatherError::connection(ConnectionKind::TimedOut, err.to_string());
    }

    let kind = io_error_kind(&err)
        .map(ConnectionKind::from_io)
        .unwrap_or(ConnectionKind::Other);

    WeatherError::connection(kind, err.to_string())
}

fn io_error_kind(err: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = cause.source();
    }
    None
}

/// GET-and-parse with bounded retries on transient failures.
#[derive(Debug, Clone)]
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Fetches `url` and parses the body as `T`.
    ///
    /// Non-2xx statuses and malformed bodies fail immediately. Retryable
    /// connection errors wait [`RetryPolicy::backoff`]; request timeouts wait
    /// the flat [`RetryPolicy::timeout_delay`]. Once retries run out the last
    /// error is returned.
    pub async fn fetch_json<T>(&self, url: &str, query: Query<'_>) -> Result<T, WeatherError>
    where
        T: DeserializeOwned,
    {
        let mut retries_left = self.policy.max_retries;

        loop {
            match self.attempt(url, query).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retries_left > 0 => {
                    let delay = self.delay_after(&err, retries_left);
                    warn!(
                        %url,
                        error = %err,
                        retries_left,
                        ?delay,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retries_left -= 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn attempt<T>(&self, url: &str, query: Query<'_>) -> Result<T, WeatherError>
    where
        T: DeserializeOwned,
    {
        let response =
            send_with_deadline(self.transport.as_ref(), url, query, self.policy.timeout).await?;
        parse_json(url, response)
    }

    fn delay_after(&self, err: &WeatherError, retries_left: u32) -> Duration {
        match err {
            WeatherError::Timeout(_) => self.policy.timeout_delay,
            _ => self.policy.backoff(retries_left),
        }
    }
}

pub(crate) async fn send_with_deadline(
    transport: &dyn HttpTransport,
    url: &str,
    query: Query<'_>,
    deadline: Duration,
) -> Result<HttpResponse, WeatherError> {
    debug!(%url, "GET");
    match tokio::time::timeout(deadline, transport.get(url, query)).await {
        Ok(result) => result,
        Err(_) => Err(WeatherError::Timeout(deadline)),
    }
}

/// Checks the status and parses the body.
pub(crate) fn parse_json<T>(url: &str, response: HttpResponse) -> Result<T, WeatherError>
where
    T: DeserializeOwned,
{
    if !response.is_success() {
        return Err(WeatherError::HttpStatus {
            url: url.to_string(),
            status: response.status,
            body: truncate_body(&response.body),
        });
    }

    serde_json::from_str(&response.body)
        .map_err(|source| WeatherError::Parse { url: url.to_string(), source })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
