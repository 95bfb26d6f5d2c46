/// Resilient request execution against the upstream catalog
///
/// Every logical request goes through [`RequestExecutor::execute`], which owns the
/// retry loop, backoff, cache-busting and failure classification. The network itself
/// sits behind the [`Transport`] trait so the policy can be exercised without sockets.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::{Client as HttpClient, Url};

use crate::error::{AppError, AppResult, AttemptError};

/// Query parameter carrying the cache-busting value
pub const CACHE_BUST_PARAM: &str = "_cb";

/// Raw HTTP outcome of one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single GET. Transport-level failures (DNS, connect, timeout) are
/// reported as `Err`; any HTTP status, including errors, is `Ok`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: Url) -> Result<RawResponse, String>;
}

/// reqwest-backed transport with a per-attempt timeout
#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: HttpClient,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http_client })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: Url) -> Result<RawResponse, String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| e.without_url().to_string())?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| e.without_url().to_string())?;

        Ok(RawResponse { status, body })
    }
}

/// Bounded exponential retry policy
///
/// Attempt `n` (1-based) that fails with a retryable error is followed by a wait of
/// `base_delay * 2^(n-1)`, except after the last attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    retry_client_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            retry_client_errors: true,
        }
    }

    /// When false, 4xx statuses other than 429 end the request without retrying
    pub fn with_client_error_retries(mut self, enabled: bool) -> Self {
        self.retry_client_errors = enabled;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after the given failed attempt
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Every failure is retried unless client-error retries are switched off.
    pub fn is_retryable(&self, error: &AttemptError) -> bool {
        match error {
            AttemptError::UpstreamError { status, .. }
                if (400..500).contains(status) && *status != 429 =>
            {
                self.retry_client_errors
            }
            _ => true,
        }
    }

    /// Sum of all backoff delays when every attempt fails
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .map(|attempt| self.backoff_after(attempt))
            .sum()
    }
}

/// Describes one upstream endpoint: a path under the base URL plus query pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Whether intermediary caches may answer a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Default,
    Bypass,
}

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub base_url: String,
    pub api_key: String,
    pub language: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

/// Lifecycle of one logical request
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttemptState {
    Attempting(u32),
    Succeeded(String),
    Exhausted { attempts: u32, last: AttemptError },
}

#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_key: String,
    language: String,
    retry: RetryPolicy,
    cache_buster: Arc<AtomicU64>,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>, config: &ExecutorConfig) -> Self {
        let seed = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            retry: config.retry.clone(),
            cache_buster: Arc::new(AtomicU64::new(seed)),
        }
    }

    /// Builds the executor on top of a reqwest transport
    pub fn from_config(config: &ExecutorConfig) -> AppResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn build_url(&self, endpoint: &Endpoint, cache: CachePolicy) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint.path))
            .map_err(|e| AppError::Internal(format!("invalid endpoint {}: {}", endpoint.path, e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.api_key);
            if !self.language.is_empty() {
                pairs.append_pair("language", &self.language);
            }
            for (key, value) in &endpoint.query {
                pairs.append_pair(key, value);
            }
            if cache == CachePolicy::Bypass {
                let value = self.cache_buster.fetch_add(1, Ordering::Relaxed);
                pairs.append_pair(CACHE_BUST_PARAM, &value.to_string());
            }
        }

        Ok(url)
    }

    /// Executes the request with retries and decodes the body as JSON
    ///
    /// Fails with [`AppError::UpstreamUnavailable`] once the attempt budget is spent,
    /// carrying the last classified [`AttemptError`]. A success body that is not JSON
    /// fails immediately with [`AppError::InvalidResponse`].
    pub async fn execute(
        &self,
        endpoint: &Endpoint,
        cache: CachePolicy,
    ) -> AppResult<serde_json::Value> {
        let max_attempts = self.retry.max_attempts();
        let mut state = AttemptState::Attempting(1);

        let body = loop {
            match state {
                AttemptState::Attempting(attempt) => {
                    let url = self.build_url(endpoint, cache)?;
                    let error = match self.transport.get(url).await {
                        Ok(response) if response.is_success() => {
                            state = AttemptState::Succeeded(response.body);
                            continue;
                        }
                        Ok(response) => AttemptError::UpstreamError {
                            status: response.status,
                            body: response.body,
                        },
                        Err(message) => AttemptError::NetworkUnreachable(message),
                    };

                    if attempt >= max_attempts || !self.retry.is_retryable(&error) {
                        state = AttemptState::Exhausted {
                            attempts: attempt,
                            last: error,
                        };
                        continue;
                    }

                    let delay = self.retry.backoff_after(attempt);
                    tracing::warn!(
                        endpoint = %endpoint.path,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Upstream attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    state = AttemptState::Attempting(attempt + 1);
                }
                AttemptState::Succeeded(body) => break body,
                AttemptState::Exhausted { attempts, last } => {
                    tracing::error!(
                        endpoint = %endpoint.path,
                        attempts,
                        max_attempts,
                        error = %last,
                        "Upstream request exhausted retries"
                    );
                    return Err(AppError::UpstreamUnavailable {
                        endpoint: endpoint.path.clone(),
                        attempts,
                        last,
                    });
                }
            }
        };

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(endpoint = %endpoint.path, error = %e, "Upstream body is not JSON");
            AppError::InvalidResponse(format!("{}: {}", endpoint.path, e))
        })
    }
}
