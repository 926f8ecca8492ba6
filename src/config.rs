use std::time::Duration;

use bon::Builder;

use crate::DEFAULT_BASE_URL;

/// Length of the locally tracked rate-limit window.
///
/// The API resets its counters once a minute; the extra second covers the drift between the
/// provider's clock and ours.
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(61);

/// How many times a single call is sent before giving up on repeated `429` responses.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`HttpClient`](crate::http::HttpClient) and [`Client`](crate::client::Client)
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use tatsu_client_sdk::config::Config;
///
/// let config = Config::builder()
///     .base_url("http://localhost:8080/v1/")
///     .rate_limit_window(Duration::from_secs(5))
///     .build();
///
/// assert_eq!(config.max_attempts(), 5);
/// ```
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
pub struct Config {
    /// API root every route template is joined onto. A missing trailing `/` is added.
    #[builder(into, default = DEFAULT_BASE_URL.to_owned())]
    base_url: String,
    /// Length of the window started by the first response seen after the previous one expired.
    #[builder(default = DEFAULT_RATE_LIMIT_WINDOW)]
    rate_limit_window: Duration,
    /// Upper bound on attempts per call, each `429` consumes one. Must be at least one.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,
    #[builder(default = DEFAULT_CONNECT_TIMEOUT)]
    connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

impl Config {
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn rate_limit_window(&self) -> Duration {
        self.rate_limit_window
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}
