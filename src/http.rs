//! The rate-limited request executor and the raw Tatsu API endpoints.
//!
//! [`HttpClient`] owns the authentication token, a lazily created transport session and the
//! per-client rate-limit [`Gate`]. Every endpoint method builds a [`Route`], sends it through
//! [`HttpClient::execute`] and hands back the undecoded response body. Use
//! [`Client`](crate::client::Client) for typed records instead.
//!
//! ## Available Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `guilds/{guild_id}/members/{member_id}/points` | GET | A member's points |
//! | `guilds/{guild_id}/members/{member_id}/points` | PATCH | Add or remove points |
//! | `guilds/{guild_id}/members/{member_id}/score` | PATCH | Add or remove score |
//! | `guilds/{guild_id}/rankings/members/{user_id}/{time_range}` | GET | A member's ranking |
//! | `guilds/{guild_id}/rankings/{time_range}` | GET | One page of guild rankings |
//! | `users/{user_id}/profile` | GET | A user's profile |
//! | `store/listings/{listing_id}` | GET | A store listing |

use std::sync::{Mutex, PoisonError};

use bon::Builder;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use secrecy::{ExposeSecret as _, SecretString};
use tokio::time::Instant;
use url::Url;

use crate::Result;
use crate::config::Config;
use crate::error::Error;
use crate::rate_limit::{Gate, RateLimiter};
use crate::route::{Route, RouteBuilder};
use crate::types::{ActionType, ModifyAmountRequest, Period};

/// Largest amount a single points or score update may carry.
pub const MAX_MODIFY_AMOUNT: i64 = 100_000;

/// Extra inputs of a single [`HttpClient::execute`] call.
///
/// # Example
///
/// ```
/// use tatsu_client_sdk::http::RequestOptions;
///
/// let options = RequestOptions::builder()
///     .json(serde_json::json!({"action": 0, "amount": 5}))
///     .query(vec![("offset".to_owned(), "100".to_owned())])
///     .build();
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default, Builder)]
pub struct RequestOptions {
    /// Serialized as the JSON request body.
    pub json: Option<serde_json::Value>,
    /// Appended to the URL as query parameters.
    #[builder(default)]
    pub query: Vec<(String, String)>,
    /// Sent along with the request. `User-Agent` and `Authorization` are always overwritten.
    #[builder(default)]
    pub headers: HeaderMap,
}

/// A small HTTP client that sends requests to the Tatsu API.
///
/// All calls made through one `HttpClient` share a single rate-limit gate: once any of them
/// receives `429 Too Many Requests`, the others hold off until the window has reset. Share it
/// behind an [`Arc`](std::sync::Arc), or use the cloneable [`Client`](crate::client::Client).
#[derive(Debug)]
pub struct HttpClient {
    config: Config,
    base_url: Url,
    token: SecretString,
    user_agent: HeaderValue,
    session: Mutex<Option<ReqwestClient>>,
    rate_limiter: RateLimiter,
}

impl HttpClient {
    /// Creates a client authenticating with `token`. No connection is opened until the first
    /// request.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse, the token cannot be sent as a header
    /// value, or `max_attempts` is zero.
    pub fn new<S: Into<String>>(token: S, config: Config) -> Result<HttpClient> {
        if config.max_attempts() == 0 {
            return Err(Error::validation("max_attempts must be at least 1"));
        }

        let mut base_url = Url::parse(config.base_url())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let token = SecretString::from(token.into());
        // Fail at construction rather than on the first request.
        HeaderValue::from_str(token.expose_secret())?;

        Ok(Self {
            rate_limiter: RateLimiter::new(config.rate_limit_window()),
            config,
            base_url,
            token,
            user_agent: HeaderValue::from_str(&user_agent())?,
            session: Mutex::new(None),
        })
    }

    /// Returns the URL every route is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current state of this client's rate-limit gate.
    #[must_use]
    pub fn gate(&self) -> Gate {
        self.rate_limiter.gate()
    }

    /// End of the locally tracked rate-limit window, if a response has been seen yet.
    #[must_use]
    pub fn reset_deadline(&self) -> Option<Instant> {
        self.rate_limiter.reset_deadline()
    }

    /// Drops the transport session. The next request transparently opens a new one.
    pub fn close(&self) {
        let session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        #[cfg(feature = "tracing")]
        if session.is_some() {
            tracing::debug!("closed HTTP session");
        }
        drop(session);
    }

    /// Whether there is currently no open transport session.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn session(&self) -> Result<ReqwestClient> {
        let mut session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(client) = session.as_ref() {
            return Ok(client.clone());
        }

        let client = ReqwestClient::builder()
            .connect_timeout(self.config.connect_timeout())
            .build()?;
        *session = Some(client.clone());

        #[cfg(feature = "tracing")]
        tracing::debug!("opened HTTP session");

        Ok(client)
    }

    fn headers(&self, mut headers: HeaderMap) -> Result<HeaderMap> {
        let mut authorization = HeaderValue::from_str(self.token.expose_secret())?;
        authorization.set_sensitive(true);

        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(AUTHORIZATION, authorization);

        Ok(headers)
    }

    /// Sends `route` and returns the raw response body.
    ///
    /// If the client's gate is closed the call first waits for it to reopen. A
    /// `429 Too Many Requests` response closes the gate until the current rate-limit window
    /// ends and then retries, up to [`Config::max_attempts`] attempts in total.
    ///
    /// # Errors
    ///
    /// - [`Kind::Status`](crate::error::Kind::Status) for any other `4xx` or `5xx` response,
    ///   after a single attempt. Redirects are followed by the transport; any other status
    ///   below 400 is returned as a successful body.
    /// - [`Kind::RateLimit`](crate::error::Kind::RateLimit) when every attempt was rate limited.
    /// - [`Kind::Internal`](crate::error::Kind::Internal) for transport failures.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip(self, route, options),
            fields(
                method = %route.method(),
                url = %route.url(),
                status_code
            )
        )
    )]
    #[cfg_attr(
        not(feature = "tracing"),
        expect(unused_variables, reason = "`attempt` is only recorded in traces")
    )]
    pub async fn execute(&self, route: Route, options: RequestOptions) -> Result<Vec<u8>> {
        let session = self.session()?;
        let headers = self.headers(options.headers)?;
        let method = route.method().clone();
        let path = route.url().path().to_owned();

        self.rate_limiter.wait_until_open().await;

        for attempt in 1..=self.config.max_attempts() {
            let mut request = session
                .request(method.clone(), route.url().clone())
                .headers(headers.clone());
            if let Some(body) = &options.json {
                request = request.json(body);
            }
            if !options.query.is_empty() {
                request = request.query(&options.query);
            }

            let response = request.send().await?;
            let now = Instant::now();
            let status_code = response.status();

            #[cfg(feature = "tracing")]
            {
                tracing::Span::current().record("status_code", status_code.as_u16());
                tracing::debug!(
                    method = %method,
                    url = %response.url(),
                    status = %status_code,
                    attempt,
                    "response received"
                );

                let header = |name: &str| {
                    response
                        .headers()
                        .get(name)
                        .and_then(|value| value.to_str().ok())
                        .map(ToOwned::to_owned)
                };
                tracing::debug!(
                    limit = ?header("X-RateLimit-Limit"),
                    remaining = ?header("X-RateLimit-Remaining"),
                    reset = ?header("X-RateLimit-Reset"),
                    "rate limit info"
                );
            }

            let deadline = self.rate_limiter.observe(now);

            if status_code == StatusCode::TOO_MANY_REQUESTS {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    method = %method,
                    path = %path,
                    attempt,
                    wait = ?deadline.saturating_duration_since(now),
                    "rate limited, waiting for the window to reset"
                );

                self.rate_limiter.wait_out(now, deadline).await;
                continue;
            }

            if status_code.is_client_error() || status_code.is_server_error() {
                let message = response.text().await.unwrap_or_default();

                #[cfg(feature = "tracing")]
                tracing::warn!(
                    status = %status_code,
                    method = %method,
                    path = %path,
                    message = %message,
                    "API request failed"
                );

                return Err(Error::status(status_code, method, path, message));
            }

            return Ok(response.bytes().await?.to_vec());
        }

        #[cfg(feature = "tracing")]
        tracing::error!(method = %method, path = %path, "rate limit attempts exhausted");

        Err(Error::rate_limit_exhausted(
            self.config.max_attempts(),
            method,
            path,
        ))
    }

    fn route(&self, builder: RouteBuilder) -> Result<Route> {
        builder.build(&self.base_url)
    }

    /// Get a guild member's points.
    pub async fn get_guild_member_points(&self, guild_id: u64, member_id: u64) -> Result<Vec<u8>> {
        let route = self.route(
            Route::builder(Method::GET, "guilds/{guild_id}/members/{member_id}/points")
                .param("guild_id", guild_id)
                .param("member_id", member_id),
        )?;

        self.execute(route, RequestOptions::default()).await
    }

    /// Add or remove `amount` points, which must be between 1 and 100,000.
    pub async fn modify_guild_member_points(
        &self,
        guild_id: u64,
        member_id: u64,
        action: ActionType,
        amount: i64,
    ) -> Result<Vec<u8>> {
        let body = modify_amount_body("Points", action, amount)?;
        let route = self.route(
            Route::builder(Method::PATCH, "guilds/{guild_id}/members/{member_id}/points")
                .param("guild_id", guild_id)
                .param("member_id", member_id),
        )?;

        self.execute(route, RequestOptions::builder().json(body).build())
            .await
    }

    /// Add or remove `amount` score, which must be between 1 and 100,000.
    pub async fn modify_guild_member_score(
        &self,
        guild_id: u64,
        member_id: u64,
        action: ActionType,
        amount: i64,
    ) -> Result<Vec<u8>> {
        let body = modify_amount_body("Score", action, amount)?;
        let route = self.route(
            Route::builder(Method::PATCH, "guilds/{guild_id}/members/{member_id}/score")
                .param("guild_id", guild_id)
                .param("member_id", member_id),
        )?;

        self.execute(route, RequestOptions::builder().json(body).build())
            .await
    }

    /// Get a guild member's ranking over `period`.
    pub async fn get_guild_member_ranking(
        &self,
        guild_id: u64,
        user_id: u64,
        period: Period,
    ) -> Result<Vec<u8>> {
        let route = self.route(
            Route::builder(
                Method::GET,
                "guilds/{guild_id}/rankings/members/{user_id}/{time_range}",
            )
            .param("guild_id", guild_id)
            .param("user_id", user_id)
            .param("time_range", period.to_string()),
        )?;

        self.execute(route, RequestOptions::default()).await
    }

    /// Get one page (up to 100 entries) of a guild's rankings, starting `offset` places from
    /// the top.
    pub async fn get_guild_rankings(
        &self,
        guild_id: u64,
        period: Period,
        offset: i64,
    ) -> Result<Vec<u8>> {
        if offset < 0 {
            return Err(Error::validation(format!(
                "Pagination offset must be greater than or equal to 0, got {offset}"
            )));
        }

        let route = self.route(
            Route::builder(Method::GET, "guilds/{guild_id}/rankings/{time_range}")
                .param("guild_id", guild_id)
                .param("time_range", period.to_string()),
        )?;
        let options = RequestOptions::builder()
            .query(vec![("offset".to_owned(), offset.to_string())])
            .build();

        self.execute(route, options).await
    }

    /// Get a user's profile.
    pub async fn get_user_profile(&self, user_id: u64) -> Result<Vec<u8>> {
        let route = self.route(
            Route::builder(Method::GET, "users/{user_id}/profile").param("user_id", user_id),
        )?;

        self.execute(route, RequestOptions::default()).await
    }

    /// Get a store listing.
    pub async fn get_store_listing(&self, listing_id: &str) -> Result<Vec<u8>> {
        let route = self.route(
            Route::builder(Method::GET, "store/listings/{listing_id}")
                .param("listing_id", listing_id),
        )?;

        self.execute(route, RequestOptions::default()).await
    }
}

fn modify_amount_body(what: &str, action: ActionType, amount: i64) -> Result<serde_json::Value> {
    let amount = u32::try_from(amount)
        .ok()
        .filter(|amount| (1..=MAX_MODIFY_AMOUNT).contains(&i64::from(*amount)))
        .ok_or_else(|| {
            Error::validation(format!(
                "{what} amount must be between 1 and 100,000, got {amount}"
            ))
        })?;

    let body = ModifyAmountRequest::builder()
        .action(action)
        .amount(amount)
        .build();

    Ok(serde_json::to_value(body)?)
}

fn user_agent() -> String {
    format!(
        "{name} ({repository} {version}) Rust {os}/{arch} reqwest",
        name = env!("CARGO_PKG_NAME"),
        repository = env!("CARGO_PKG_REPOSITORY"),
        version = env!("CARGO_PKG_VERSION"),
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
    )
}
