//! Typed client for the Tatsu API.
//!
//! # Example
//!
//! ```no_run
//! use tatsu_client_sdk::client::Client;
//! use tatsu_client_sdk::config::Config;
//! use tatsu_client_sdk::types::Period;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("my-api-key", Config::default())?;
//!
//! let points = client.get_member_points(602_735_169_090_224_139, 158_646_501_696_864_256).await?;
//! println!("{} points, rank {}", points.points, points.rank);
//!
//! // Ranks 1 through 250, fetched as three concurrent pages
//! let top = client
//!     .get_guild_rankings(602_735_169_090_224_139, Period::Month, 1, Some(250))
//!     .await?;
//! println!("{} ranked members", top.rankings.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use futures::future::try_join_all;

use crate::Result;
use crate::config::Config;
use crate::error::Error;
use crate::http::HttpClient;
use crate::serde_helpers::decode;
use crate::types::{
    ActionType, GuildMemberPoints, GuildMemberRanking, GuildMemberScore, GuildRankings, Period,
    StoreListing, User,
};

/// Number of rankings the API returns per page.
pub const RANKINGS_PAGE_SIZE: u64 = 100;

/// Most pages a single [`Client::get_guild_rankings`] call requests concurrently.
pub const MAX_RANKINGS_PAGES: u64 = 100;

/// Client for the Tatsu API returning typed records.
///
/// Cheap to clone; clones share the same session and rate-limit gate.
#[derive(Clone, Debug)]
pub struct Client {
    http: Arc<HttpClient>,
}

impl Client {
    /// Creates a client authenticating with the Tatsu API key `token`.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::new`].
    pub fn new<S: Into<String>>(token: S, config: Config) -> Result<Client> {
        Ok(Self {
            http: Arc::new(HttpClient::new(token, config)?),
        })
    }

    /// The underlying raw client.
    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Close the internal HTTP session.
    pub fn close(&self) {
        self.http.close();
    }

    /// Get a guild member's points.
    pub async fn get_member_points(
        &self,
        guild_id: u64,
        member_id: u64,
    ) -> Result<GuildMemberPoints> {
        let body = self.http.get_guild_member_points(guild_id, member_id).await?;
        decode(&body)
    }

    /// Add `amount` points to a member, or remove them if `amount` is negative, and return
    /// the updated points.
    pub async fn update_member_points(
        &self,
        guild_id: u64,
        member_id: u64,
        amount: i64,
    ) -> Result<GuildMemberPoints> {
        let (action, amount) = split_amount(amount);
        let body = self
            .http
            .modify_guild_member_points(guild_id, member_id, action, amount)
            .await?;
        decode(&body)
    }

    /// Add `amount` score to a member, or remove it if `amount` is negative, and return the
    /// updated score.
    pub async fn update_member_score(
        &self,
        guild_id: u64,
        member_id: u64,
        amount: i64,
    ) -> Result<GuildMemberScore> {
        let (action, amount) = split_amount(amount);
        let body = self
            .http
            .modify_guild_member_score(guild_id, member_id, action, amount)
            .await?;
        decode(&body)
    }

    /// Get the ranking of a guild member over `period`.
    pub async fn get_member_ranking(
        &self,
        guild_id: u64,
        member_id: u64,
        period: Period,
    ) -> Result<GuildMemberRanking> {
        let body = self
            .http
            .get_guild_member_ranking(guild_id, member_id, period)
            .await?;
        decode(&body)
    }

    /// Get the rankings within a guild over `period`.
    ///
    /// `start` is the first rank to include, counting from 1. Without `end` a single page of
    /// up to [`RANKINGS_PAGE_SIZE`] entries is returned. With `end`, every page covering
    /// `start..=end` is requested concurrently and the result holds exactly the ranks in that
    /// range.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `start` is 0, if `end` is 0 or not greater than
    /// `start`, or if the range needs more than [`MAX_RANKINGS_PAGES`] pages.
    pub async fn get_guild_rankings(
        &self,
        guild_id: u64,
        period: Period,
        start: u64,
        end: Option<u64>,
    ) -> Result<GuildRankings> {
        if start < 1 {
            return Err(Error::validation(
                "Start parameter must be greater than or equal to 1.",
            ));
        }

        // The API counts offsets from 0.
        let first_offset = start - 1;

        let Some(end) = end else {
            let body = self
                .http
                .get_guild_rankings(guild_id, period, to_offset(first_offset)?)
                .await?;
            return decode(&body);
        };

        if end < 1 {
            return Err(Error::validation(
                "End parameter must be greater than or equal to 1.",
            ));
        }
        if end <= start {
            return Err(Error::validation("End must be greater than start if used."));
        }

        let pages = (end - start).div_ceil(RANKINGS_PAGE_SIZE);
        if pages > MAX_RANKINGS_PAGES {
            return Err(Error::validation(format!(
                "Range {start}..={end} spans {pages} pages, at most {MAX_RANKINGS_PAGES} are allowed."
            )));
        }

        let last_offset = end - 1;
        let offsets = (first_offset..last_offset)
            .step_by(usize::try_from(RANKINGS_PAGE_SIZE).unwrap_or(usize::MAX))
            .map(to_offset)
            .collect::<Result<Vec<_>>>()?;

        let pages = try_join_all(offsets.into_iter().map(|offset| async move {
            let body = self
                .http
                .get_guild_rankings(guild_id, period, offset)
                .await?;
            decode::<GuildRankings>(&body)
        }))
        .await?;

        let rankings = pages
            .into_iter()
            .flat_map(|page| page.rankings)
            .filter(|ranking| (start..=end).contains(&ranking.rank))
            .collect();

        Ok(GuildRankings::builder()
            .guild_id(guild_id.to_string())
            .rankings(rankings)
            .build())
    }

    /// Get a user's profile.
    pub async fn get_user(&self, user_id: u64) -> Result<User> {
        let body = self.http.get_user_profile(user_id).await?;
        decode(&body)
    }

    /// Get a listing from the Tatsu store.
    pub async fn get_store_listing(&self, listing_id: &str) -> Result<StoreListing> {
        let body = self.http.get_store_listing(listing_id).await?;
        decode(&body)
    }
}

/// Splits a signed amount into the action the API expects and its magnitude.
fn split_amount(amount: i64) -> (ActionType, i64) {
    let action = if amount < 0 {
        ActionType::Remove
    } else {
        ActionType::Add
    };

    // `i64::MIN` has no positive counterpart; saturating keeps it out of range instead.
    (action, amount.saturating_abs())
}

fn to_offset(offset: u64) -> Result<i64> {
    i64::try_from(offset)
        .map_err(|e| Error::validation(format!("offset {offset} is too large: {e}")))
}
