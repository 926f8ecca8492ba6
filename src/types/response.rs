use bon::Builder;
use serde::Deserialize;

use super::{CurrencyType, DateTime, SubscriptionType, Utc};

/// A guild member's points.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct GuildMemberPoints {
    /// Discord ID of the guild.
    pub guild_id: String,
    pub points: u64,
    /// Rank of the member based on their points.
    pub rank: u64,
    /// Discord ID of the member.
    pub user_id: String,
}

/// A guild member's score.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct GuildMemberScore {
    pub guild_id: String,
    pub score: u64,
    pub user_id: String,
}

/// A guild member's ranking over some [`Period`](super::Period).
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct GuildMemberRanking {
    pub guild_id: String,
    pub rank: u64,
    pub score: u64,
    pub user_id: String,
}

/// One entry of [`GuildRankings`].
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct Ranking {
    pub rank: u64,
    pub score: u64,
    pub user_id: String,
}

/// Rankings within a guild over some [`Period`](super::Period), ordered by rank.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct GuildRankings {
    pub guild_id: String,
    #[serde(default)]
    #[builder(default)]
    pub rankings: Vec<Ranking>,
}

/// A Tatsu user's profile.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct User {
    /// Discord avatar hash.
    pub avatar_hash: String,
    /// Discord avatar URL.
    pub avatar_url: String,
    pub credits: i64,
    /// Discord 4 digit discriminator.
    pub discriminator: String,
    /// Discord ID.
    pub id: String,
    /// Text of the profile's info box.
    pub info_box: String,
    pub reputation: i64,
    pub subscription_type: SubscriptionType,
    /// Renewal time, only present while a subscription is active.
    #[serde(default)]
    pub subscription_renewal: Option<DateTime<Utc>>,
    /// Text of the profile's title.
    pub title: String,
    pub tokens: i64,
    /// Discord username.
    pub username: String,
    pub xp: i64,
}

/// A price of a store item.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Builder)]
pub struct StorePrice {
    pub currency: CurrencyType,
    pub amount: f64,
}

/// A listing in the Tatsu store.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct StoreListing {
    pub id: String,
    pub name: String,
    pub summary: String,
    pub description: String,
    /// Whether the item is new in the store.
    pub new: bool,
    /// URL of an image preview.
    pub preview: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub prices: Vec<StorePrice>,
    #[serde(default)]
    #[builder(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    #[builder(default)]
    pub tags: Vec<String>,
}
