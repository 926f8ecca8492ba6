//! Request and response records for the Tatsu API, plus the enumerations they share.

use std::str::FromStr;

use serde_repr::{Deserialize_repr, Serialize_repr};
use strum_macros::Display;

/// Date and time types for timestamps in API responses.
pub use chrono::{DateTime, Utc};

use crate::error::Error;

pub mod request;
pub mod response;

pub use request::ModifyAmountRequest;
pub use response::{
    GuildMemberPoints, GuildMemberRanking, GuildMemberScore, GuildRankings, Ranking, StoreListing,
    StorePrice, User,
};

/// How a points or score update is applied. Sent as its integer value.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize_repr, Deserialize_repr)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum ActionType {
    Add = 0,
    Remove = 1,
}

/// Tatsu subscription tier of a user.
#[non_exhaustive]
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum SubscriptionType {
    #[default]
    None = 0,
    Supporter = 1,
    #[strum(to_string = "Supporter+")]
    Supporter2 = 2,
    #[strum(to_string = "Supporter++")]
    Supporter3 = 3,
}

/// Currency a store price is denominated in.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum CurrencyType {
    Credits = 0,
    Tokens = 1,
    Emeralds = 2,
}

/// Time range a ranking is computed over.
///
/// Rendered as the lowercase path segment the API expects:
///
/// ```
/// use tatsu_client_sdk::types::Period;
///
/// assert_eq!(Period::Month.to_string(), "month");
/// assert_eq!("week".parse::<Period>().unwrap(), Period::Week);
/// assert!("year".parse::<Period>().is_err());
/// ```
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Period {
    /// All-time
    #[default]
    All,
    /// The last month
    Month,
    /// The last week
    Week,
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "month" => Ok(Self::Month),
            "week" => Ok(Self::Week),
            other => Err(Error::validation(format!(
                "period must be one of `all`, `month` or `week`, got `{other}`"
            ))),
        }
    }
}
