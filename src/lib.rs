#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod rate_limit;
pub mod route;
pub(crate) mod serde_helpers;
pub mod types;

pub use client::Client;
pub use config::Config;
pub use http::HttpClient;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Root of the public Tatsu API. Route templates are joined onto this.
pub const DEFAULT_BASE_URL: &str = "https://api.tatsu.gg/v1/";

/// Environment variable the demos read the Tatsu API key from.
pub const TOKEN_VAR: &str = "TATSU_API_KEY";
