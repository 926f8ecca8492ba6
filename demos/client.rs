//! Walks every Tatsu API route once with a real API key.
//!
//! Run with tracing enabled:
//! ```sh
//! TATSU_API_KEY=... GUILD_ID=... USER_ID=... \
//!     RUST_LOG=info,tatsu_client_sdk=debug,hyper_util=off,hyper=off,reqwest=off,rustls=off \
//!     cargo run --example client --features tracing
//! ```
//!
//! Optionally log to a file:
//! ```sh
//! LOG_FILE=client.log TATSU_API_KEY=... cargo run --example client --features tracing
//! ```
//!
//! Set `MODIFY=1` to also add (and then remove) a single point and score.

use std::fs::File;

use anyhow::Context as _;
use tatsu_client_sdk::types::Period;
use tatsu_client_sdk::{Client, Config, TOKEN_VAR};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

fn id_var(name: &str) -> anyhow::Result<u64> {
    std::env::var(name)
        .with_context(|| format!("{name} must be set"))?
        .parse()
        .with_context(|| format!("{name} must be a Discord ID"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = File::create(path)?;
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let token = std::env::var(TOKEN_VAR).with_context(|| format!("{TOKEN_VAR} must be set"))?;
    let guild_id = id_var("GUILD_ID")?;
    let user_id = id_var("USER_ID")?;

    let client = Client::new(token, Config::default())?;

    match client.get_member_points(guild_id, user_id).await {
        Ok(points) => info!(endpoint = "member_points", points = points.points, rank = points.rank),
        Err(e) => error!(endpoint = "member_points", error = %e),
    }

    if std::env::var("MODIFY").is_ok_and(|value| value == "1") {
        match client.update_member_points(guild_id, user_id, 1).await {
            Ok(points) => info!(endpoint = "update_points", points = points.points),
            Err(e) => error!(endpoint = "update_points", error = %e),
        }
        match client.update_member_points(guild_id, user_id, -1).await {
            Ok(points) => info!(endpoint = "update_points", points = points.points),
            Err(e) => error!(endpoint = "update_points", error = %e),
        }
        match client.update_member_score(guild_id, user_id, 1).await {
            Ok(score) => info!(endpoint = "update_score", score = score.score),
            Err(e) => error!(endpoint = "update_score", error = %e),
        }
        match client.update_member_score(guild_id, user_id, -1).await {
            Ok(score) => info!(endpoint = "update_score", score = score.score),
            Err(e) => error!(endpoint = "update_score", error = %e),
        }
    }

    for period in [Period::All, Period::Month, Period::Week] {
        match client.get_member_ranking(guild_id, user_id, period).await {
            Ok(ranking) => info!(
                endpoint = "member_ranking",
                period = %period,
                rank = ranking.rank,
                score = ranking.score
            ),
            Err(e) => error!(endpoint = "member_ranking", period = %period, error = %e),
        }
    }

    match client
        .get_guild_rankings(guild_id, Period::All, 114, Some(250))
        .await
    {
        Ok(rankings) => info!(
            endpoint = "guild_rankings",
            count = rankings.rankings.len(),
            first = ?rankings.rankings.first().map(|r| r.rank),
            last = ?rankings.rankings.last().map(|r| r.rank)
        ),
        Err(e) => error!(endpoint = "guild_rankings", error = %e),
    }

    match client.get_user(user_id).await {
        Ok(user) => info!(
            endpoint = "user",
            username = %user.username,
            subscription = %user.subscription_type,
            xp = user.xp
        ),
        Err(e) => error!(endpoint = "user", error = %e),
    }

    client.close();

    Ok(())
}
