#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]
#![allow(
    unused,
    reason = "Each test binary only uses part of the shared helpers"
)]

use std::time::Duration;

use httpmock::{Mock, MockServer};
use tatsu_client_sdk::config::Config;
use tatsu_client_sdk::{Client, HttpClient};

pub const TOKEN: &str = "eUsBHScCkK-L5VVU4dDVMalFl069mwbTk";

pub const GUILD_ID: u64 = 602_735_169_090_224_139;
pub const USER_ID: u64 = 158_646_501_696_864_256;

/// Short enough to keep rate-limit tests fast, long enough to observe the gate closed.
pub const WINDOW: Duration = Duration::from_millis(400);

pub fn config(server: &MockServer, window: Duration) -> Config {
    Config::builder()
        .base_url(server.url("/v1/"))
        .rate_limit_window(window)
        .build()
}

pub fn http_client(server: &MockServer) -> anyhow::Result<HttpClient> {
    Ok(HttpClient::new(TOKEN, config(server, WINDOW))?)
}

pub fn client(server: &MockServer) -> anyhow::Result<Client> {
    Ok(Client::new(TOKEN, config(server, WINDOW))?)
}

/// Polls the mock server until `mock` has been hit at least `hits` times.
pub async fn wait_for_hits(mock: &Mock<'_>, hits: usize) {
    for _ in 0..500 {
        if mock.hits_async().await >= hits {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("mock was not hit {hits} times in time");
}

/// Polls `condition` until it holds.
pub async fn eventually<F: FnMut() -> bool>(mut condition: F) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition did not hold in time");
}
