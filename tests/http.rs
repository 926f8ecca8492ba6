#![allow(clippy::unwrap_used, reason = "tests can panic on unwrap")]

mod common;

mod endpoints {
    use httpmock::{
        Method::{GET, PATCH},
        MockServer,
    };
    use reqwest::StatusCode;
    use serde_json::json;
    use tatsu_client_sdk::error::{Kind, Validation};
    use tatsu_client_sdk::types::{ActionType, Period};

    use crate::common::{GUILD_ID, TOKEN, USER_ID, http_client};

    #[tokio::test]
    async fn get_guild_member_points_should_return_body_unchanged() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;
        let body = r#"{"guild_id":"10","points":1500,"rank":3,"user_id":"20"}  "#;

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/guilds/10/members/20/points")
                .header("Authorization", TOKEN)
                .header_exists("User-Agent");
            then.status(StatusCode::OK).body(body);
        });

        let response = client.get_guild_member_points(10, 20).await?;

        assert_eq!(response, body.as_bytes());
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn modify_guild_member_score_should_send_action_and_amount() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/v1/guilds/10/members/20/score")
                .header("Authorization", TOKEN)
                .json_body(json!({"action": 0, "amount": 50}));
            then.status(StatusCode::OK)
                .json_body(json!({"guild_id": "10", "score": 150, "user_id": "20"}));
        });

        client
            .modify_guild_member_score(10, 20, ActionType::Add, 50)
            .await?;

        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn modify_guild_member_points_should_send_remove() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path(format!("/v1/guilds/{GUILD_ID}/members/{USER_ID}/points"))
                .json_body(json!({"action": 1, "amount": 100_000}));
            then.status(StatusCode::OK).json_body(json!({}));
        });

        client
            .modify_guild_member_points(GUILD_ID, USER_ID, ActionType::Remove, 100_000)
            .await?;

        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_amount_should_fail_without_request() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(PATCH);
            then.status(StatusCode::OK).json_body(json!({}));
        });

        for amount in [0, -5, 100_001] {
            let err = client
                .modify_guild_member_points(10, 20, ActionType::Add, amount)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), Kind::Validation);

            let err = client
                .modify_guild_member_score(10, 20, ActionType::Add, amount)
                .await
                .unwrap_err();
            let validation = err.downcast_ref::<Validation>().unwrap();
            assert!(validation.reason.contains("between 1 and 100,000"));
        }

        mock.assert_hits(0);

        Ok(())
    }

    #[tokio::test]
    async fn get_guild_member_ranking_should_use_period_segment() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/guilds/10/rankings/members/20/month");
            then.status(StatusCode::OK).json_body(json!({
                "guild_id": "10", "rank": 1, "score": 9000, "user_id": "20"
            }));
        });

        client.get_guild_member_ranking(10, 20, Period::Month).await?;

        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn get_guild_rankings_should_send_offset() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/guilds/10/rankings/all")
                .query_param("offset", "200");
            then.status(StatusCode::OK)
                .json_body(json!({"guild_id": "10", "rankings": []}));
        });

        client.get_guild_rankings(10, Period::All, 200).await?;

        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn negative_offset_should_fail_without_request() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(GET);
            then.status(StatusCode::OK).json_body(json!({}));
        });

        let err = client
            .get_guild_rankings(10, Period::Week, -1)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
        mock.assert_hits(0);

        Ok(())
    }

    #[tokio::test]
    async fn get_user_profile_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(GET).path(format!("/v1/users/{USER_ID}/profile"));
            then.status(StatusCode::OK).json_body(json!({"id": USER_ID.to_string()}));
        });

        let body = client.get_user_profile(USER_ID).await?;

        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body)?,
            json!({"id": USER_ID.to_string()})
        );
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn get_store_listing_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(GET).path("/v1/store/listings/dark-theme");
            then.status(StatusCode::OK).json_body(json!({"id": "dark-theme"}));
        });

        client.get_store_listing("dark-theme").await?;

        mock.assert();

        Ok(())
    }
}

mod execute {
    use httpmock::{Method::GET, MockServer};
    use reqwest::header::{HeaderMap, HeaderValue};
    use reqwest::{Method, StatusCode};
    use serde_json::json;
    use tatsu_client_sdk::error::{Kind, Status};
    use tatsu_client_sdk::http::RequestOptions;
    use tatsu_client_sdk::route::Route;

    use crate::common::{TOKEN, http_client};

    #[tokio::test]
    async fn caller_headers_should_merge_under_required_headers() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/users/1/profile")
                .header("Authorization", TOKEN)
                .header("X-Request-Id", "abc-123");
            then.status(StatusCode::OK).json_body(json!({}));
        });

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("someone-else"));
        headers.insert("X-Request-Id", HeaderValue::from_static("abc-123"));

        let route = Route::builder(Method::GET, "users/{user_id}/profile")
            .param("user_id", 1_u64)
            .build(client.base_url())?;
        client
            .execute(route, RequestOptions::builder().headers(headers).build())
            .await?;

        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn forbidden_should_fail_after_one_attempt() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(GET).path("/v1/users/1/profile");
            then.status(StatusCode::FORBIDDEN)
                .json_body(json!({"code": 403, "message": "Missing Permissions"}));
        });

        let err = client.get_user_profile(1).await.unwrap_err();

        assert_eq!(err.kind(), Kind::Status);
        let status = err.downcast_ref::<Status>().unwrap();
        assert_eq!(status.status_code, StatusCode::FORBIDDEN);
        assert_eq!(status.method, Method::GET);
        assert_eq!(status.path, "/v1/users/1/profile");
        assert!(status.message.contains("Missing Permissions"));
        mock.assert_hits(1);

        Ok(())
    }

    #[tokio::test]
    async fn not_found_should_fail() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(GET).path("/v1/store/listings/missing");
            then.status(StatusCode::NOT_FOUND).body("Unknown listing");
        });

        let err = client.get_store_listing("missing").await.unwrap_err();

        assert_eq!(err.kind(), Kind::Status);
        mock.assert_hits(1);

        Ok(())
    }

    #[tokio::test]
    async fn non_error_status_should_return_body() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let accepted = server.mock(|when, then| {
            when.method(GET).path("/v1/users/1/profile");
            then.status(StatusCode::ACCEPTED).body("queued");
        });
        let not_modified = server.mock(|when, then| {
            when.method(GET).path("/v1/users/2/profile");
            then.status(StatusCode::NOT_MODIFIED);
        });

        assert_eq!(client.get_user_profile(1).await?, b"queued");
        assert!(client.get_user_profile(2).await?.is_empty());
        accepted.assert_hits(1);
        not_modified.assert_hits(1);

        Ok(())
    }

    #[tokio::test]
    async fn dot_segment_listing_should_fail_without_request() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(GET);
            then.status(StatusCode::OK).json_body(json!({}));
        });

        for listing_id in ["..", "."] {
            let err = client.get_store_listing(listing_id).await.unwrap_err();
            assert_eq!(err.kind(), Kind::Configuration, "{listing_id:?}");
        }
        mock.assert_hits(0);

        Ok(())
    }

    #[tokio::test]
    async fn closed_session_should_reopen_on_next_request() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = http_client(&server)?;

        let mock = server.mock(|when, then| {
            when.method(GET).path("/v1/users/1/profile");
            then.status(StatusCode::OK).json_body(json!({}));
        });

        assert!(client.is_closed());
        client.get_user_profile(1).await?;
        assert!(!client.is_closed());

        client.close();
        assert!(client.is_closed());

        client.get_user_profile(1).await?;
        assert!(!client.is_closed());
        mock.assert_hits(2);

        client.close();
        client.close();
        assert!(client.is_closed());

        Ok(())
    }
}

mod rate_limit {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use httpmock::{Method::GET, MockServer};
    use reqwest::StatusCode;
    use serde_json::json;
    use tatsu_client_sdk::HttpClient;
    use tatsu_client_sdk::config::Config;
    use tatsu_client_sdk::error::{Kind, RateLimitExhausted};
    use tatsu_client_sdk::rate_limit::Gate;

    use crate::common::{TOKEN, WINDOW, config, eventually, http_client, wait_for_hits};

    #[tokio::test(flavor = "multi_thread")]
    async fn rate_limited_twice_should_retry_until_success() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let client = Arc::new(http_client(&server)?);

        let mut limited = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/users/1/profile");
                then.status(StatusCode::TOO_MANY_REQUESTS)
                    .header("X-RateLimit-Limit", "60")
                    .header("X-RateLimit-Remaining", "0")
                    .header("X-RateLimit-Reset", "1700000000");
            })
            .await;

        let started = Instant::now();
        let call = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.get_user_profile(1).await })
        };

        wait_for_hits(&limited, 2).await;
        limited.assert_hits_async(2).await;
        limited.delete_async().await;

        let ok = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/users/1/profile");
                then.status(StatusCode::OK).body(r#"{"id":"1"}"#);
            })
            .await;

        let body = call.await??;

        assert_eq!(body, br#"{"id":"1"}"#);
        assert!(
            started.elapsed() >= WINDOW * 2,
            "waited out two windows, took {:?}",
            started.elapsed()
        );
        ok.assert_hits_async(1).await;
        assert_eq!(client.gate(), Gate::Open);

        Ok(())
    }

    #[tokio::test]
    async fn rate_limited_every_attempt_should_exhaust() -> anyhow::Result<()> {
        let server = MockServer::start();
        let config = Config::builder()
            .base_url(server.url("/v1/"))
            .rate_limit_window(Duration::from_millis(20))
            .max_attempts(3)
            .build();
        let client = HttpClient::new(TOKEN, config)?;

        let mock = server.mock(|when, then| {
            when.method(GET).path("/v1/users/1/profile");
            then.status(StatusCode::TOO_MANY_REQUESTS);
        });

        let err = client.get_user_profile(1).await.unwrap_err();

        assert_eq!(err.kind(), Kind::RateLimit);
        let exhausted = err.downcast_ref::<RateLimitExhausted>().unwrap();
        assert_eq!(exhausted.attempts, 3);
        assert_eq!(exhausted.path, "/v1/users/1/profile");
        mock.assert_hits(3);
        assert_eq!(client.gate(), Gate::Open);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rate_limited_call_should_hold_back_other_calls() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let client = Arc::new(http_client(&server)?);

        let mut limited = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/users/1/profile");
                then.status(StatusCode::TOO_MANY_REQUESTS);
            })
            .await;
        let other = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/users/2/profile");
                then.status(StatusCode::OK).json_body(json!({"id": "2"}));
            })
            .await;

        let first = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.get_user_profile(1).await })
        };

        wait_for_hits(&limited, 1).await;
        eventually(|| !client.gate().is_open()).await;
        let Gate::Closed { reopen_at } = client.gate() else {
            panic!("gate should be closed while the first call waits");
        };

        let second = {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                let body = client.get_user_profile(2).await;
                (body, tokio::time::Instant::now())
            })
        };

        tokio::time::sleep(WINDOW / 4).await;
        other.assert_hits_async(0).await;

        limited.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/users/1/profile");
                then.status(StatusCode::OK).json_body(json!({"id": "1"}));
            })
            .await;

        first.await??;
        let (second_body, second_done) = second.await?;
        second_body?;

        assert!(
            second_done >= reopen_at,
            "second call finished before the gate reopened"
        );
        other.assert_hits_async(1).await;

        Ok(())
    }

    #[tokio::test]
    async fn reset_deadline_should_hold_within_window() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = HttpClient::new(TOKEN, config(&server, Duration::from_secs(60)))?;

        server.mock(|when, then| {
            when.method(GET).path("/v1/users/1/profile");
            then.status(StatusCode::OK).json_body(json!({}));
        });

        assert_eq!(client.reset_deadline(), None);

        client.get_user_profile(1).await?;
        let first = client.reset_deadline().unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        client.get_user_profile(1).await?;

        assert_eq!(client.reset_deadline(), Some(first));

        Ok(())
    }

    #[tokio::test]
    async fn reset_deadline_should_renew_after_window() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = HttpClient::new(TOKEN, config(&server, Duration::from_millis(50)))?;

        server.mock(|when, then| {
            when.method(GET).path("/v1/users/1/profile");
            then.status(StatusCode::OK).json_body(json!({}));
        });

        client.get_user_profile(1).await?;
        let first = client.reset_deadline().unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;
        client.get_user_profile(1).await?;
        let renewed = client.reset_deadline().unwrap();

        assert!(renewed > first, "deadline renewed once expired");

        Ok(())
    }
}
