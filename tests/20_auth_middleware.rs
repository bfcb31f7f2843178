mod common;

use anyhow::Result;
use reqwest::StatusCode;

/// Protected routes reject requests without a bearer token before touching
/// the database, so these hold with or without a reachable Postgres.

#[tokio::test]
async fn protected_routes_require_auth() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in [
        "/api/auth/me",
        "/api/properties",
        "/api/members",
        "/api/payments",
        "/api/dashboard/summary",
    ] {
        let res = client
            .get(format!("{}{}", server.base_url, path))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path: {}", path);

        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["success"], false, "path: {}", path);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED", "path: {}", path);
    }
    Ok(())
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/properties", server.base_url))
        .header("authorization", "Bearer not.a.jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/me", server.base_url))
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
