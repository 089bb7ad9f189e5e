mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{body_json, ChatUpstream, TestApp, UPSTREAM_REPLY};
use folio_api::services::FALLBACK_REPLY;

#[tokio::test]
async fn reply_is_relayed_verbatim() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .post_json(
            "/api/chat",
            json!({ "messages": [
                { "role": "user", "content": "Hi" },
                { "role": "user", "content": "What do you build?" }
            ] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "text": UPSTREAM_REPLY }));

    let status = body_json(app.get("/api/chat/status").await).await;
    assert_eq!(status, json!({ "online": true }));

    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_falls_back_and_goes_offline() -> Result<()> {
    let app = TestApp::with_upstream(ChatUpstream::Unreachable).await?;
    assert_eq!(body_json(app.get("/api/chat/status").await).await["online"], true);

    let response = app
        .post_json(
            "/api/chat",
            json!({ "messages": [{ "role": "user", "content": "Hello?" }] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["text"], FALLBACK_REPLY);
    assert_eq!(body["error"], "Failed to generate response");

    let status = body_json(app.get("/api/chat/status").await).await;
    assert_eq!(status, json!({ "online": false }));

    Ok(())
}

#[tokio::test]
async fn missing_messages_is_bad_request() -> Result<()> {
    let app = TestApp::spawn().await?;

    for body in [json!({}), json!({ "messages": [] }), json!({ "messages": "hi" })] {
        let response = app.post_json("/api/chat", body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Messages array is required" })
        );
    }

    Ok(())
}

#[tokio::test]
async fn probe_tracks_upstream_reachability() -> Result<()> {
    let app = TestApp::spawn().await?;
    assert!(app.state.chat.probe().await);

    let offline = TestApp::with_upstream(ChatUpstream::Unreachable).await?;
    assert!(!offline.state.chat.probe().await);
    assert!(!offline.state.chat.is_online());

    Ok(())
}
