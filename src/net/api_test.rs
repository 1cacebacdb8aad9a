use super::*;
use crate::net::test_helpers::{BASE_URL, MockTransport, harness, header};
use reqwest::header::CONTENT_TYPE;
use serde_json::json;

// =============================================================
// Request interception
// =============================================================

#[tokio::test]
async fn attaches_bearer_when_token_set() {
    let h = harness(Some("abc"), MockTransport::new().respond(200, json!({ "success": true })));
    h.api.send(Method::GET, "/me", HeaderMap::new(), None).await.unwrap();

    let req = h.transport.last_request().unwrap();
    assert_eq!(header(&req, "authorization").as_deref(), Some("Bearer abc"));
    assert_eq!(req.url, format!("{BASE_URL}/me"));
}

#[tokio::test]
async fn no_authorization_header_without_token() {
    let h = harness(None, MockTransport::new().respond(200, json!({ "success": true })));
    h.api.send(Method::GET, "/health", HeaderMap::new(), None).await.unwrap();

    let req = h.transport.last_request().unwrap();
    assert!(!req.headers.contains_key(AUTHORIZATION));
}

#[tokio::test]
async fn bearer_merges_with_caller_headers() {
    let h = harness(Some("abc"), MockTransport::new().respond(200, json!({})));
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("x-trace", HeaderValue::from_static("t-1"));
    h.api.send(Method::POST, "/snippets", headers, Some(json!({}))).await.unwrap();

    let req = h.transport.last_request().unwrap();
    assert_eq!(header(&req, "authorization").as_deref(), Some("Bearer abc"));
    assert_eq!(header(&req, "x-trace").as_deref(), Some("t-1"));
    assert_eq!(header(&req, "content-type").as_deref(), Some("application/json"));
}

#[tokio::test]
async fn token_read_at_call_time() {
    let h = harness(
        None,
        MockTransport::new()
            .respond(200, json!({}))
            .respond(200, json!({})),
    );
    h.api.send(Method::GET, "/a", HeaderMap::new(), None).await.unwrap();
    h.session.set_token("late".to_owned()).await;
    h.api.send(Method::GET, "/b", HeaderMap::new(), None).await.unwrap();

    let reqs = h.transport.requests();
    assert!(!reqs[0].headers.contains_key(AUTHORIZATION));
    assert_eq!(header(&reqs[1], "authorization").as_deref(), Some("Bearer late"));
}

#[test]
fn bearer_header_is_sensitive() {
    let value = bearer_header("abc").unwrap();
    assert!(value.is_sensitive());
}

#[tokio::test]
async fn token_with_control_chars_is_rejected_before_sending() {
    let h = harness(Some("bad\u{7f}token"), MockTransport::new());
    let err = h.api.send(Method::GET, "/me", HeaderMap::new(), None).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidHeader(_)));
    assert_eq!(h.transport.request_count(), 0);
}

// =============================================================
// Response interception: 401
// =============================================================

#[tokio::test]
async fn unauthorized_clears_session_notifies_and_navigates() {
    let h = harness(
        Some("expired"),
        MockTransport::new().respond(401, json!({ "success": false, "error": "invalid token" })),
    );
    let err = h.api.get_json::<serde_json::Value>("/snippets").await.unwrap_err();

    assert!(matches!(&err, ClientError::Unauthorized { server_error: Some(e) } if e == "invalid token"));
    assert_eq!(h.session.token().await, None);
    assert_eq!(h.notifier.errors(), vec![SESSION_EXPIRED_MESSAGE.to_owned()]);
    assert_eq!(h.navigator.visits(), vec!["/auth/login".to_owned()]);
}

#[tokio::test]
async fn unauthorized_without_token_still_clears_and_navigates() {
    let h = harness(None, MockTransport::new().respond_raw(401, ""));
    let err = h.api.send(Method::GET, "/me", HeaderMap::new(), None).await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized { server_error: None }));
    assert_eq!(h.session.token().await, None);
    assert_eq!(h.navigator.last().as_deref(), Some("/auth/login"));
}

#[tokio::test]
async fn unauthorized_navigates_to_configured_login_path() {
    let h = harness(Some("t"), MockTransport::new().respond(401, json!({})));
    let api = h.api.with_login_path("/signin");
    api.send(Method::GET, "/me", HeaderMap::new(), None).await.unwrap_err();
    assert_eq!(h.navigator.last().as_deref(), Some("/signin"));
}

#[tokio::test]
async fn unauthorized_with_noop_notifier_does_not_fail() {
    let h = harness(Some("t"), MockTransport::new().respond(401, json!({})));
    let api = h.api.with_notifier(Arc::new(crate::ui::NoopNotifier));
    let err = api.send(Method::GET, "/me", HeaderMap::new(), None).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized { .. }));
    assert_eq!(h.session.token().await, None);
}

// =============================================================
// Response interception: other statuses
// =============================================================

#[tokio::test]
async fn other_error_statuses_leave_token_untouched() {
    for status in [400_u16, 403, 404, 500] {
        let h = harness(
            Some("keep"),
            MockTransport::new().respond(status, json!({ "success": false, "error": "nope" })),
        );
        let err = h.api.send(Method::GET, "/x", HeaderMap::new(), None).await.unwrap_err();

        assert!(
            matches!(&err, ClientError::Http { status: s, server_error: Some(e), .. } if *s == status && e == "nope"),
            "status {status}: {err:?}"
        );
        assert_eq!(h.session.token().await.as_deref(), Some("keep"), "status {status}");
        assert!(h.navigator.visits().is_empty(), "status {status}");
        assert!(h.notifier.errors().is_empty(), "status {status}");
    }
}

#[tokio::test]
async fn non_json_error_body_is_kept_raw() {
    let h = harness(None, MockTransport::new().respond_raw(502, "<html>bad gateway</html>"));
    let err = h.api.send(Method::GET, "/x", HeaderMap::new(), None).await.unwrap_err();
    match err {
        ClientError::Http { status, server_error, body } => {
            assert_eq!(status, 502);
            assert_eq!(server_error, None);
            assert_eq!(body, "<html>bad gateway</html>");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_failure_propagates_without_retry() {
    let h = harness(Some("keep"), MockTransport::new().fail("connection refused"));
    let err = h.api.send(Method::GET, "/x", HeaderMap::new(), None).await.unwrap_err();

    assert!(matches!(&err, ClientError::Transport(m) if m == "connection refused"));
    assert_eq!(h.transport.request_count(), 1);
    assert_eq!(h.session.token().await.as_deref(), Some("keep"));
}

#[tokio::test]
async fn success_body_passes_through() {
    let h = harness(None, MockTransport::new().respond(201, json!({ "success": true, "data": 7 })));
    let body: serde_json::Value = h.api.post_json("/snippets", &json!({ "content": "x" })).await.unwrap();
    assert_eq!(body["data"], 7);

    let req = h.transport.last_request().unwrap();
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.body, Some(json!({ "content": "x" })));
}

#[tokio::test]
async fn undecodable_success_body_is_decode_error() {
    let h = harness(None, MockTransport::new().respond_raw(200, "not json"));
    let err = h.api.get_json::<serde_json::Value>("/x").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

// =============================================================
// URL building
// =============================================================

#[test]
fn url_joins_with_single_slash() {
    let h = harness(None, MockTransport::new());
    assert_eq!(h.api.url("/me"), "http://api.test/me");
    assert_eq!(h.api.url("me"), "http://api.test/me");
}

#[test]
fn base_url_trailing_slash_trimmed() {
    let h = harness(None, MockTransport::new());
    let api = ApiClient::with_transport("http://api.test/", h.session.clone(), h.transport.clone());
    assert_eq!(api.base_url(), "http://api.test");
    assert_eq!(api.login_path(), "/auth/login");
}
