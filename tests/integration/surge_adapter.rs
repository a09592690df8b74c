use std::sync::Arc;

use parking_lot::Mutex;
use scriptshim::types::RawBody;
use scriptshim::{ContextOptions, Response, ScriptRequest, TransportError};
use serde_json::json;

use crate::support::{FakeTransport, Harness};

type Observed = Arc<Mutex<Option<(Option<TransportError>, Option<Response>, String)>>>;

fn observer() -> Observed {
    Arc::new(Mutex::new(None))
}

#[tokio::test]
async fn get_with_query_and_json_content_type_reaches_callback() {
    let harness = Harness::answering(200, RawBody::Structured(json!({"ok": true})));
    let ctx = harness.builder.build(ContextOptions::surge()).unwrap();
    let client = ctx.http_client().unwrap();

    let seen = observer();
    let sink = seen.clone();
    let req = ScriptRequest::new("https://x/y?a=1&b=2")
        .with_header("Content-Type", "application/json");
    client
        .get(req, move |err, resp, body| {
            *sink.lock() = Some((err.cloned(), resp.cloned(), body.to_string()));
            Ok(())
        })
        .await;

    let (err, resp, body) = seen.lock().take().unwrap();
    assert!(err.is_none());
    assert_eq!(resp.unwrap().status, 200);
    assert_eq!(body, r#"{"ok":true}"#);

    let sent = harness.transport.requests().remove(0);
    assert_eq!(sent.method, "GET");
    assert_eq!(sent.timeout_ms, 2500);
    assert_eq!(sent.body, Some(json!({"a": "1", "b": "2"})));
}

#[tokio::test]
async fn post_strips_content_length_and_keeps_body() {
    let harness = Harness::answering(201, RawBody::Text("created".into()));
    let ctx = harness.builder.build(ContextOptions::surge()).unwrap();

    let req = ScriptRequest::new("https://x/items")
        .with_header("Content-Length", "12")
        .with_body(json!({"name": "box"}));
    ctx.http_client()
        .unwrap()
        .post(req, |_, _, _| Ok(()))
        .await;

    let sent = harness.transport.requests().remove(0);
    assert_eq!(sent.method, "POST");
    assert!(!sent.headers.contains_key("Content-Length"));
    assert_eq!(sent.body, Some(json!({"name": "box"})));
}

#[tokio::test]
async fn transport_failure_is_error_first_with_sentinel() {
    let harness = Harness::new(FakeTransport::failing(TransportError::Connect(
        "refused".into(),
    )));
    let ctx = harness.builder.build(ContextOptions::surge()).unwrap();
    let client = ctx.http_client().unwrap();

    let seen = observer();
    let sink = seen.clone();
    client
        .get(ScriptRequest::new("https://x"), move |err, resp, body| {
            *sink.lock() = Some((err.cloned(), resp.cloned(), body.to_string()));
            Ok(())
        })
        .await;
    let (err, resp, body) = seen.lock().take().unwrap();
    assert_eq!(err, Some(TransportError::Connect("refused".into())));
    assert!(resp.is_none());
    assert_eq!(body, "{error: '$httpClient.get no response'}");

    let sink = seen.clone();
    client
        .post(ScriptRequest::new("https://x"), move |err, resp, body| {
            *sink.lock() = Some((err.cloned(), resp.cloned(), body.to_string()));
            Ok(())
        })
        .await;
    let (_, _, body) = seen.lock().take().unwrap();
    assert_eq!(body, "{ error: connection failed: refused }");
}

#[tokio::test]
async fn failing_callback_is_logged_not_propagated() {
    let harness = Harness::answering(200, RawBody::Text("ok".into()));
    let ctx = harness.builder.build(ContextOptions::surge()).unwrap();
    let client = ctx.http_client().unwrap();

    client
        .get(ScriptRequest::new("https://x"), |_, _, _| {
            anyhow::bail!("script error")
        })
        .await;
    client
        .get(ScriptRequest::new("https://x"), |_, _, _| panic!("script panic"))
        .await;

    let errors = harness.console.errors();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].contains("script error"));
    assert!(errors[1].contains("script panic"));
}

#[test]
fn get_outside_runtime_fails_error_first() {
    let harness = Harness::answering(200, RawBody::Text("ok".into()));
    let ctx = harness.builder.build(ContextOptions::surge()).unwrap();

    let seen = observer();
    let sink = seen.clone();
    let call = ctx
        .http_client()
        .unwrap()
        .get(ScriptRequest::new("https://x"), move |err, resp, body| {
            *sink.lock() = Some((err.cloned(), resp.cloned(), body.to_string()));
            Ok(())
        });
    futures::executor::block_on(call);

    let (err, resp, body) = seen.lock().take().unwrap();
    assert_eq!(err, Some(TransportError::NoRuntime));
    assert!(resp.is_none());
    assert_eq!(body, "{error: '$httpClient.get no response'}");
    assert!(harness.transport.requests().is_empty());
}

#[test]
fn persistent_store_round_trips_through_files() {
    let harness = Harness::answering(200, RawBody::Text(String::new()));
    let ctx = harness.builder.build(ContextOptions::surge()).unwrap();
    let store = ctx.persistent_store().unwrap();

    assert_eq!(store.read("cookie"), None);
    assert!(store.write("session=abc", "cookie"));
    assert_eq!(store.read("cookie").as_deref(), Some("session=abc"));
    assert_eq!(
        std::fs::read_to_string(harness.store_dir.path().join("cookie")).unwrap(),
        "session=abc"
    );
}

#[test]
fn notification_joins_parts() {
    let harness = Harness::answering(200, RawBody::Text(String::new()));
    let ctx = harness.builder.build(ContextOptions::surge()).unwrap();

    ctx.notification()
        .unwrap()
        .post(&["Check-in", "done", "+3 points"]);
    assert!(ctx.notify(&["second"]));

    assert_eq!(
        harness.console.notifications(),
        vec!["Check-in done +3 points".to_string(), "second".to_string()]
    );
}

#[test]
fn done_normalizes_completion() {
    let harness = Harness::answering(200, RawBody::Text(String::new()));
    let ctx = harness.builder.build(ContextOptions::surge()).unwrap();

    assert_eq!(ctx.done(None), Some(json!({})));
    assert_eq!(ctx.done(Some(json!(null))), Some(json!({})));
    assert_eq!(ctx.done(Some(json!(""))), Some(json!({})));
    assert_eq!(ctx.done(Some(json!(42))), Some(json!({"body": 42})));
    assert_eq!(ctx.done(Some(json!({"a": 1}))), Some(json!({"a": 1})));
}
