use std::sync::Arc;

use parking_lot::Mutex;
use scriptshim::adapter::{FetchEvent, FetchRejection, FetchResult};
use scriptshim::types::RawBody;
use scriptshim::{ContextOptions, ScriptRequest, TransportError};
use serde_json::json;

use crate::support::{FakeTransport, Harness};

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Response(FetchResult),
    Error(String),
}

fn record(
    slot: &Arc<Mutex<Vec<Seen>>>,
) -> impl FnOnce(FetchEvent<'_>) -> anyhow::Result<()> + Send + 'static {
    let slot = slot.clone();
    move |event: FetchEvent<'_>| {
        let seen = match event {
            FetchEvent::Response(result) => Seen::Response(result.clone()),
            FetchEvent::Error(text) => Seen::Error(text.to_string()),
        };
        slot.lock().push(seen);
        Ok(())
    }
}

#[tokio::test]
async fn transport_failure_reaches_callback_and_rejects_promise() {
    let harness = Harness::new(FakeTransport::failing(TransportError::Timeout {
        timeout_ms: 2500,
    }));
    let ctx = harness.builder.build(ContextOptions::quanx()).unwrap();

    let calls = Arc::new(Mutex::new(Vec::new()));
    let rejection = ctx
        .task()
        .unwrap()
        .fetch_with(ScriptRequest::new("https://x"), record(&calls))
        .await
        .unwrap_err();

    let error_text = "request timed out after 2500ms".to_string();
    assert_eq!(*calls.lock(), vec![Seen::Error(error_text.clone())]);
    assert_eq!(rejection, FetchRejection { error: error_text.clone() });
    assert_eq!(
        serde_json::to_value(&rejection).unwrap(),
        json!({"error": error_text})
    );
    assert!(harness.console.errors().contains(&error_text));
}

#[test]
fn fetch_outside_runtime_rejects_immediately() {
    let harness = Harness::answering(200, RawBody::Text("ok".into()));
    let ctx = harness.builder.build(ContextOptions::quanx()).unwrap();

    let calls = Arc::new(Mutex::new(Vec::new()));
    let promise = ctx
        .task()
        .unwrap()
        .fetch_with(ScriptRequest::new("https://x"), record(&calls));

    let error_text = TransportError::NoRuntime.to_string();
    assert_eq!(*calls.lock(), vec![Seen::Error(error_text.clone())]);
    assert_eq!(
        futures::executor::block_on(promise).unwrap_err(),
        FetchRejection { error: error_text.clone() }
    );
    assert!(harness.console.errors().contains(&error_text));
    assert!(harness.transport.requests().is_empty());
}

#[tokio::test]
async fn success_is_observed_once_by_both_paths() {
    let harness = Harness::answering(200, RawBody::Structured(json!({"ok": true})));
    let ctx = harness.builder.build(ContextOptions::quanx()).unwrap();

    let calls = Arc::new(Mutex::new(Vec::new()));
    let result = ctx
        .task()
        .unwrap()
        .fetch_with(ScriptRequest::new("https://x"), record(&calls))
        .await
        .unwrap();

    assert_eq!(result.status_code, 200);
    assert_eq!(result.body, r#"{"ok":true}"#);
    assert_eq!(
        result.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(*calls.lock(), vec![Seen::Response(result)]);
}

#[tokio::test]
async fn fetch_without_callback_resolves() {
    let harness = Harness::answering(204, RawBody::Text(String::new()));
    let ctx = harness.builder.build(ContextOptions::quanx()).unwrap();

    let result = ctx
        .task()
        .unwrap()
        .fetch(ScriptRequest::new("https://x"))
        .await
        .unwrap();
    assert_eq!(result.status_code, 204);
    assert_eq!(result.body, "");
}

#[tokio::test]
async fn method_defaults_to_get_and_passes_through() {
    let harness = Harness::answering(200, RawBody::Text("ok".into()));
    let ctx = harness.builder.build(ContextOptions::quanx()).unwrap();
    let task = ctx.task().unwrap();

    task.fetch(ScriptRequest::new("https://x")).await.unwrap();
    task.fetch(ScriptRequest::new("https://x").with_method("put"))
        .await
        .unwrap();

    let methods: Vec<String> = harness
        .transport
        .requests()
        .into_iter()
        .map(|r| r.method)
        .collect();
    assert_eq!(methods, vec!["GET".to_string(), "PUT".to_string()]);
}

#[tokio::test]
async fn failing_callback_still_resolves_promise() {
    let harness = Harness::answering(200, RawBody::Text("ok".into()));
    let ctx = harness.builder.build(ContextOptions::quanx()).unwrap();

    let result = ctx
        .task()
        .unwrap()
        .fetch_with(ScriptRequest::new("https://x"), |_| anyhow::bail!("bad script"))
        .await
        .unwrap();

    assert_eq!(result.body, "ok");
    assert!(harness.console.errors()[0].contains("bad script"));
}

#[test]
fn prefs_pass_through_to_store() {
    let harness = Harness::answering(200, RawBody::Text(String::new()));
    let ctx = harness.builder.build(ContextOptions::quanx()).unwrap();
    let prefs = ctx.prefs().unwrap();

    assert_eq!(prefs.value_for_key("token"), None);
    assert!(prefs.set_value_for_key("t-123", "token"));
    assert_eq!(prefs.value_for_key("token").as_deref(), Some("t-123"));
    assert_eq!(ctx.store().get("token").as_deref(), Some("t-123"));
}

#[test]
fn notify_and_done() {
    let harness = Harness::answering(200, RawBody::Text(String::new()));
    let ctx = harness.builder.build(ContextOptions::quanx()).unwrap();

    assert!(ctx.notify(&["Title", "Subtitle", "Body"]));
    assert_eq!(
        harness.console.notifications(),
        vec!["Title Subtitle Body".to_string()]
    );
    assert_eq!(ctx.done(Some(json!("done"))), Some(json!({"body": "done"})));
}
