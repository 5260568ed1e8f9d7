//! Full inbound flows through the assembled bridge.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use relay::{session, Bridge, Config, InboundCall, QuickOperation, Session};

struct BotSession;

#[async_trait]
impl Session for BotSession {
    async fn invoke(&self, action: &str, call: &InboundCall) -> Option<Value> {
        match action {
            "send_msg" => Some(session::ok(json!({
                "message_id": 12345,
                "user_id": call.param("user_id").as_i64(),
            }))),
            _ => None,
        }
    }

    async fn apply(&self, _op: QuickOperation) -> anyhow::Result<()> {
        Ok(())
    }
}

fn body_json(body: &str) -> Value {
    serde_json::from_str(body).expect("body should be json")
}

#[tokio::test]
async fn test_send_msg_async_scenario() {
    let config = Config::new(10001).with_access_token("tok");
    let bridge = Bridge::new(config, Arc::new(BotSession));
    bridge.readiness().mark_ready();

    let call = InboundCall::post(
        "/send_msg_async",
        "application/json",
        r#"{"user_id": 10002, "message": "hello"}"#,
    )
    .with_header("Authorization", "Bearer tok")
    .with_request_id("req-abc-123");

    let response = bridge.gateway().handle(&call).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(
        response.headers.content_type,
        "application/json; charset=utf-8"
    );

    let body = body_json(&response.body);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["message_id"], 12345);
    assert_eq!(body["data"]["user_id"], 10002);
    assert_eq!(body["request_id"], "req-abc-123");
}

#[tokio::test]
async fn test_call_before_login_then_after() {
    let config = Config::new(10001).with_access_token("tok");
    let bridge = Bridge::new(config, Arc::new(BotSession));
    let gateway = bridge.gateway();

    let call = InboundCall::get("/send_msg")
        .with_header("Authorization", "Bearer tok")
        .with_request_id("req-1");

    let response = gateway.handle(&call).await;
    assert_eq!(response.status_code, 200);
    let body = body_json(&response.body);
    assert_eq!(body["data"]["SCFStatus"], "Starting");
    assert_eq!(body["request_id"], "req-1");

    bridge.readiness().mark_ready();

    let response = gateway.handle(&call).await;
    let body = body_json(&response.body);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unauthorized_and_timer_flows() {
    let config = Config::new(10001).with_access_token("tok");
    let bridge = Bridge::new(config, Arc::new(BotSession));
    bridge.readiness().mark_ready();
    let gateway = bridge.gateway();

    let response = gateway
        .handle(&InboundCall::get("/send_msg").with_header("Authorization", "Bearer wrong"))
        .await;
    assert_eq!(response.status_code, 401);
    assert_eq!(response.body, "Unauthorized");

    // Keep-alive trigger from the host scheduler: no credentials needed.
    let response = gateway
        .handle(&InboundCall::get("").with_trigger(relay::gateway::TIMER_TRIGGER))
        .await;
    assert_eq!(response.status_code, 200);
    assert_eq!(body_json(&response.body)["data"], "timer");
}
