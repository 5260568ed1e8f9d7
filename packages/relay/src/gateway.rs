//! The stateless gateway: one inbound call in, one envelope out.
//!
//! The hosting FaaS runtime (or a persistent peer channel) hands each call
//! to [`Gateway::handle`], which gates on session readiness, authenticates
//! the caller, resolves the action against the session's registry, and
//! always returns exactly one well-formed [`GatewayResponse`]. Failures are
//! encoded as envelope content, never raised at the boundary.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::session::{self, Session};

/// Trigger value for scheduled keep-alive calls issued by the hosting
/// environment itself. These carry no credentials and bypass auth.
pub const TIMER_TRIGGER: &str = "Timer";

/// Routing-hint suffix on action paths; stripped before registry lookup.
const ASYNC_SUFFIX: &str = "_async";

/// One external invocation, as handed over by the hosting environment.
///
/// Lives for a single request/response cycle; never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InboundCall {
    /// Request path encoding the action name, e.g. `/send_msg_async`.
    pub path: String,
    pub method: String,
    pub content_type: String,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, Vec<String>>,
    pub body: String,
    /// Correlation id supplied by the calling environment, echoed back in
    /// the response body.
    pub request_id: String,
    /// Trigger type for calls originating from the host's own scheduler.
    pub trigger: Option<String>,
}

impl InboundCall {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: "GET".to_string(),
            ..Self::default()
        }
    }

    pub fn post(
        path: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            method: "POST".to_string(),
            content_type: content_type.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(key.into()).or_default().push(value.into());
        self
    }

    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First value of a query parameter.
    pub fn query_first(&self, key: &str) -> Option<&str> {
        self.query.get(key)?.first().map(String::as_str)
    }
}

/// Fixed-shape response for the hosting environment. Serializes to the
/// exact wire contract the FaaS gateway integration expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayResponse {
    #[serde(rename = "isBase64Encoded")]
    pub is_base64_encoded: bool,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: ResponseHeaders,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseHeaders {
    #[serde(rename = "Content-Type")]
    pub content_type: String,
}

impl GatewayResponse {
    fn with_body(status_code: u16, body: String) -> Self {
        Self {
            is_base64_encoded: false,
            status_code,
            headers: ResponseHeaders {
                content_type: "application/json; charset=utf-8".to_string(),
            },
            body,
        }
    }

    /// 200 envelope carrying the serialized result mapping.
    pub fn ok(result: &Value) -> Self {
        let body = match serde_json::to_string(result) {
            Ok(body) => body,
            Err(err) => {
                error!(error = %err, "failed to serialize gateway response body");
                String::new()
            }
        };
        Self::with_body(200, body)
    }

    /// Non-200 envelope with a plain message body.
    pub fn failed(status_code: u16, message: &str) -> Self {
        Self::with_body(status_code, message.to_string())
    }
}

/// One-way readiness flag: "Starting" until the session reports a
/// successful login, then "Ready" forever.
///
/// Single writer, many readers; an atomic rather than a lock because reads
/// vastly outnumber the single write.
#[derive(Debug, Clone, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the session finished logging in. Never reverts.
    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Stateless per-call adapter from the hosting environment to the session's
/// action registry.
pub struct Gateway {
    session: Arc<dyn Session>,
    readiness: Readiness,
    access_token: Option<String>,
    debug: bool,
}

impl Gateway {
    pub fn new(
        session: Arc<dyn Session>,
        readiness: Readiness,
        access_token: Option<String>,
        debug: bool,
    ) -> Self {
        Self {
            session,
            readiness,
            access_token,
            debug,
        }
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    /// Handle one inbound call. Always returns a well-formed envelope.
    pub async fn handle(&self, call: &InboundCall) -> GatewayResponse {
        // Calls racing session bring-up are answered, not dispatched.
        if !self.readiness.is_ready() {
            debug!("api call received while session is still starting");
            let mut result = session::ok(json!({"SCFStatus": "Starting"}));
            self.attach_request_id(&mut result, call);
            return GatewayResponse::ok(&result);
        }

        // Keep-alive triggers come from the host's own scheduler and carry
        // no credentials.
        if call.trigger.as_deref() == Some(TIMER_TRIGGER) {
            return GatewayResponse::ok(&session::ok(json!("timer")));
        }

        if let Some(token) = &self.access_token {
            if !self.authorized(call, token) {
                info!(path = %call.path, "rejected api call with bad credentials");
                return GatewayResponse::failed(401, "Unauthorized");
            }
        }

        let action = resolve_action(&call.path);
        debug!(action = %action, request_id = %call.request_id, "gateway api call");

        let mut result = match self.session.invoke(action, call).await {
            Some(result) => result,
            None => {
                info!(action = %action, "unknown action");
                session::failed(session::RETCODE_UNKNOWN_ACTION)
            }
        };
        self.attach_request_id(&mut result, call);
        GatewayResponse::ok(&result)
    }

    fn attach_request_id(&self, result: &mut Value, call: &InboundCall) {
        if let Value::Object(map) = result {
            map.insert(
                "request_id".to_string(),
                Value::String(call.request_id.clone()),
            );
            if self.debug {
                if let Ok(raw) = serde_json::to_value(call) {
                    map.insert("echo".to_string(), raw);
                }
            }
        }
    }

    /// Bearer header first; a present-but-malformed header counts as no
    /// credential and fails the check. Falls back to the `access_token`
    /// query parameter only when no header was sent.
    fn authorized(&self, call: &InboundCall, token: &str) -> bool {
        if let Some(header) = call.header("Authorization") {
            // "<scheme> <token>": the credential is everything after the
            // first space.
            return header
                .split_once(' ')
                .map(|(_, credential)| credential == token)
                .unwrap_or(false);
        }
        call.query_first("access_token") == Some(token)
    }
}

/// Trim the leading path separator and a single `_async` routing hint.
fn resolve_action(path: &str) -> &str {
    let action = path.strip_prefix('/').unwrap_or(path);
    action.strip_suffix(ASYNC_SUFFIX).unwrap_or(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::quick::QuickOperation;

    /// Session with a two-action registry: `send_msg` and `get_status`.
    struct StubSession;

    #[async_trait]
    impl Session for StubSession {
        async fn invoke(&self, action: &str, call: &InboundCall) -> Option<Value> {
            match action {
                "send_msg" => Some(session::ok(json!({"message_id": 99}))),
                "get_status" => Some(session::ok(json!({"online": true}))),
                "echo_params" => Some(session::ok(json!({
                    "user_id": call.param("user_id").as_i64(),
                }))),
                _ => None,
            }
        }

        async fn apply(&self, _op: QuickOperation) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn ready_gateway(token: Option<&str>) -> Gateway {
        let readiness = Readiness::new();
        readiness.mark_ready();
        Gateway::new(
            Arc::new(StubSession),
            readiness,
            token.map(str::to_string),
            false,
        )
    }

    fn body_json(response: &GatewayResponse) -> Value {
        serde_json::from_str(&response.body).expect("envelope body should be json")
    }

    #[tokio::test]
    async fn test_starting_gate_short_circuits_before_auth() {
        let gateway = Gateway::new(
            Arc::new(StubSession),
            Readiness::new(),
            Some("tok".to_string()),
            false,
        );

        // Even a garbage credential must not matter while starting.
        let call = InboundCall::get("/send_msg")
            .with_header("Authorization", "Bearer totally-wrong")
            .with_request_id("rid-1");
        let response = gateway.handle(&call).await;

        assert_eq!(response.status_code, 200);
        let body = body_json(&response);
        assert_eq!(body["data"]["SCFStatus"], "Starting");
        assert_eq!(body["request_id"], "rid-1");
    }

    #[tokio::test]
    async fn test_readiness_transition_is_one_way() {
        let readiness = Readiness::new();
        assert!(!readiness.is_ready());
        readiness.mark_ready();
        assert!(readiness.is_ready());
        readiness.mark_ready();
        assert!(readiness.is_ready());
    }

    #[tokio::test]
    async fn test_timer_trigger_bypasses_auth() {
        let gateway = ready_gateway(Some("tok"));
        let call = InboundCall::get("").with_trigger(TIMER_TRIGGER);

        let response = gateway.handle(&call).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(body_json(&response)["data"], "timer");
    }

    #[tokio::test]
    async fn test_bearer_token_matches() {
        let gateway = ready_gateway(Some("tok"));
        let call = InboundCall::get("/send_msg")
            .with_header("Authorization", "Bearer tok")
            .with_request_id("rid-2");

        let response = gateway.handle(&call).await;
        assert_eq!(response.status_code, 200);
        let body = body_json(&response);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["data"]["message_id"], 99);
        assert_eq!(body["request_id"], "rid-2");
    }

    #[tokio::test]
    async fn test_wrong_bearer_token_is_unauthorized() {
        let gateway = ready_gateway(Some("tok"));
        let call = InboundCall::get("/send_msg").with_header("Authorization", "Bearer nope");

        let response = gateway.handle(&call).await;
        assert_eq!(response.status_code, 401);
        assert_eq!(response.body, "Unauthorized");
    }

    #[tokio::test]
    async fn test_missing_credential_is_unauthorized() {
        let gateway = ready_gateway(Some("tok"));
        let response = gateway.handle(&InboundCall::get("/send_msg")).await;
        assert_eq!(response.status_code, 401);
    }

    #[tokio::test]
    async fn test_malformed_auth_header_is_no_credential() {
        let gateway = ready_gateway(Some("tok"));
        // No scheme prefix at all: must not panic, must fail auth.
        let call = InboundCall::get("/send_msg").with_header("Authorization", "tok");
        let response = gateway.handle(&call).await;
        assert_eq!(response.status_code, 401);
    }

    #[tokio::test]
    async fn test_query_token_fallback() {
        let gateway = ready_gateway(Some("tok"));
        let call = InboundCall::get("/send_msg").with_query("access_token", "tok");
        let response = gateway.handle(&call).await;
        assert_eq!(response.status_code, 200);

        let call = InboundCall::get("/send_msg").with_query("access_token", "bad");
        let response = gateway.handle(&call).await;
        assert_eq!(response.status_code, 401);
    }

    #[tokio::test]
    async fn test_open_mode_dispatches_without_credentials() {
        let gateway = ready_gateway(None);
        let response = gateway.handle(&InboundCall::get("/get_status")).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(body_json(&response)["data"]["online"], true);
    }

    #[tokio::test]
    async fn test_async_suffix_and_leading_slash_are_stripped() {
        let gateway = ready_gateway(Some("tok"));
        let call = InboundCall::get("/send_msg_async")
            .with_header("Authorization", "Bearer tok")
            .with_request_id("rid-3");

        let response = gateway.handle(&call).await;
        assert_eq!(response.status_code, 200);
        let body = body_json(&response);
        // Resolved as send_msg: the stub only knows the bare name.
        assert_eq!(body["status"], "ok");
        assert_eq!(body["request_id"], "rid-3");
    }

    #[test]
    fn test_resolve_action_rules() {
        assert_eq!(resolve_action("/send_msg_async"), "send_msg");
        assert_eq!(resolve_action("/send_msg"), "send_msg");
        assert_eq!(resolve_action("send_msg_async"), "send_msg");
        // Only a trailing hint is a hint.
        assert_eq!(resolve_action("/get_async_setting"), "get_async_setting");
    }

    #[tokio::test]
    async fn test_dispatch_reads_call_params() {
        let gateway = ready_gateway(None);
        let call = InboundCall::post("/echo_params", "application/json", r#"{"user_id": 10001}"#);
        let response = gateway.handle(&call).await;
        assert_eq!(body_json(&response)["data"]["user_id"], 10001);
    }

    #[tokio::test]
    async fn test_unknown_action_is_failed_mapping_in_200_envelope() {
        let gateway = ready_gateway(None);
        let call = InboundCall::get("/no_such_action").with_request_id("rid-4");

        let response = gateway.handle(&call).await;
        assert_eq!(response.status_code, 200);
        let body = body_json(&response);
        assert_eq!(body["status"], "failed");
        assert_eq!(body["retcode"], 1404);
        assert_eq!(body["request_id"], "rid-4");
    }

    #[tokio::test]
    async fn test_debug_mode_echoes_raw_call() {
        let readiness = Readiness::new();
        readiness.mark_ready();
        let gateway = Gateway::new(Arc::new(StubSession), readiness, None, true);

        let call = InboundCall::get("/get_status").with_request_id("rid-5");
        let response = gateway.handle(&call).await;
        let body = body_json(&response);
        assert_eq!(body["echo"]["path"], "/get_status");
        assert_eq!(body["request_id"], "rid-5");
    }

    #[tokio::test]
    async fn test_concurrent_calls_do_not_interfere() {
        let gateway = Arc::new(ready_gateway(None));
        let mut handles = Vec::new();
        for i in 0..16 {
            let gateway = gateway.clone();
            handles.push(tokio::spawn(async move {
                let call = InboundCall::get("/get_status").with_request_id(format!("rid-{i}"));
                (i, gateway.handle(&call).await)
            }));
        }
        for handle in handles {
            let (i, response) = handle.await.unwrap();
            let body: Value = serde_json::from_str(&response.body).unwrap();
            assert_eq!(body["request_id"], format!("rid-{i}"));
        }
    }

    #[test]
    fn test_envelope_wire_shape() {
        let response = GatewayResponse::ok(&json!({"status": "ok"}));
        let wire: Value = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["isBase64Encoded"], false);
        assert_eq!(wire["statusCode"], 200);
        assert_eq!(
            wire["headers"]["Content-Type"],
            "application/json; charset=utf-8"
        );
        assert!(wire["body"].is_string());
    }
}
