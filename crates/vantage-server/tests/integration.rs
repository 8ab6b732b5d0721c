//! End-to-end tests using a real WebSocket client.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use vantage_capture::{DesktopProvider, ProviderError};
use vantage_core::identity::{Identity, Role};
use vantage_core::input::{InputCommand, Modifiers, MonitorInfo, MouseButton, Region, ScreenSize};
use vantage_hub::Target;
use vantage_rpc::handlers::register_all;
use vantage_rpc::registry::MethodRegistry;
use vantage_server::{ServerConfig, StaticResolver, VantageServer};

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

// ── Provider double ─────────────────────────────────────────────────

/// Desktop capability stub: screen queries always succeed; captures and
/// input can be flipped to fail.
struct StubProvider {
    fail: AtomicBool,
}

impl StubProvider {
    fn new(failing: bool) -> Self {
        Self {
            fail: AtomicBool::new(failing),
        }
    }

    fn outcome(&self) -> Result<(), ProviderError> {
        if self.fail.load(Ordering::Relaxed) {
            Err(ProviderError::failed("stub failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DesktopProvider for StubProvider {
    async fn screen_size(&self) -> Result<ScreenSize, ProviderError> {
        Ok(ScreenSize {
            width: 1920,
            height: 1080,
        })
    }

    async fn monitors(&self) -> Result<Vec<MonitorInfo>, ProviderError> {
        Ok(vec![MonitorInfo {
            index: 0,
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
            is_primary: true,
        }])
    }

    async fn capture_full(&self, _quality: u8) -> Result<Vec<u8>, ProviderError> {
        self.outcome().map(|()| b"frame".to_vec())
    }

    async fn capture_region(&self, _region: Region, _quality: u8) -> Result<Vec<u8>, ProviderError> {
        self.outcome().map(|()| b"frame".to_vec())
    }

    async fn capture_monitor(&self, _index: u32, _quality: u8) -> Result<Vec<u8>, ProviderError> {
        self.outcome().map(|()| b"frame".to_vec())
    }

    async fn mouse_click(
        &self,
        _x: i32,
        _y: i32,
        _button: MouseButton,
        _double_click: bool,
    ) -> Result<(), ProviderError> {
        self.outcome()
    }

    async fn mouse_move(&self, _x: i32, _y: i32) -> Result<(), ProviderError> {
        self.outcome()
    }

    async fn mouse_drag(
        &self,
        _from_x: i32,
        _from_y: i32,
        _to_x: i32,
        _to_y: i32,
        _button: MouseButton,
    ) -> Result<(), ProviderError> {
        self.outcome()
    }

    async fn mouse_wheel(&self, _x: i32, _y: i32, _delta: i32) -> Result<(), ProviderError> {
        self.outcome()
    }

    async fn key_press(&self, _key_code: u16, _is_down: bool) -> Result<(), ProviderError> {
        self.outcome()
    }

    async fn type_text(&self, _text: &str) -> Result<(), ProviderError> {
        self.outcome()
    }

    async fn key_combination(
        &self,
        _modifiers: Modifiers,
        _key_code: u16,
    ) -> Result<(), ProviderError> {
        self.outcome()
    }

    async fn dispatch_input(&self, _command: &InputCommand) -> Result<(), ProviderError> {
        self.outcome()
    }
}

// ── Harness ─────────────────────────────────────────────────────────

/// Boot a test server and return the WS URL + the server for state access.
async fn boot_server(failing_provider: bool) -> (String, VantageServer) {
    let provider = Arc::new(StubProvider::new(failing_provider));
    let resolver = Arc::new(
        StaticResolver::new()
            .with_token("alice", Identity::new(7, Role::User))
            .with_token("bob", Identity::new(3, Role::User))
            .with_token("root", Identity::new(1, Role::Admin)),
    );
    let mut registry = MethodRegistry::new();
    register_all(&mut registry);

    let server = VantageServer::new(
        ServerConfig::default(), // port 0 = auto-assign
        registry,
        provider,
        resolver,
        None,
    );
    let (addr, _handle) = server.listen().await.unwrap();
    (format!("ws://{addr}/ws"), server)
}

async fn connect(url: &str, token: Option<&str>) -> WsStream {
    let full = match token {
        Some(token) => format!("{url}?token={token}"),
        None => url.to_owned(),
    };
    let (ws, _) = connect_async(full).await.unwrap();
    ws
}

/// Next JSON text frame, skipping control frames.
async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("websocket error");
        match msg {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            Message::Ping(_) | Message::Pong(_) => {}
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

async fn send_rpc(ws: &mut WsStream, id: &str, method: &str, params: Value) {
    let msg = json!({"id": id, "method": method, "params": params});
    ws.send(Message::text(msg.to_string())).await.unwrap();
}

async fn send_one_way(ws: &mut WsStream, method: &str, params: Value) {
    let msg = json!({"method": method, "params": params});
    ws.send(Message::text(msg.to_string())).await.unwrap();
}

/// Read frames until the response with `id` arrives; returns the events
/// seen on the way plus the response.
async fn collect_until_response(ws: &mut WsStream, id: &str) -> (Vec<Value>, Value) {
    let mut events = Vec::new();
    loop {
        let frame = next_json(ws).await;
        if frame.get("id").and_then(Value::as_str) == Some(id) {
            return (events, frame);
        }
        events.push(frame);
    }
}

/// Connect and consume the connect-time `screen.info` event.
async fn connect_ready(url: &str, token: Option<&str>) -> WsStream {
    let mut ws = connect(url, token).await;
    let info = next_json(&mut ws).await;
    assert_eq!(info["type"], "screen.info");
    ws
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn connect_receives_screen_info() {
    let (url, _server) = boot_server(false).await;
    let mut ws = connect(&url, Some("alice")).await;

    let info = next_json(&mut ws).await;
    assert_eq!(info["type"], "screen.info");
    assert_eq!(info["screenSize"]["width"], 1920);
    assert_eq!(info["monitors"].as_array().unwrap().len(), 1);
    assert_eq!(info["monitors"][0]["isPrimary"], true);
}

#[tokio::test]
async fn ping_round_trip() {
    let (url, _server) = boot_server(false).await;
    let mut ws = connect_ready(&url, None).await;

    send_rpc(&mut ws, "r1", "system.ping", json!({})).await;
    let (events, resp) = collect_until_response(&mut ws, "r1").await;
    assert!(events.is_empty());
    assert_eq!(resp["success"], true);
    assert_eq!(resp["result"]["pong"], true);
}

#[tokio::test]
async fn capture_screen_pushes_image_event() {
    let (url, _server) = boot_server(false).await;
    let mut ws = connect_ready(&url, Some("alice")).await;

    send_rpc(&mut ws, "r1", "capture.screen", json!({"quality": 85})).await;
    let (events, resp) = collect_until_response(&mut ws, "r1").await;

    assert_eq!(resp["success"], true);
    assert_eq!(resp["result"]["delivered"], true);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "screen.capture");
    assert_eq!(events[0]["image"], BASE64.encode(b"frame"));
}

#[tokio::test]
async fn capture_failure_emits_error_and_connection_survives() {
    let (url, _server) = boot_server(true).await;
    let mut ws = connect_ready(&url, Some("alice")).await;

    send_rpc(&mut ws, "r1", "capture.screen", json!({"quality": 85})).await;
    let (events, resp) = collect_until_response(&mut ws, "r1").await;
    assert_eq!(resp["result"]["delivered"], false);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "error");
    assert_eq!(events[0]["reason"], "Failed to capture screen");

    // The connection is still usable afterwards.
    send_rpc(&mut ws, "r2", "system.ping", json!({})).await;
    let (events, resp) = collect_until_response(&mut ws, "r2").await;
    assert!(events.is_empty());
    assert_eq!(resp["result"]["pong"], true);
}

#[tokio::test]
async fn mouse_click_acks_and_mouse_move_stays_silent() {
    let (url, _server) = boot_server(false).await;
    let mut ws = connect_ready(&url, Some("alice")).await;

    send_rpc(
        &mut ws,
        "r1",
        "input.mouseClick",
        json!({"x": 100, "y": 200, "button": "left"}),
    )
    .await;
    let (events, resp) = collect_until_response(&mut ws, "r1").await;
    assert_eq!(resp["result"]["accepted"], true);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "input.ack");
    assert_eq!(events[0]["operation"], "mouseClick");

    // Mouse moves are one-way and unacknowledged; anything they produced
    // would arrive before the next ping's response.
    send_one_way(&mut ws, "input.mouseMove", json!({"x": 5, "y": 6})).await;
    send_rpc(&mut ws, "r2", "system.ping", json!({})).await;
    let (events, resp) = collect_until_response(&mut ws, "r2").await;
    assert!(events.is_empty());
    assert_eq!(resp["result"]["pong"], true);
}

#[tokio::test]
async fn key_combination_round_trip() {
    let (url, _server) = boot_server(false).await;
    let mut ws = connect_ready(&url, Some("alice")).await;

    send_rpc(
        &mut ws,
        "r1",
        "input.keyCombination",
        json!({"modifiers": "ctrl, alt", "keyCode": 65}),
    )
    .await;
    let (events, resp) = collect_until_response(&mut ws, "r1").await;
    assert_eq!(resp["result"]["accepted"], true);
    assert_eq!(events[0]["operation"], "keyCombination");
}

#[tokio::test]
async fn presence_announced_to_other_connections() {
    let (url, _server) = boot_server(false).await;
    let mut alice = connect_ready(&url, Some("alice")).await;

    let bob = connect_ready(&url, Some("bob")).await;
    let online = next_json(&mut alice).await;
    assert_eq!(online["type"], "user.online");
    assert_eq!(online["userId"], 3);

    drop(bob);
    let offline = next_json(&mut alice).await;
    assert_eq!(offline["type"], "user.offline");
    assert_eq!(offline["userId"], 3);
}

#[tokio::test]
async fn directed_notification_reaches_exactly_the_target_user() {
    let (url, _server) = boot_server(false).await;
    let mut alice = connect_ready(&url, Some("alice")).await; // user 7
    let mut bob = connect_ready(&url, Some("bob")).await; // user 3
    let online = next_json(&mut alice).await; // bob coming online
    assert_eq!(online["type"], "user.online");
    let mut carol = connect_ready(&url, None).await; // anonymous

    send_rpc(
        &mut bob,
        "r1",
        "notify.sendToUser",
        json!({"targetUserId": 7, "type": "info", "title": "Hi", "message": "hello"}),
    )
    .await;
    let (_, resp) = collect_until_response(&mut bob, "r1").await;
    assert_eq!(resp["result"]["sent"], true);

    let event = next_json(&mut alice).await;
    assert_eq!(event["type"], "notification.receive");
    assert_eq!(event["kind"], "info");
    assert_eq!(event["title"], "Hi");
    assert_eq!(event["message"], "hello");
    assert_eq!(event["fromUserId"], 3);

    // Carol saw nothing: her next frame is her own ping response.
    send_rpc(&mut carol, "r2", "system.ping", json!({})).await;
    let (events, _) = collect_until_response(&mut carol, "r2").await;
    assert!(events.is_empty());
}

#[tokio::test]
async fn sms_notification_truncates_long_body() {
    let (url, _server) = boot_server(false).await;
    let mut alice = connect_ready(&url, Some("alice")).await;
    let mut bob = connect_ready(&url, Some("bob")).await;
    let _ = next_json(&mut alice).await; // bob online

    let body = "m".repeat(73);
    send_rpc(
        &mut bob,
        "r1",
        "notify.sms",
        json!({
            "targetUserId": 7,
            "senderName": "Sam",
            "senderPhoneNumber": "+15550101",
            "message": body
        }),
    )
    .await;
    let (_, _) = collect_until_response(&mut bob, "r1").await;

    let event = next_json(&mut alice).await;
    assert_eq!(event["type"], "sms.new");
    assert_eq!(event["message"], format!("{}...", "m".repeat(50)));
    assert_eq!(event["senderName"], "Sam");
}

#[tokio::test]
async fn system_broadcast_is_admin_gated() {
    let (url, _server) = boot_server(false).await;
    let mut root = connect_ready(&url, Some("root")).await; // admin, user 1
    let mut alice = connect_ready(&url, Some("alice")).await;
    let _ = next_json(&mut root).await; // alice online

    // Non-admin broadcast: nobody receives anything.
    send_rpc(
        &mut alice,
        "r1",
        "notify.broadcastSystem",
        json!({"title": "Fake", "message": "nope"}),
    )
    .await;
    let (_, _) = collect_until_response(&mut alice, "r1").await;

    // Admin broadcast: everyone receives it.
    send_rpc(
        &mut root,
        "r2",
        "notify.broadcastSystem",
        json!({"title": "Maintenance", "message": "Back at 9", "type": "warning"}),
    )
    .await;
    let (events, _) = collect_until_response(&mut root, "r2").await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "system.notification");
    assert_eq!(events[0]["title"], "Maintenance");
    assert_eq!(events[0]["kind"], "warning");

    let event = next_json(&mut alice).await;
    assert_eq!(event["type"], "system.notification");
}

#[tokio::test]
async fn list_active_sessions_over_the_wire() {
    let (url, _server) = boot_server(false).await;
    let mut alice = connect_ready(&url, Some("alice")).await;
    let _bob = connect_ready(&url, Some("bob")).await;
    let _ = next_json(&mut alice).await; // bob online

    send_rpc(&mut alice, "r1", "session.listActive", json!({})).await;
    let (_, resp) = collect_until_response(&mut alice, "r1").await;
    let sessions = resp["result"]["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    for session in sessions {
        assert_eq!(session["isActive"], true);
    }
}

#[tokio::test]
async fn joined_group_receives_server_side_publish() {
    let (url, server) = boot_server(false).await;
    let mut alice = connect_ready(&url, Some("alice")).await;
    let mut bob = connect_ready(&url, Some("bob")).await;
    let _ = next_json(&mut alice).await; // bob online

    send_rpc(&mut alice, "r1", "group.join", json!({"name": "ops"})).await;
    let (_, resp) = collect_until_response(&mut alice, "r1").await;
    assert_eq!(resp["result"]["ok"], true);

    let delivered = server.context().broadcaster.publish(
        Target::Group("ops"),
        &vantage_core::ServerEvent::system_notification("Ops", "deploy", "info"),
    );
    assert_eq!(delivered, 1);

    let event = next_json(&mut alice).await;
    assert_eq!(event["type"], "system.notification");
    assert_eq!(event["title"], "Ops");

    // Bob never joined; his next frame is his own ping response.
    send_rpc(&mut bob, "r2", "system.ping", json!({})).await;
    let (events, _) = collect_until_response(&mut bob, "r2").await;
    assert!(events.is_empty());
}

#[tokio::test]
async fn join_user_group_is_rejected_for_other_users() {
    let (url, server) = boot_server(false).await;
    let mut alice = connect_ready(&url, Some("alice")).await; // user 7
    let mut bob = connect_ready(&url, Some("bob")).await; // user 3
    let _ = next_json(&mut alice).await; // bob online

    // Alice's per-user group has exactly her connection.
    assert_eq!(server.context().groups.members("user:7").len(), 1);

    // Bob tries to sneak into user 7's group; silently dropped.
    send_rpc(&mut bob, "r1", "group.joinUser", json!({"userId": 7})).await;
    let (_, resp) = collect_until_response(&mut bob, "r1").await;
    assert_eq!(resp["result"]["ok"], true);
    assert_eq!(server.context().groups.members("user:7").len(), 1);

    // His own user group join is an idempotent no-op.
    send_rpc(&mut bob, "r2", "group.joinUser", json!({"userId": 3})).await;
    let (_, _) = collect_until_response(&mut bob, "r2").await;
    assert_eq!(server.context().groups.members("user:3").len(), 1);
}

#[tokio::test]
async fn disconnect_cleans_up_sessions_and_groups() {
    let (url, server) = boot_server(false).await;
    let mut alice = connect_ready(&url, Some("alice")).await;
    let mut bob = connect_ready(&url, Some("bob")).await;
    let _ = next_json(&mut alice).await; // bob online

    send_rpc(&mut bob, "r1", "group.join", json!({"name": "ops"})).await;
    let (_, _) = collect_until_response(&mut bob, "r1").await;
    assert_eq!(server.context().groups.members("ops").len(), 1);

    bob.close(None).await.unwrap();
    let offline = next_json(&mut alice).await;
    assert_eq!(offline["type"], "user.offline");
    assert_eq!(offline["userId"], 3);

    assert_eq!(server.context().connections.connection_count(), 1);
    assert!(server.context().groups.members("ops").is_empty());
    assert!(server.context().groups.members("user:3").is_empty());
}

#[tokio::test]
async fn invalid_json_gets_an_error_response() {
    let (url, _server) = boot_server(false).await;
    let mut ws = connect_ready(&url, None).await;

    ws.send(Message::text("this is not json")).await.unwrap();
    let frame = next_json(&mut ws).await;
    assert_eq!(frame["id"], "unknown");
    assert_eq!(frame["success"], false);
    assert_eq!(frame["error"]["code"], "INVALID_PARAMS");
}

#[tokio::test]
async fn unknown_method_gets_method_not_found() {
    let (url, _server) = boot_server(false).await;
    let mut ws = connect_ready(&url, None).await;

    send_rpc(&mut ws, "r1", "desk.flip", json!({})).await;
    let (_, resp) = collect_until_response(&mut ws, "r1").await;
    assert_eq!(resp["success"], false);
    assert_eq!(resp["error"]["code"], "METHOD_NOT_FOUND");
}
