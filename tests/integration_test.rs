use futures::{SinkExt, StreamExt};
use maritime_relay::api::create_api_server;
use maritime_relay::{MessageRelay, MessageRelayBuilder, RelayConfig};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Duration};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const VESSEL: &str = "urn:mrn:mcp:vessel:imo:1234567";
const VTS: &str = "urn:mrn:mcp:shore:authority:vts:tokyo-bay";
const RCC: &str = "urn:mrn:mcp:shore:authority:rcc:yokohama";

async fn start_relay(success_rate: f64) -> (SocketAddr, Arc<MessageRelay>) {
    let config = RelayConfig::default()
        .with_delivery_delay(Duration::from_millis(50))
        .with_success_rate(success_rate)
        .with_seed(11);
    let relay = MessageRelayBuilder::new().config(config).build_shared();
    let app = create_api_server(relay.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, relay)
}

async fn connect(addr: SocketAddr, mrn: &str) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws/{mrn}")).await.unwrap();
    client
}

async fn send(client: &mut Client, frame: Value) {
    client.send(Message::Text(frame.to_string())).await.unwrap();
}

async fn recv(client: &mut Client) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .unwrap();

        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn wait_connected(relay: &MessageRelay, count: usize) {
    for _ in 0..100 {
        if relay.presence().len() == count {
            return;
        }
        sleep(Duration::from_millis(5)).await;
    }
    panic!("expected {count} connections, have {}", relay.presence().len());
}

async fn http_get(addr: SocketAddr, path: &str) -> (u16, Value) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    let status = raw[9..12].parse().unwrap();
    let body_start = raw.find("\r\n\r\n").unwrap() + 4;
    let body = raw[body_start..].trim();
    (status, serde_json::from_str(body).unwrap_or(Value::Null))
}

/// Sender and recipient both connected: immediate forward, delivered ack
#[tokio::test]
async fn test_direct_delivery() {
    let (addr, relay) = start_relay(1.0).await;
    let mut vessel = connect(addr, VESSEL).await;
    let mut vts = connect(addr, VTS).await;
    wait_connected(&relay, 2).await;

    send(
        &mut vessel,
        json!({
            "recipient_mrn": VTS,
            "message_type": "position_report",
            "subject": "Noon report",
            "body": "35.45N 139.65E",
            "metadata": {"speed_kn": 12.5}
        }),
    )
    .await;

    let ack = recv(&mut vessel).await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["status"], "delivered");

    let forwarded = recv(&mut vts).await;
    assert_eq!(forwarded["type"], "message");
    assert_eq!(forwarded["sender_mrn"], VESSEL);
    assert_eq!(forwarded["subject"], "Noon report");
    assert_eq!(forwarded["metadata"]["speed_kn"], 12.5);
    assert_eq!(forwarded["message_id"], ack["message_id"]);

    let id = ack["message_id"].as_str().unwrap();
    let (status, body) = http_get(addr, &format!("/api/v1/messages/{id}/status")).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "delivered");
    assert_eq!(body["details"], "delivered via direct channel");
}

/// Distress call to an offline vessel: queued, routed over radio, then delivered
#[tokio::test]
async fn test_distress_to_offline_vessel() {
    let (addr, relay) = start_relay(1.0).await;
    let mut rcc = connect(addr, RCC).await;
    wait_connected(&relay, 1).await;

    send(
        &mut rcc,
        json!({
            "type": "message",
            "recipient_mrn": VESSEL,
            "message_type": "distress",
            "priority": "urgent",
            "body": "MAYDAY relay, position 34.9N 139.8E"
        }),
    )
    .await;

    let ack = recv(&mut rcc).await;
    assert_eq!(ack["status"], "queued");
    let id = ack["message_id"].as_str().unwrap().to_string();

    let (_, body) = http_get(addr, &format!("/api/v1/messages/{id}/status")).await;
    assert_eq!(body["status"], "routing");

    sleep(Duration::from_millis(250)).await;
    let (_, body) = http_get(addr, &format!("/api/v1/messages/{id}/status")).await;
    assert_eq!(body["status"], "delivered");
    assert_eq!(body["details"], "delivered via radio-relay channel (simulated)");

    let (_, stats) = http_get(addr, "/api/v1/channels/stats").await;
    assert_eq!(stats["total_messages"], 1);
    assert_eq!(stats["delivered_messages"], 1);
}

/// Routed messages resolve to failed when the simulated channel never succeeds
#[tokio::test]
async fn test_routed_failure() {
    let (addr, relay) = start_relay(0.0).await;
    let mut vessel = connect(addr, VESSEL).await;
    wait_connected(&relay, 1).await;

    send(
        &mut vessel,
        json!({"recipient_mrn": VTS, "message_type": "text", "body": "ETA 14:00"}),
    )
    .await;
    let ack = recv(&mut vessel).await;
    assert_eq!(ack["status"], "queued");

    sleep(Duration::from_millis(250)).await;
    let id = ack["message_id"].as_str().unwrap();
    let (_, body) = http_get(addr, &format!("/api/v1/messages/{id}/status")).await;
    assert_eq!(body["status"], "failed");
    assert_eq!(body["details"], "recipient unreachable");
}

#[tokio::test]
async fn test_ping_and_bad_frames() {
    let (addr, _relay) = start_relay(1.0).await;
    let mut vessel = connect(addr, VESSEL).await;

    send(&mut vessel, json!({"type": "ping"})).await;
    assert_eq!(recv(&mut vessel).await["type"], "pong");

    send(&mut vessel, json!({"message_type": "text", "body": "no recipient"})).await;
    let err = recv(&mut vessel).await;
    assert_eq!(err["type"], "error");
    assert!(err["message"].as_str().unwrap().contains("recipient_mrn"));

    vessel
        .send(Message::Text("{not json".to_string()))
        .await
        .unwrap();
    assert_eq!(recv(&mut vessel).await["type"], "error");

    // The connection survives rejected frames
    send(&mut vessel, json!({"type": "ping"})).await;
    assert_eq!(recv(&mut vessel).await["type"], "pong");
}

/// Replies come back in the order frames were sent
#[tokio::test]
async fn test_replies_preserve_order() {
    let (addr, _relay) = start_relay(1.0).await;
    let mut vessel = connect(addr, VESSEL).await;

    for i in 0..5 {
        send(
            &mut vessel,
            json!({"recipient_mrn": VTS, "message_type": "text", "body": format!("msg {i}")}),
        )
        .await;
        send(&mut vessel, json!({"type": "ping"})).await;
    }

    for _ in 0..5 {
        assert_eq!(recv(&mut vessel).await["type"], "ack");
        assert_eq!(recv(&mut vessel).await["type"], "pong");
    }

    let (_, list) = http_get(addr, &format!("/api/v1/messages?sender_mrn={VESSEL}&limit=3")).await;
    assert_eq!(list["count"], 3);
    assert_eq!(list["messages"][0]["body"], "msg 4");
}

/// A reconnect takes over forwarding; closing the old socket leaves it registered
#[tokio::test]
async fn test_reconnect_replaces_connection() {
    let (addr, relay) = start_relay(1.0).await;
    let mut old = connect(addr, VTS).await;
    wait_connected(&relay, 1).await;
    let first_id = relay
        .presence()
        .lookup(&VTS.parse().unwrap())
        .unwrap()
        .id();

    let mut new = connect(addr, VTS).await;
    for _ in 0..100 {
        let current = relay.presence().lookup(&VTS.parse().unwrap()).unwrap().id();
        if current != first_id {
            break;
        }
        sleep(Duration::from_millis(5)).await;
    }

    old.close(None).await.unwrap();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(relay.presence().len(), 1);

    let mut vessel = connect(addr, VESSEL).await;
    send(
        &mut vessel,
        json!({"recipient_mrn": VTS, "message_type": "safety", "body": "Gale warning"}),
    )
    .await;
    assert_eq!(recv(&mut vessel).await["status"], "delivered");
    assert_eq!(recv(&mut new).await["body"], "Gale warning");

    let (_, connections) = http_get(addr, "/api/v1/connections").await;
    assert_eq!(connections["count"], 2);
}

#[tokio::test]
async fn test_malformed_identity_is_refused() {
    let (addr, relay) = start_relay(1.0).await;

    assert!(connect_async(format!("ws://{addr}/ws/not-an-mrn")).await.is_err());
    assert!(relay.presence().is_empty());

    let (status, body) = http_get(addr, "/api/v1/routing/urn:mrn:mcp").await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "INVALID_REQUEST");
}
