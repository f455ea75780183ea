//! Relay Integration Tests
//!
//! Each test spawns a gateway on an ephemeral loopback port and drives it
//! with real WebSocket clients.
//!
//! Run with: cargo test -p integration-tests --test relay_tests

use integration_tests::TestServer;
use relay_core::RoomCode;
use reqwest::StatusCode;
use serde_json::json;

fn room(code: &str) -> RoomCode {
    RoomCode::parse(code).unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/health").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

// ============================================================================
// Connection Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_hello_advertises_heartbeat_interval() {
    let server = TestServer::start_with(|config| config.relay.heartbeat_interval_ms = 30_000)
        .await
        .unwrap();

    let (mut socket, _) = tokio_tungstenite::connect_async(server.gateway_url())
        .await
        .unwrap();
    let frame = futures_util::StreamExt::next(&mut socket).await.unwrap().unwrap();
    let hello: serde_json::Value = serde_json::from_str(frame.to_text().unwrap()).unwrap();

    assert_eq!(hello["op"], 10);
    assert_eq!(hello["d"]["heartbeat_interval"], 30_000);
}

#[tokio::test]
async fn test_heartbeat_acked() {
    let server = TestServer::start().await.unwrap();
    let mut client = server.connect().await.unwrap();

    client.heartbeat(None).await.unwrap();
    let ack = client.next_message().await.unwrap();

    assert_eq!(ack, json!({"op": 11}));
}

#[tokio::test]
async fn test_missed_heartbeat_closes_session() {
    let server = TestServer::start_with(|config| {
        config.relay.heartbeat_interval_ms = 50;
        config.relay.heartbeat_timeout_ms = 200;
    })
    .await
    .unwrap();
    let mut client = server.connect().await.unwrap();

    assert_eq!(client.expect_close().await.unwrap(), Some(4009));
    server
        .wait_until(|state| state.connection_manager().connection_count() == 0)
        .await
        .unwrap();
}

// ============================================================================
// Room Tests
// ============================================================================

#[tokio::test]
async fn test_two_members_chat() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect().await.unwrap();
    let mut bob = server.connect().await.unwrap();

    alice.join("R1", "alice").await.unwrap();
    bob.join("R1", "bob").await.unwrap();

    let d = alice.expect_dispatch("SYSTEM_MESSAGE").await.unwrap();
    assert_eq!(d, json!({"text": "bob joined the room"}));

    alice.chat(json!("hi")).await.unwrap();

    assert_eq!(alice.expect_dispatch("CHAT_MESSAGE").await.unwrap(), json!("hi"));
    assert_eq!(bob.expect_dispatch("CHAT_MESSAGE").await.unwrap(), json!("hi"));
}

#[tokio::test]
async fn test_dispatch_sequence_increases() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect().await.unwrap();

    alice.send_op(2, json!({"roomCode": "R1", "username": "alice"})).await.unwrap();
    alice.chat(json!("one")).await.unwrap();
    alice.chat(json!("two")).await.unwrap();

    let mut sequences = Vec::new();
    for _ in 0..3 {
        let msg = alice.next_message().await.unwrap();
        sequences.push(msg["s"].as_u64().unwrap());
    }

    assert_eq!(sequences, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_room_switch() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.connect().await.unwrap();
    let mut c = server.connect().await.unwrap();

    a.join("R1", "a").await.unwrap();
    c.join("R1", "c").await.unwrap();
    a.expect_dispatch("SYSTEM_MESSAGE").await.unwrap();

    c.join("R2", "c").await.unwrap();
    assert_eq!(server.state.registry().member_count(&room("R1")), 1);

    a.chat(json!("R1 only")).await.unwrap();

    assert_eq!(a.expect_dispatch("CHAT_MESSAGE").await.unwrap(), json!("R1 only"));
    c.expect_silence().await.unwrap();
}

#[tokio::test]
async fn test_media_relayed_verbatim() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.connect().await.unwrap();
    let mut b = server.connect().await.unwrap();
    a.join("R1", "a").await.unwrap();
    b.join("R1", "b").await.unwrap();
    a.expect_dispatch("SYSTEM_MESSAGE").await.unwrap();

    let payload = json!({"mime": "image/png", "data": "aGVsbG8=", "caption": null});
    b.media(payload.clone()).await.unwrap();

    assert_eq!(a.expect_dispatch("MEDIA_MESSAGE").await.unwrap(), payload);
    assert_eq!(b.expect_dispatch("MEDIA_MESSAGE").await.unwrap(), payload);
}

#[tokio::test]
async fn test_chat_before_join_is_dropped() {
    let server = TestServer::start().await.unwrap();
    let mut member = server.connect().await.unwrap();
    let mut early = server.connect().await.unwrap();
    member.join("R1", "member").await.unwrap();

    early.chat(json!("anyone?")).await.unwrap();

    early.expect_silence().await.unwrap();
    member.expect_silence().await.unwrap();

    // The connection is still usable
    early.join("R1", "early").await.unwrap();
}

#[tokio::test]
async fn test_disconnect_leaves_room() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect().await.unwrap();
    let mut bob = server.connect().await.unwrap();
    alice.join("R1", "alice").await.unwrap();
    bob.join("R1", "bob").await.unwrap();
    alice.expect_dispatch("SYSTEM_MESSAGE").await.unwrap();

    bob.close().await.unwrap();
    server
        .wait_until(|state| state.registry().member_count(&room("R1")) == 1)
        .await
        .unwrap();
    server
        .wait_until(|state| state.connection_manager().connection_count() == 1)
        .await
        .unwrap();

    // No departure notice by default
    alice.chat(json!("still here")).await.unwrap();
    assert_eq!(
        alice.expect_dispatch("CHAT_MESSAGE").await.unwrap(),
        json!("still here")
    );
}

#[tokio::test]
async fn test_departure_announced_when_enabled() {
    let server = TestServer::start_with(|config| config.relay.announce_departures = true)
        .await
        .unwrap();
    let mut alice = server.connect().await.unwrap();
    let mut bob = server.connect().await.unwrap();
    alice.join("R1", "alice").await.unwrap();
    bob.join("R1", "bob").await.unwrap();
    alice.expect_dispatch("SYSTEM_MESSAGE").await.unwrap();

    bob.close().await.unwrap();

    let d = alice.expect_dispatch("SYSTEM_MESSAGE").await.unwrap();
    assert_eq!(d, json!({"text": "bob left the room"}));
}

#[tokio::test]
async fn test_echo_to_sender_disabled() {
    let server = TestServer::start_with(|config| config.relay.echo_to_sender = false)
        .await
        .unwrap();
    let mut a = server.connect().await.unwrap();
    let mut b = server.connect().await.unwrap();
    a.join("R1", "a").await.unwrap();
    b.join("R1", "b").await.unwrap();
    a.expect_dispatch("SYSTEM_MESSAGE").await.unwrap();

    a.chat(json!("hi")).await.unwrap();

    assert_eq!(b.expect_dispatch("CHAT_MESSAGE").await.unwrap(), json!("hi"));
    a.expect_silence().await.unwrap();
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn test_malformed_join_reports_error_to_sender_only() {
    let server = TestServer::start().await.unwrap();
    let mut bystander = server.connect().await.unwrap();
    let mut client = server.connect().await.unwrap();
    bystander.join("R1", "bystander").await.unwrap();

    client.send_op(2, json!({"roomCode": "R1"})).await.unwrap();

    let d = client.expect_dispatch("ERROR").await.unwrap();
    assert_eq!(d["code"], "INVALID_PAYLOAD");
    bystander.expect_silence().await.unwrap();

    // Connection stays open
    client.heartbeat(None).await.unwrap();
    assert_eq!(client.next_message().await.unwrap()["op"], 11);
}

#[tokio::test]
async fn test_blank_username_rejected() {
    let server = TestServer::start().await.unwrap();
    let mut client = server.connect().await.unwrap();

    client
        .send_op(2, json!({"roomCode": "R1", "username": "   "}))
        .await
        .unwrap();

    let d = client.expect_dispatch("ERROR").await.unwrap();
    assert_eq!(d["code"], "INVALID_USERNAME");
    assert_eq!(server.state.registry().member_count(&room("R1")), 0);
}

#[tokio::test]
async fn test_unparseable_message_reports_error() {
    let server = TestServer::start().await.unwrap();
    let mut client = server.connect().await.unwrap();

    client.send_text("{not json").await.unwrap();

    let d = client.expect_dispatch("ERROR").await.unwrap();
    assert_eq!(d["code"], "INVALID_PAYLOAD");

    client.join("R1", "still-alive").await.unwrap();
}

#[tokio::test]
async fn test_server_only_op_closes_socket() {
    let server = TestServer::start().await.unwrap();
    let mut client = server.connect().await.unwrap();

    client.send_op(10, json!({"heartbeat_interval": 1})).await.unwrap();

    assert_eq!(client.expect_close().await.unwrap(), Some(4001));
}

#[tokio::test]
async fn test_binary_frame_closes_socket() {
    let server = TestServer::start().await.unwrap();
    let mut client = server.connect().await.unwrap();
    client.join("R1", "bin").await.unwrap();

    client.send_binary(vec![0, 1, 2]).await.unwrap();

    assert_eq!(client.expect_close().await.unwrap(), Some(4002));
    server
        .wait_until(|state| state.registry().member_count(&room("R1")) == 0)
        .await
        .unwrap();
}
