use cucumber::{given, then, when};
use signal_relay::model::MessageType;
use signal_relay_tests::RelayWorld;

fn payload_for(kind: &str) -> &'static str {
    match kind {
        "offer" => r#"{"type":"offer","sdp":"v=0\r\no=- 1 2 IN IP4 127.0.0.1\r\n"}"#,
        "answer" => r#"{"type":"answer","sdp":"v=0\r\no=- 3 4 IN IP4 127.0.0.1\r\n"}"#,
        "candidate" => {
            r#"{"candidate":"candidate:1 1 udp 2122260223 192.168.1.5 50000 typ host","sdpMid":"0","sdpMLineIndex":0}"#
        }
        other => panic!("unsupported handshake message {}", other),
    }
}

fn message_type(kind: &str) -> MessageType {
    serde_json::from_value(serde_json::Value::String(kind.to_string()))
        .expect("unknown message type")
}

// ===== Given / When Steps =====

#[given(expr = "{word} sends a(n) {word} to {word} in room {int}")]
#[when(expr = "{word} sends a(n) {word} to {word} in room {int}")]
async fn sends_handshake(world: &mut RelayWorld, from: String, kind: String, to: String, room_id: i64) {
    world
        .relay(&from, &kind, &to, room_id, payload_for(&kind), None)
        .await;
}

#[when(expr = "{word} sends an offer to {word} in room {int} as {string}")]
async fn sends_offer_as(world: &mut RelayWorld, from: String, to: String, room_id: i64, alias: String) {
    world
        .relay(&from, "offer", &to, room_id, payload_for("offer"), Some(&alias))
        .await;
}

#[when(expr = "{word} sends an offer to {word} in room {int} with sdp {string}")]
async fn sends_offer_with_sdp(world: &mut RelayWorld, from: String, to: String, room_id: i64, sdp: String) {
    let payload = serde_json::json!({ "type": "offer", "sdp": sdp }).to_string();
    world.relay(&from, "offer", &to, room_id, &payload, None).await;
}

#[when(expr = "{word} sends the text {string}")]
async fn sends_text(world: &mut RelayWorld, name: String, text: String) {
    let result = world.send_text(&name, &text).await;
    world.last_result = Some(result.map_err(|e| e.to_string()));
}

// ===== Then Steps =====

#[then("the relay accepts the message")]
async fn relay_accepts(world: &mut RelayWorld) {
    assert_eq!(world.last_result, Some(Ok(())));
}

#[then(expr = "the relay rejects the message as room {int} not found")]
async fn relay_rejects_room(world: &mut RelayWorld, room_id: i64) {
    assert_eq!(
        world.last_result,
        Some(Err(format!("Room not found: {}", room_id)))
    );
}

#[then("the relay rejects the message as malformed")]
async fn relay_rejects_malformed(world: &mut RelayWorld) {
    match &world.last_result {
        Some(Err(reason)) => assert!(
            reason.starts_with("Malformed message") || reason.starts_with("Missing field"),
            "unexpected error {}",
            reason
        ),
        other => panic!("expected a malformed message error, got {:?}", other),
    }
}

#[then(expr = "{word} receives nothing")]
async fn receives_nothing(world: &mut RelayWorld, name: String) {
    let messages = world.client(&name).drain();
    assert!(messages.is_empty(), "{} received {:?}", name, messages);
}

#[then(expr = "{word} receives exactly one {word} from {word}")]
async fn receives_one_from(world: &mut RelayWorld, name: String, kind: String, from: String) {
    let sender = world.client_id(&from);
    let receiver = world.client_id(&name);
    let messages = world.client(&name).drain();

    assert_eq!(messages.len(), 1, "{} received {:?}", name, messages);
    let message = &messages[0];
    assert_eq!(message.kind, message_type(&kind));
    assert_eq!(message.sender, Some(sender));
    assert_eq!(message.receiver, Some(receiver));

    let payload = match message.kind {
        MessageType::Offer => message.offer.as_ref(),
        MessageType::Answer => message.answer.as_ref(),
        MessageType::Candidate => message.candidate.as_ref(),
        _ => None,
    };
    if let Some(raw) = payload {
        assert_eq!(Some(raw.get()), world.last_payload.as_deref());
    }
}

#[then(expr = "{word} receives a roster echoing sdp {string}, candidate {string} and data {string}")]
async fn receives_echoing_roster(
    world: &mut RelayWorld,
    name: String,
    sdp: String,
    candidate: String,
    data: String,
) {
    let messages = world.client(&name).drain();
    assert_eq!(messages.len(), 1, "{} received {:?}", name, messages);
    let roster = &messages[0];
    assert_eq!(roster.kind, MessageType::AllUsers);
    assert_eq!(roster.sdp.as_ref().map(|raw| raw.get()), Some(sdp.as_str()));
    assert_eq!(
        roster.candidate.as_ref().map(|raw| raw.get()),
        Some(candidate.as_str())
    );
    assert_eq!(roster.data.as_deref(), Some(data.as_str()));
}

#[then(expr = "{word} sees {word} as {string}")]
async fn sees_sender_alias(world: &mut RelayWorld, name: String, _from: String, alias: String) {
    let messages = world.client(&name).drain();
    assert_eq!(messages.len(), 1, "{} received {:?}", name, messages);
    assert_eq!(messages[0].sender_nick_name.as_deref(), Some(alias.as_str()));
}
