use cucumber::{given, then, when};
use signal_relay_tests::RelayWorld;

// ===== Given / When Steps =====

#[given("a running relay")]
async fn running_relay(_world: &mut RelayWorld) {
    // No-op: every scenario starts with a fresh world
}

#[given(expr = "{word} joins room {int} as {string}")]
#[when(expr = "{word} joins room {int} as {string}")]
async fn joins_room(world: &mut RelayWorld, name: String, room_id: i64, alias: String) {
    world.join(&name, room_id, &alias).await;
}

#[given(expr = "{word} disconnects")]
#[when(expr = "{word} disconnects")]
async fn disconnects(world: &mut RelayWorld, name: String) {
    let session_id = world.client_id(&name);
    world.router.disconnect(session_id).await;
}

// ===== Then Steps =====

#[then(expr = "{word} receives a roster listing no peers")]
async fn roster_lists_no_peers(world: &mut RelayWorld, name: String) {
    let roster = world.client(&name).roster.clone().expect("no roster received");
    assert_eq!(roster.all_users, Some(vec![]));
    assert_eq!(roster.all_users_nick_names.map(|aliases| aliases.len()), Some(0));
}

#[then(expr = "{word} receives a roster listing {word} as {string}")]
async fn roster_lists_one_peer(world: &mut RelayWorld, name: String, peer: String, alias: String) {
    assert_roster(world, &name, &[(peer, alias)]);
}

#[then(expr = "{word} receives a roster listing {word} as {string} and {word} as {string}")]
async fn roster_lists_two_peers(
    world: &mut RelayWorld,
    name: String,
    first: String,
    first_alias: String,
    second: String,
    second_alias: String,
) {
    assert_roster(world, &name, &[(first, first_alias), (second, second_alias)]);
}

fn assert_roster(world: &mut RelayWorld, name: &str, expected: &[(String, String)]) {
    let expected: Vec<_> = expected
        .iter()
        .map(|(peer, alias)| (world.client_id(peer), alias.clone()))
        .collect();
    let roster = world.client(name).roster.clone().expect("no roster received");

    let ids: Vec<_> = expected.iter().map(|(id, _)| *id).collect();
    assert_eq!(roster.all_users, Some(ids), "roster order for {}", name);

    let aliases = roster.all_users_nick_names.expect("roster without aliases");
    assert_eq!(aliases.len(), expected.len());
    for (id, alias) in &expected {
        assert_eq!(aliases.get(id), Some(alias));
    }
}

#[then(expr = "{word} is no longer registered")]
async fn no_longer_registered(world: &mut RelayWorld, name: String) {
    let session_id = world.client_id(&name);
    let registry = world.router.registry();
    assert_eq!(registry.room_of(session_id).await, None);
    assert_eq!(registry.get_alias(session_id).await, None);
}

#[then(expr = "room {int} has no members")]
async fn room_has_no_members(world: &mut RelayWorld, room_id: i64) {
    assert!(world.router.registry().members_of(room_id).await.is_empty());
}

#[then(expr = "room {int} has {int} members")]
async fn room_has_members(world: &mut RelayWorld, room_id: i64, count: usize) {
    assert_eq!(world.router.registry().members_of(room_id).await.len(), count);
}

#[then("the registry holds no sessions")]
async fn registry_holds_no_sessions(world: &mut RelayWorld) {
    assert_eq!(world.router.registry().session_count().await, 0);
}

#[then("the registry is consistent")]
async fn registry_is_consistent(world: &mut RelayWorld) {
    let ids: Vec<_> = world.clients.values().map(|client| client.id()).collect();
    let registry = world.router.registry();

    for session_id in ids {
        match registry.room_of(session_id).await {
            Some(room_id) => {
                assert!(registry.member_of(room_id, session_id).await.is_some());
                assert!(registry.get_alias(session_id).await.is_some());
            }
            None => {
                assert_eq!(registry.get_alias(session_id).await, None);
            }
        }
    }
}
