use std::time::Duration;

use tokio::time::timeout;

use server::admin::AdminCommand;
use server::participant::{self, BoardEvents};
use server::server::{spawn_server, ServerCommand, ServerTx};
use system::euclid::default::{Point2D, Rect, Size2D};
use system::{BoardError, BoardEvent, BoardView, ClientReplica, Color, Shape, ShapeStyle};

fn black_rectangle() -> Shape {
    Shape::Rectangle {
        bounds: Rect::new(Point2D::new(10.0, 10.0), Size2D::new(50.0, 30.0)),
        style: ShapeStyle {
            color: Color::default(),
            filled: false,
        },
    }
}

fn line(x: f32) -> Shape {
    Shape::Line {
        from: Point2D::new(x, 0.0),
        to: Point2D::new(x, 100.0),
        style: ShapeStyle {
            color: Color { r: 255, g: 0, b: 0 },
            filled: false,
        },
    }
}

async fn next_event(events: &mut BoardEvents) -> BoardEvent {
    timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event stream ended unexpectedly")
}

async fn sweep(srv_tx: &ServerTx) {
    srv_tx
        .clone()
        .send(ServerCommand::SweepSessions)
        .await
        .expect("coordinator gone");
}

fn participants(names: &[&str]) -> BoardEvent {
    BoardEvent::ParticipantsChanged(names.iter().map(|n| (*n).to_owned()).collect())
}

#[tokio::test]
async fn mutations_reach_every_other_participant_in_order() {
    let srv_tx = spawn_server();

    let mut alice = participant::join(&srv_tx, "alice").await.expect("join");
    assert!(alice.shapes.is_empty());
    assert_eq!(alice.participants, vec!["alice"]);

    // the name is taken while alice is live
    match participant::join(&srv_tx, "alice").await {
        Err(BoardError::DuplicateName) => {}
        Err(err) => panic!("expected DuplicateName, got {:?}", err),
        Ok(_) => panic!("expected DuplicateName, got a successful join"),
    }

    let mut bob = participant::join(&srv_tx, "bob").await.expect("join");
    assert_eq!(bob.participants, vec!["alice", "bob"]);
    assert_eq!(
        next_event(&mut alice.events).await,
        participants(&["alice", "bob"])
    );

    alice
        .handle
        .append_shape(black_rectangle())
        .await
        .expect("append");
    assert_eq!(
        next_event(&mut bob.events).await,
        BoardEvent::ShapeAdded(black_rectangle())
    );

    // alice's next event is bob's shape, not an echo of her own
    bob.handle.append_shape(line(1.0)).await.expect("append");
    assert_eq!(
        next_event(&mut alice.events).await,
        BoardEvent::ShapeAdded(line(1.0))
    );

    let snapshot = alice.handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot, vec![black_rectangle(), line(1.0)]);
}

#[tokio::test]
async fn a_passive_replica_converges_to_the_server_snapshot() {
    let srv_tx = spawn_server();

    let mut alice = participant::join(&srv_tx, "alice").await.expect("join");
    let mut bob = participant::join(&srv_tx, "bob").await.expect("join");
    let mut carol = participant::join(&srv_tx, "carol").await.expect("join");

    let mut replica = ClientReplica::from_join(carol.shapes.clone(), carol.participants.clone());
    assert_eq!(replica.participants(), &["alice", "bob", "carol"]);

    alice.handle.append_shape(line(1.0)).await.expect("append");
    bob.handle.append_shape(line(2.0)).await.expect("append");
    alice.handle.clear_canvas().await.expect("clear");
    bob.handle.append_shape(line(3.0)).await.expect("append");

    // carol originated nothing, so she observes the full mutation stream
    for _ in 0..4 {
        let event = next_event(&mut carol.events).await;
        replica.apply(&event);
    }

    let snapshot = carol.handle.snapshot().await.expect("snapshot");
    assert_eq!(replica.shapes(), snapshot.as_slice());
    assert_eq!(replica.shapes(), &[line(3.0)]);
}

#[tokio::test]
async fn concurrent_joins_with_one_name_admit_exactly_one() {
    let srv_tx = spawn_server();

    let first = {
        let srv_tx = srv_tx.clone();
        tokio::spawn(async move { participant::join(&srv_tx, "mallory").await.map(|_| ()) })
    };
    let second = {
        let srv_tx = srv_tx.clone();
        tokio::spawn(async move { participant::join(&srv_tx, "mallory").await.map(|_| ()) })
    };

    let outcomes = vec![
        first.await.expect("task panicked"),
        second.await.expect("task panicked"),
    ];
    let admitted = outcomes.iter().filter(|o| o.is_ok()).count();
    assert_eq!(admitted, 1);
    assert!(outcomes.contains(&Err(BoardError::DuplicateName)));
}

#[tokio::test]
async fn a_name_frees_up_when_its_session_ends() {
    let srv_tx = spawn_server();

    let alice = participant::join(&srv_tx, "alice").await.expect("join");
    assert!(matches!(
        participant::join(&srv_tx, "alice").await,
        Err(BoardError::DuplicateName)
    ));

    alice.handle.leave().await;
    participant::join(&srv_tx, "alice").await.expect("rejoin");
}

#[tokio::test]
async fn clear_resets_every_view_including_the_caller() {
    let srv_tx = spawn_server();

    let mut alice = participant::join(&srv_tx, "alice").await.expect("join");
    let mut bob = participant::join(&srv_tx, "bob").await.expect("join");
    assert_eq!(
        next_event(&mut alice.events).await,
        participants(&["alice", "bob"])
    );

    alice.handle.append_shape(line(1.0)).await.expect("append");
    assert_eq!(
        next_event(&mut bob.events).await,
        BoardEvent::ShapeAdded(line(1.0))
    );

    alice.handle.clear_canvas().await.expect("clear");
    alice.handle.clear_canvas().await.expect("clear");

    // clearing twice is observable twice, for the caller as well
    assert_eq!(next_event(&mut alice.events).await, BoardEvent::Cleared);
    assert_eq!(next_event(&mut alice.events).await, BoardEvent::Cleared);
    assert_eq!(next_event(&mut bob.events).await, BoardEvent::Cleared);
    assert_eq!(next_event(&mut bob.events).await, BoardEvent::Cleared);

    let snapshot = alice.handle.snapshot().await.expect("snapshot");
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn unreachable_sessions_are_reaped_and_announced() {
    let srv_tx = spawn_server();

    let mut alice = participant::join(&srv_tx, "alice").await.expect("join");
    let bob = participant::join(&srv_tx, "bob").await.expect("join");
    assert_eq!(
        next_event(&mut alice.events).await,
        participants(&["alice", "bob"])
    );

    // bob's process vanishes without a goodbye
    drop(bob.events);

    // the push failure flags bob; the next cycle evicts him
    alice.handle.append_shape(line(1.0)).await.expect("append");
    sweep(&srv_tx).await;

    assert_eq!(
        next_event(&mut alice.events).await,
        participants(&["alice"])
    );
    let names = alice.handle.participant_names().await.expect("names");
    assert_eq!(names, vec!["alice"]);

    // the name is free again right away
    participant::join(&srv_tx, "bob").await.expect("rejoin");
}

#[tokio::test]
async fn a_probe_failure_alone_evicts_within_one_cycle() {
    let srv_tx = spawn_server();

    let mut alice = participant::join(&srv_tx, "alice").await.expect("join");
    let bob = participant::join(&srv_tx, "bob").await.expect("join");
    assert_eq!(
        next_event(&mut alice.events).await,
        participants(&["alice", "bob"])
    );

    drop(bob.events);
    sweep(&srv_tx).await;

    assert_eq!(
        next_event(&mut alice.events).await,
        participants(&["alice"])
    );
}

#[tokio::test]
async fn a_kicked_participant_is_notified_and_dropped() {
    let srv_tx = spawn_server();

    let mut alice = participant::join(&srv_tx, "alice").await.expect("join");
    let mut bob = participant::join(&srv_tx, "bob").await.expect("join");
    assert_eq!(
        next_event(&mut alice.events).await,
        participants(&["alice", "bob"])
    );

    let removed = alice
        .handle
        .remove_participant("bob", "disruptive drawing")
        .await
        .expect("kick");
    assert!(removed);

    assert_eq!(
        next_event(&mut bob.events).await,
        BoardEvent::Kicked {
            reason: "disruptive drawing".to_owned()
        }
    );
    assert_eq!(
        next_event(&mut alice.events).await,
        participants(&["alice"])
    );

    // kicking an unknown name removes nobody
    let removed = alice
        .handle
        .remove_participant("bob", "again")
        .await
        .expect("kick");
    assert!(!removed);

    participant::join(&srv_tx, "bob").await.expect("rejoin");
}

#[tokio::test]
async fn shutdown_kicks_everyone_and_rejects_new_joins() {
    let srv_tx = spawn_server();

    let mut alice = participant::join(&srv_tx, "alice").await.expect("join");

    let (tx, rx) = tokio::sync::oneshot::channel();
    srv_tx
        .clone()
        .send(ServerCommand::Admin(AdminCommand::Shutdown { reply: tx }))
        .await
        .expect("coordinator gone");
    rx.await.expect("shutdown reply");

    assert_eq!(
        next_event(&mut alice.events).await,
        BoardEvent::Kicked {
            reason: "server is shutting down".to_owned()
        }
    );

    assert!(matches!(
        participant::join(&srv_tx, "carol").await,
        Err(BoardError::Rejected)
    ));

    // alice's session is gone with the board
    assert_eq!(
        alice.handle.append_shape(line(1.0)).await,
        Err(BoardError::NotJoined)
    );
}
