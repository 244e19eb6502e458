use tokio::sync::mpsc::{channel, Sender};
use tokio::sync::oneshot;

use system::{BoardError, BoardEvent, BoardSnapshot, JoinResult, Shape};

use crate::admin::{AdminCommand, BoardStatus};
use crate::server_state::ServerState;
use crate::session_tx_storage::{SessionTx, SessionTxStorage};

pub type ServerTx = Sender<ServerCommand>;

/// The coordinator protocol. Request/response commands carry a oneshot
/// reply sender; the mailbox serializes every registry and canvas
/// mutation, which is what makes check-and-reserve and append-then-
/// broadcast atomic.
#[derive(Debug)]
pub enum ServerCommand {
    RequestJoin {
        name: String,
        reply: oneshot::Sender<JoinResult>,
    },
    ConfirmJoin {
        name: String,
        tx: SessionTx,
        reply: oneshot::Sender<Result<BoardSnapshot, BoardError>>,
    },
    AppendShape {
        from: String,
        shape: Shape,
        reply: oneshot::Sender<Result<(), BoardError>>,
    },
    ClearCanvas {
        from: String,
        reply: oneshot::Sender<Result<(), BoardError>>,
    },
    GetSnapshot {
        reply: oneshot::Sender<Vec<Shape>>,
    },
    GetParticipants {
        reply: oneshot::Sender<Vec<String>>,
    },
    Leave {
        from: String,
    },
    SweepSessions,
    Admin(AdminCommand),
}

struct Server {
    state: ServerState,
    txs: SessionTxStorage,
}

impl Server {
    fn new() -> Self {
        Self {
            state: ServerState::new(),
            txs: SessionTxStorage::new(),
        }
    }

    fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::RequestJoin { name, reply } => {
                let result = self.state.reserve(&name);
                if result == JoinResult::DuplicateName {
                    log::info!("join refused, name {:?} already taken", name);
                }
                let _ = reply.send(result);
            }
            ServerCommand::ConfirmJoin { name, tx, reply } => {
                let result = self.state.confirm(&name).map(|()| {
                    self.txs.insert(name.clone(), tx);
                    log::info!("{:?} joined the board", name);
                    BoardSnapshot {
                        shapes: self.state.canvas.snapshot(),
                        participants: self.state.participant_names(),
                    }
                });
                let joined = result.is_ok();
                let _ = reply.send(result);
                if joined {
                    self.broadcast_participants(Some(&name));
                }
            }
            ServerCommand::AppendShape { from, shape, reply } => {
                if !self.state.is_live(&from) {
                    let _ = reply.send(Err(BoardError::NotJoined));
                } else {
                    self.state.canvas.append(shape.clone());
                    // the mutation is complete here; fan-out must not
                    // delay the caller
                    let _ = reply.send(Ok(()));
                    self.broadcast(BoardEvent::ShapeAdded(shape), Some(&from));
                }
            }
            ServerCommand::ClearCanvas { from, reply } => {
                if !self.state.is_live(&from) {
                    let _ = reply.send(Err(BoardError::NotJoined));
                } else {
                    self.state.canvas.clear();
                    let _ = reply.send(Ok(()));
                    // unlike shape adds, the originator's view resets too
                    self.broadcast(BoardEvent::Cleared, None);
                }
            }
            ServerCommand::GetSnapshot { reply } => {
                let _ = reply.send(self.state.canvas.snapshot());
            }
            ServerCommand::GetParticipants { reply } => {
                let _ = reply.send(self.state.participant_names());
            }
            ServerCommand::Leave { from } => {
                if self.state.remove(&from) {
                    self.txs.remove(&from);
                    log::info!("{:?} left the board", from);
                    self.broadcast_participants(None);
                }
            }
            ServerCommand::SweepSessions => self.sweep(),
            ServerCommand::Admin(command) => self.handle_admin_command(command),
        }
    }

    fn handle_admin_command(&mut self, command: AdminCommand) {
        match command {
            AdminCommand::GetStatus { reply } => {
                let _ = reply.send(BoardStatus {
                    accepting: self.state.accepting(),
                    participants: self.state.participant_names(),
                    shapes: self.state.canvas.snapshot(),
                });
            }
            AdminCommand::RemoveParticipant {
                name,
                reason,
                reply,
            } => {
                let removed = self.remove_participant(&name, &reason);
                let _ = reply.send(removed);
            }
            AdminCommand::Shutdown { reply } => {
                log::info!("shutting the board down");
                for name in self.state.participant_names() {
                    self.txs.send(
                        &name,
                        BoardEvent::Kicked {
                            reason: "server is shutting down".to_owned(),
                        },
                    );
                }
                self.state.close();
                self.txs.clear();
                let _ = reply.send(());
            }
        }
    }

    fn remove_participant(&mut self, name: &str, reason: &str) -> bool {
        if !self.state.is_live(name) {
            return false;
        }
        // best-effort farewell; an unreachable target is removed all the same
        self.txs.send(
            name,
            BoardEvent::Kicked {
                reason: reason.to_owned(),
            },
        );
        self.state.remove(name);
        self.txs.remove(name);
        log::info!("{:?} removed from the board: {}", name, reason);
        self.broadcast_participants(None);
        true
    }

    /// One liveness cycle: evict sessions flagged dead by failed pushes,
    /// then give every remaining session a single probe. No retries
    /// within a cycle.
    fn sweep(&mut self) {
        let mut evicted = self.state.sweep_registry();
        for name in self.state.participant_names() {
            if evicted.contains(&name) {
                continue;
            }
            if !self.txs.probe(&name) {
                evicted.push(name);
            }
        }
        if evicted.is_empty() {
            return;
        }
        for name in &evicted {
            self.state.remove(name);
            self.txs.remove(name);
            log::warn!("{:?} evicted, liveness probe failed", name);
        }
        self.broadcast_participants(None);
    }

    /// Pushes `event` to every live session except `without`, over the
    /// registry as it is right now. A failed push never aborts the rest
    /// of the fan-out; it flags the target for the liveness monitor.
    fn broadcast(&mut self, event: BoardEvent, without: Option<&str>) {
        for name in self.state.participant_names() {
            if without.map_or(false, |w| w == name) {
                continue;
            }
            if !self.txs.send(&name, event.clone()) {
                self.state.mark_dead(&name);
            }
        }
    }

    fn broadcast_participants(&mut self, without: Option<&str>) {
        let event = BoardEvent::ParticipantsChanged(self.state.participant_names());
        self.broadcast(event, without);
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ServerCommand>(16);

    tokio::spawn(async move {
        let mut server = Server::new();

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command);
        }
    });

    srv_tx
}
