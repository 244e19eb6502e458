use tokio::sync::{mpsc, oneshot};

use system::{BoardError, BoardEvent, JoinResult, Shape};

use crate::admin::AdminCommand;
use crate::server::{ServerCommand, ServerTx};

const EVENT_BUFFER: usize = 32;

/// Per-participant capability returned by [`join`]. Every further call a
/// participant makes against the shared board goes through this handle,
/// tagged with the owning session's name.
pub struct ParticipantHandle {
    name: String,
    srv_tx: ServerTx,
}

/// The inbound push surface of a session: events the coordinator fans out,
/// in the order it applied the corresponding mutations.
pub struct BoardEvents {
    rx: mpsc::Receiver<BoardEvent>,
}

/// A successful join: the capability handle, the push surface, and the
/// state needed to render the board as of the join.
pub struct JoinedBoard {
    pub handle: ParticipantHandle,
    pub events: BoardEvents,
    pub shapes: Vec<Shape>,
    pub participants: Vec<String>,
}

/// Two-phase join: reserve the name, then confirm to obtain the
/// capability. The reservation makes simultaneous joins of one name admit
/// at most one participant.
pub async fn join(srv_tx: &ServerTx, name: &str) -> Result<JoinedBoard, BoardError> {
    let mut srv_tx = srv_tx.clone();

    let (reply_tx, reply_rx) = oneshot::channel();
    srv_tx
        .send(ServerCommand::RequestJoin {
            name: name.to_owned(),
            reply: reply_tx,
        })
        .await
        .map_err(|_| BoardError::Unavailable)?;
    match reply_rx.await.map_err(|_| BoardError::Unavailable)? {
        JoinResult::Accepted => {}
        JoinResult::Rejected => return Err(BoardError::Rejected),
        JoinResult::DuplicateName => return Err(BoardError::DuplicateName),
    }

    let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
    let (reply_tx, reply_rx) = oneshot::channel();
    srv_tx
        .send(ServerCommand::ConfirmJoin {
            name: name.to_owned(),
            tx: event_tx,
            reply: reply_tx,
        })
        .await
        .map_err(|_| BoardError::Unavailable)?;
    let snapshot = reply_rx.await.map_err(|_| BoardError::Unavailable)??;

    Ok(JoinedBoard {
        handle: ParticipantHandle {
            name: name.to_owned(),
            srv_tx,
        },
        events: BoardEvents { rx: event_rx },
        shapes: snapshot.shapes,
        participants: snapshot.participants,
    })
}

impl ParticipantHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn append_shape(&mut self, shape: Shape) -> Result<(), BoardError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.srv_tx
            .send(ServerCommand::AppendShape {
                from: self.name.clone(),
                shape,
                reply: reply_tx,
            })
            .await
            .map_err(|_| BoardError::Unavailable)?;
        reply_rx.await.map_err(|_| BoardError::Unavailable)?
    }

    pub async fn clear_canvas(&mut self) -> Result<(), BoardError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.srv_tx
            .send(ServerCommand::ClearCanvas {
                from: self.name.clone(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| BoardError::Unavailable)?;
        reply_rx.await.map_err(|_| BoardError::Unavailable)?
    }

    /// The current canvas, for an explicit resync.
    pub async fn snapshot(&mut self) -> Result<Vec<Shape>, BoardError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.srv_tx
            .send(ServerCommand::GetSnapshot { reply: reply_tx })
            .await
            .map_err(|_| BoardError::Unavailable)?;
        reply_rx.await.map_err(|_| BoardError::Unavailable)
    }

    pub async fn participant_names(&mut self) -> Result<Vec<String>, BoardError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.srv_tx
            .send(ServerCommand::GetParticipants { reply: reply_tx })
            .await
            .map_err(|_| BoardError::Unavailable)?;
        reply_rx.await.map_err(|_| BoardError::Unavailable)
    }

    /// Evicts another participant. Returns whether anyone was removed.
    pub async fn remove_participant(
        &mut self,
        name: &str,
        reason: &str,
    ) -> Result<bool, BoardError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.srv_tx
            .send(ServerCommand::Admin(AdminCommand::RemoveParticipant {
                name: name.to_owned(),
                reason: reason.to_owned(),
                reply: reply_tx,
            }))
            .await
            .map_err(|_| BoardError::Unavailable)?;
        reply_rx.await.map_err(|_| BoardError::Unavailable)
    }

    /// Voluntary disconnect. Consumes the capability; best-effort.
    pub async fn leave(mut self) {
        let _ = self
            .srv_tx
            .send(ServerCommand::Leave {
                from: self.name.clone(),
            })
            .await;
    }
}

impl BoardEvents {
    /// Next pushed event, or `None` once the session is over. Liveness
    /// probes are consumed here; accepting them off the buffer is what
    /// answers the probe.
    pub async fn recv(&mut self) -> Option<BoardEvent> {
        while let Some(event) = self.rx.recv().await {
            if let BoardEvent::Ping = event {
                continue;
            }
            return Some(event);
        }
        None
    }
}
