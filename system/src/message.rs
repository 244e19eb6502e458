use serde::{Deserialize, Serialize};

use crate::shape::Shape;

pub type CommandId = u16;

/// Outcome of the first join phase. Returned as a value so the caller can
/// branch on it without error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinResult {
    Accepted,
    Rejected,
    DuplicateName,
}

/// Application-level failure of a board call. `Unavailable` means the call
/// was lost in transit; the caller must not assume any mutation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardError {
    DuplicateName,
    Rejected,
    NotJoined,
    Unavailable,
}

impl std::fmt::Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardError::DuplicateName => write!(f, "name is already taken"),
            BoardError::Rejected => write!(f, "join rejected by the board"),
            BoardError::NotJoined => write!(f, "not joined to the board"),
            BoardError::Unavailable => write!(f, "board is unavailable"),
        }
    }
}

/// Everything a joining participant needs to render the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub shapes: Vec<Shape>,
    pub participants: Vec<String>,
}

/// Events pushed to a session's handle. Delivery order equals the order
/// the coordinator applied the corresponding mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoardEvent {
    ShapeAdded(Shape),
    Cleared,
    /// Carries the full membership list so receivers never have to pull.
    ParticipantsChanged(Vec<String>),
    Kicked { reason: String },
    /// Liveness probe; carries no state.
    Ping,
}

/// One request frame on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentifiableCommand {
    pub command_id: CommandId,
    pub command: BoardCommand,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum BoardCommand {
    Join { name: String },
    AppendShape(Shape),
    ClearCanvas,
    GetSnapshot,
    GetParticipants,
    RemoveParticipant { name: String, reason: String },
    Leave,
}

/// One response/push frame on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub enum IdentifiableEvent {
    ByMyself {
        command_id: CommandId,
        result: CommandResult,
    },
    BySystem {
        event: BoardEvent,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub enum CommandResult {
    Ok(BoardReply),
    Error(BoardError),
}

impl From<Result<BoardReply, BoardError>> for CommandResult {
    fn from(result: Result<BoardReply, BoardError>) -> Self {
        match result {
            Ok(reply) => CommandResult::Ok(reply),
            Err(err) => CommandResult::Error(err),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum BoardReply {
    Joined(BoardSnapshot),
    ShapeAppended,
    CanvasCleared,
    Snapshot(Vec<Shape>),
    Participants(Vec<String>),
    ParticipantRemoved { removed: bool },
    Left,
}
