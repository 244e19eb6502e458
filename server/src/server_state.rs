use std::collections::HashMap;

use system::{BoardError, CanvasState, JoinResult};

use crate::session::{Session, SessionSlot};

/// Registry and canvas owned exclusively by the coordinator task; every
/// read-modify-write happens on its mailbox, so no locking is needed.
pub struct ServerState {
    pub canvas: CanvasState,
    sessions: HashMap<String, SessionSlot>,
    accepting: bool,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            canvas: CanvasState::new(),
            sessions: HashMap::new(),
            accepting: true,
        }
    }

    /// First join phase: checks-and-reserves the name in one step. Name
    /// comparison is case-sensitive exact match.
    pub fn reserve(&mut self, name: &str) -> JoinResult {
        if !self.accepting {
            return JoinResult::Rejected;
        }
        if self.sessions.contains_key(name) {
            return JoinResult::DuplicateName;
        }
        self.sessions
            .insert(name.to_owned(), SessionSlot::Reserved { stale: false });
        JoinResult::Accepted
    }

    /// Second join phase: turns a reservation into a live session. The
    /// loser of a confirm race against an already-live name gets
    /// `DuplicateName`; a confirm without a prior reservation gets
    /// `NotJoined`.
    pub fn confirm(&mut self, name: &str) -> Result<(), BoardError> {
        match self.sessions.get_mut(name) {
            Some(SessionSlot::Live(_)) => Err(BoardError::DuplicateName),
            Some(slot) => {
                *slot = SessionSlot::Live(Session::new(name.to_owned()));
                Ok(())
            }
            None => Err(BoardError::NotJoined),
        }
    }

    pub fn is_live(&self, name: &str) -> bool {
        matches!(self.sessions.get(name), Some(SessionSlot::Live(_)))
    }

    pub fn mark_dead(&mut self, name: &str) {
        if let Some(SessionSlot::Live(session)) = self.sessions.get_mut(name) {
            session.last_seen_alive = false;
        }
    }

    /// Removes whatever slot holds `name`, freeing the name immediately.
    /// Returns whether a live session was dropped.
    pub fn remove(&mut self, name: &str) -> bool {
        matches!(self.sessions.remove(name), Some(SessionSlot::Live(_)))
    }

    /// Live session names in a stable order.
    pub fn participant_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .sessions
            .iter()
            .filter_map(|(name, slot)| match slot {
                SessionSlot::Live(_) => Some(name.clone()),
                SessionSlot::Reserved { .. } => None,
            })
            .collect();
        names.sort();
        names
    }

    /// One liveness cycle over the registry bookkeeping: reservations that
    /// survived a full cycle unconfirmed are dropped, and sessions flagged
    /// dead by a failed push since the last cycle are handed back for
    /// eviction.
    pub fn sweep_registry(&mut self) -> Vec<String> {
        let mut flagged = Vec::new();
        self.sessions.retain(|name, slot| match slot {
            SessionSlot::Reserved { stale: true } => {
                log::info!("dropping unconfirmed reservation for {:?}", name);
                false
            }
            SessionSlot::Reserved { stale } => {
                *stale = true;
                true
            }
            SessionSlot::Live(session) => {
                if !session.last_seen_alive {
                    flagged.push(name.clone());
                }
                true
            }
        });
        flagged
    }

    pub fn accepting(&self) -> bool {
        self.accepting
    }

    /// Stops accepting joins and forgets every session.
    pub fn close(&mut self) {
        self.accepting = false;
        self.sessions.clear();
    }
}
