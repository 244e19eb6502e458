use std::collections::HashMap;

use system::BoardEvent;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

pub type SessionTx = Sender<BoardEvent>;

/// Push handles of live sessions, keyed by participant name. Delivery is
/// bounded and never blocks the coordinator: an event either lands in the
/// session's buffer immediately or the push fails.
pub struct SessionTxStorage {
    session_txs: HashMap<String, SessionTx>,
}

impl SessionTxStorage {
    pub fn new() -> Self {
        Self {
            session_txs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: String, tx: SessionTx) {
        self.session_txs.insert(name, tx);
    }

    /// Returns whether the event was accepted by the session's buffer.
    pub fn send(&mut self, to: &str, event: BoardEvent) -> bool {
        match self.session_txs.get_mut(to) {
            Some(tx) => match tx.try_send(event) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    log::warn!("push to {:?} failed: event buffer full", to);
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    log::warn!("push to {:?} failed: handle closed", to);
                    false
                }
            },
            None => {
                log::warn!("push to {:?} failed: no handle registered", to);
                false
            }
        }
    }

    /// Liveness probe: a ping that must be accepted immediately.
    pub fn probe(&mut self, name: &str) -> bool {
        self.send(name, BoardEvent::Ping)
    }

    pub fn remove(&mut self, name: &str) -> Option<SessionTx> {
        self.session_txs.remove(name)
    }

    pub fn clear(&mut self) {
        self.session_txs.clear();
    }
}
