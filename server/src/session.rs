/// Server-side record of one joined participant.
#[derive(Debug)]
pub struct Session {
    pub name: String,
    /// Cleared when a push to the session's handle fails; the liveness
    /// monitor evicts the session on its next cycle.
    pub last_seen_alive: bool,
}

impl Session {
    pub fn new(name: String) -> Self {
        Self {
            name,
            last_seen_alive: true,
        }
    }
}

/// Registry slot for a name. A two-phase join holds the name with
/// `Reserved` between `RequestJoin` and `ConfirmJoin`, so a concurrent
/// join of the same name cannot slip in between the two calls.
#[derive(Debug)]
pub enum SessionSlot {
    Reserved { stale: bool },
    Live(Session),
}
