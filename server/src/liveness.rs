use std::time::Duration;

use crate::server::{ServerCommand, ServerTx};

/// Default probe cycle. A session gets one chance per cycle, so a blip
/// shorter than this is tolerated and sustained unreachability is fatal.
pub const LIVENESS_INTERVAL: Duration = Duration::from_secs(3);

/// Periodically asks the coordinator to probe every live session and reap
/// the unreachable ones. Eviction itself runs on the coordinator mailbox,
/// so the registry keeps a single writer. Stops once the coordinator is
/// gone.
pub fn spawn_liveness_monitor(mut srv_tx: ServerTx, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if srv_tx.send(ServerCommand::SweepSessions).await.is_err() {
                log::info!("liveness monitor - coordinator gone, stopping");
                break;
            }
        }
    });
}
