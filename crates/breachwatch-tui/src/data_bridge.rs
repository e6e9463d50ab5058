//! Data bridge: forwards search-session snapshots and periodic metrics
//! into the TUI action channel.
//!
//! Two background tasks: one mirrors every published
//! [`SearchSnapshot`](breachwatch_core::SearchSnapshot), the other loads
//! dashboard statistics on a fixed interval or on demand. Both stop on
//! cancellation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use breachwatch_core::{SearchBackend, SearchSession, load_metrics};

use crate::action::Action;

/// Dashboard statistics refresh interval.
pub const METRICS_REFRESH: Duration = Duration::from_secs(30);

/// Spawn both bridge tasks. `refresh_rx` forces an immediate metrics load.
pub fn spawn_data_bridge<B: SearchBackend>(
    session: SearchSession<B>,
    action_tx: mpsc::UnboundedSender<Action>,
    refresh_rx: mpsc::UnboundedReceiver<()>,
    cancel: CancellationToken,
) {
    tokio::spawn(forward_snapshots(
        session.clone(),
        action_tx.clone(),
        cancel.clone(),
    ));
    tokio::spawn(poll_metrics(session, action_tx, refresh_rx, cancel));
}

/// Mirror every session snapshot as [`Action::SnapshotUpdated`].
pub async fn forward_snapshots<B: SearchBackend>(
    session: SearchSession<B>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut snapshots = session.subscribe();
    let initial = snapshots.borrow_and_update().clone();
    if action_tx.send(Action::SnapshotUpdated(Arc::new(initial))).is_err() {
        return;
    }

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                debug!(seq = snap.request_seq, status = %snap.status, "dispatching SnapshotUpdated");
                if action_tx.send(Action::SnapshotUpdated(Arc::new(snap))).is_err() {
                    break;
                }
            }
        }
    }
    debug!("snapshot bridge stopped");
}

/// Load metrics now, then every [`METRICS_REFRESH`] and on each refresh
/// request, sending [`Action::MetricsUpdated`].
pub async fn poll_metrics<B: SearchBackend>(
    session: SearchSession<B>,
    action_tx: mpsc::UnboundedSender<Action>,
    mut refresh_rx: mpsc::UnboundedReceiver<()>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(METRICS_REFRESH);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            _ = interval.tick() => {}

            Some(()) = refresh_rx.recv() => {
                interval.reset();
            }
        }

        let report = tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            report = load_metrics(session.backend(), session.fallback_records()) => report,
        };
        debug!(source = %report.source, total = report.metrics.total, "dispatching MetricsUpdated");
        if action_tx.send(Action::MetricsUpdated(Arc::new(report))).is_err() {
            break;
        }
    }
    debug!("metrics bridge stopped");
}
