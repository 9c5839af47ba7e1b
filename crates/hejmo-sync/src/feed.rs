// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The live listing feed: an observable sequence of normalized snapshots.

use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use hejmo_core::{HejmoError, Listing, QueryHandle};

use crate::query::normalize_snapshot;

/// A continuously-updating listing result set.
///
/// Every emission on the snapshot channel is the complete current result
/// set, never a delta: consumers replace their working set. Subscription
/// errors arrive on a separate channel and do not terminate the snapshot
/// sequence; recovery is by resubscribing.
///
/// Dropping the feed tears the remote listener down deterministically: the
/// contained guard cancels the forwarding task, which releases the store's
/// listener handle. A stale listener never delivers into a dropped feed.
pub struct ListingFeed {
    snapshots: mpsc::Receiver<Vec<Listing>>,
    errors: mpsc::Receiver<HejmoError>,
    _guard: DropGuard,
}

impl ListingFeed {
    /// Wrap a raw query handle in a normalizing forwarding task.
    pub(crate) fn spawn(handle: QueryHandle) -> Self {
        let (snap_tx, snap_rx) = mpsc::channel(32);
        let (err_tx, err_rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let guard = token.clone().drop_guard();

        tokio::spawn(forward(handle, snap_tx, err_tx, token));

        ListingFeed {
            snapshots: snap_rx,
            errors: err_rx,
            _guard: guard,
        }
    }

    /// The next full result set, or `None` once the subscription is gone.
    pub async fn next_snapshot(&mut self) -> Option<Vec<Listing>> {
        self.snapshots.recv().await
    }

    /// The next subscription error, if the caller wants to await one.
    pub async fn next_error(&mut self) -> Option<HejmoError> {
        self.errors.recv().await
    }

    /// A pending subscription error, without waiting.
    pub fn try_next_error(&mut self) -> Option<HejmoError> {
        self.errors.try_recv().ok()
    }
}

/// Pump raw snapshots and errors from the store handle into the consumer's
/// channels until either side goes away.
async fn forward(
    mut handle: QueryHandle,
    snap_tx: mpsc::Sender<Vec<Listing>>,
    err_tx: mpsc::Sender<HejmoError>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            maybe = handle.snapshots.recv() => match maybe {
                Some(docs) => {
                    let listings = normalize_snapshot(&docs);
                    if snap_tx.send(listings).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            maybe = handle.errors.recv() => match maybe {
                Some(err) => {
                    if err_tx.send(err).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }
    debug!("listing feed torn down");
    // `handle` drops here; its guard releases the remote listener.
}
