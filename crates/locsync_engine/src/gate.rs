//! Two-phase boot: restore persisted state, then reconcile.

use crate::error::{SyncError, SyncResult};
use crate::state::{SyncEngine, SyncOutcome};
use crate::store::PersistentStateStore;
use crate::transport::SyncTransport;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// What happened during rehydration.
#[derive(Debug)]
pub struct RehydrationReport {
    /// Whether a stored snapshot was applied.
    pub restored: bool,
    /// Why restoring failed, if it did. Never fatal.
    pub restore_error: Option<SyncError>,
    /// Result of the first reconciliation.
    pub sync: SyncResult<SyncOutcome>,
}

/// Handle for awaiting the end of restoration.
#[derive(Debug, Clone)]
pub struct RestoreSignal {
    rx: watch::Receiver<bool>,
}

impl RestoreSignal {
    /// Returns true once restoration has completed.
    pub fn is_restored(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits until restoration has completed, successfully or not.
    pub async fn wait(&mut self) {
        // The sender lives in the gate; if it is gone restoration can no
        // longer complete and there is nothing to wait for.
        let _ = self.rx.wait_for(|restored| *restored).await;
    }
}

/// Sequences the first reconciliation after persisted state has loaded.
///
/// [`RehydrationGate::rehydrate`] loads the snapshot from the engine's
/// store, applies it once any running reconciliation has finished, raises
/// the restoration signal, enables saving and then runs exactly one
/// [`SyncEngine::fetch_and_sync`]. A load failure is logged and the sync
/// still runs on in-memory defaults; if the store itself could not be
/// read, saving stays disabled.
#[derive(Debug)]
pub struct RehydrationGate {
    restored_tx: watch::Sender<bool>,
    started: AtomicBool,
}

impl RehydrationGate {
    /// Creates a gate that has not run yet.
    pub fn new() -> Self {
        let (restored_tx, _) = watch::channel(false);
        Self {
            restored_tx,
            started: AtomicBool::new(false),
        }
    }

    /// Returns a signal that resolves once restoration has completed.
    pub fn restored(&self) -> RestoreSignal {
        RestoreSignal {
            rx: self.restored_tx.subscribe(),
        }
    }

    /// Returns true once restoration has completed.
    pub fn is_restored(&self) -> bool {
        *self.restored_tx.borrow()
    }

    /// Restores persisted state into `engine`, then reconciles once.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::AlreadyRehydrated`] if the gate already ran.
    /// Restore and sync failures are reported in the [`RehydrationReport`].
    pub async fn rehydrate<T, S>(&self, engine: &SyncEngine<T, S>) -> SyncResult<RehydrationReport>
    where
        T: SyncTransport,
        S: PersistentStateStore,
    {
        if self.started.swap(true, Ordering::AcqRel) {
            warn!("rehydration requested twice");
            return Err(SyncError::AlreadyRehydrated);
        }

        // Saves stay off when the store could not be read, since it may
        // still hold a good snapshot. A missing or undecodable one may be
        // replaced.
        let (restored, saves_enabled, restore_error) = match engine.store().load().await {
            Ok(Some(snapshot)) => {
                engine.restore(snapshot).await;
                (true, true, None)
            }
            Ok(None) => (false, true, None),
            Err(e @ SyncError::Rehydration(_)) => {
                warn!(error = %e, "discarding undecodable localization state");
                (false, true, Some(e))
            }
            Err(e) => {
                error!(error = %e, "failed to rehydrate localization store");
                (false, false, Some(SyncError::Rehydration(e.to_string())))
            }
        };

        if saves_enabled {
            engine.mark_rehydrated();
        } else {
            warn!("localization store unreadable; saves stay disabled");
        }
        self.restored_tx.send_replace(true);
        info!(restored, saves_enabled, "localization state rehydrated");

        let sync = engine.fetch_and_sync().await;
        Ok(RehydrationReport {
            restored,
            restore_error,
            sync,
        })
    }
}

impl Default for RehydrationGate {
    fn default() -> Self {
        Self::new()
    }
}
