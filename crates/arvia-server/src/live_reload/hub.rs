//! Reload hub.
//!
//! Registry of live-reload sessions, one per connected browser tab, and the
//! broadcast that pushes a reload signal to all of them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Pending signals per session. A queued reload already covers any later one.
const SESSION_BUFFER: usize = 1;

/// Session identifier, unique for the lifetime of a hub.
pub(crate) type SessionId = u64;

/// Signal telling a session to reload its page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ReloadSignal;

/// Registry of live-reload sessions.
///
/// All registry operations go through one mutex, so a session is never
/// signalled concurrently with its removal.
#[derive(Debug, Default)]
pub(crate) struct ReloadHub {
    sessions: Mutex<HashMap<SessionId, mpsc::Sender<ReloadSignal>>>,
    next_id: AtomicU64,
}

impl ReloadHub {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a new session.
    ///
    /// The returned [`Session`] unregisters itself when dropped.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub(crate) fn register(self: &Arc<Self>) -> Session {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        self.sessions.lock().unwrap().insert(id, tx);
        tracing::debug!(session = id, "Live reload session registered");

        Session {
            id,
            rx,
            hub: Arc::clone(self),
        }
    }

    /// Remove a session. Returns `false` if it was already gone.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub(crate) fn unregister(&self, id: SessionId) -> bool {
        let removed = self.sessions.lock().unwrap().remove(&id).is_some();
        if removed {
            tracing::debug!(session = id, "Live reload session unregistered");
        }
        removed
    }

    /// Send a reload signal to every registered session.
    ///
    /// Sessions whose channel is closed are removed; dropping their sender
    /// ends the session's transport. A session that still has an unread
    /// signal is kept and not signalled twice. Returns the number of sessions
    /// signalled by this call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub(crate) fn broadcast(&self) -> usize {
        let mut signalled = 0;
        self.sessions
            .lock()
            .unwrap()
            .retain(|id, tx| match tx.try_send(ReloadSignal) {
                Ok(()) => {
                    signalled += 1;
                    true
                }
                Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(session = id, "Dropping closed live reload session");
                    false
                }
            });
        signalled
    }

    /// Number of registered sessions.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub(crate) fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Drop every session, closing their transports.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub(crate) fn close_all(&self) {
        let mut sessions = self.sessions.lock().unwrap();
        if !sessions.is_empty() {
            tracing::info!(sessions = sessions.len(), "Closing live reload sessions");
        }
        sessions.clear();
    }
}

/// Receiving end of one live-reload session.
#[derive(Debug)]
pub(crate) struct Session {
    id: SessionId,
    rx: mpsc::Receiver<ReloadSignal>,
    hub: Arc<ReloadHub>,
}

impl Session {
    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    /// Wait for the next reload signal.
    ///
    /// Returns `None` once the hub has dropped this session.
    pub(crate) async fn recv(&mut self) -> Option<ReloadSignal> {
        self.rx.recv().await
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}
