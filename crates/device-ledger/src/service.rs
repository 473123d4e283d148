//! Serialized execution of calls from async code.
//!
//! The ledger itself is synchronous. [`LedgerService`] moves it onto one
//! blocking worker and feeds it calls through a channel, so concurrent
//! callers are applied one at a time in arrival order and every call sees
//! the effects of the calls before it.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use device_ledger_core::Blake3Hash;
use device_ledger_store::Store;

use crate::call::{Call, Outcome};
use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;

/// Pending requests buffered before senders wait.
const QUEUE_DEPTH: usize = 64;

enum Request {
    Call(Call, oneshot::Sender<Result<Outcome>>),
    StateDigest(oneshot::Sender<Result<Blake3Hash>>),
    Shutdown,
}

/// Cloneable handle for submitting calls to a running service.
#[derive(Clone)]
pub struct LedgerHandle {
    tx: mpsc::Sender<Request>,
}

impl LedgerHandle {
    /// Submit `call` and wait for its outcome.
    pub async fn call(&self, call: Call) -> Result<Outcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Call(call, reply))
            .await
            .map_err(|_| LedgerError::ServiceStopped)?;
        rx.await.map_err(|_| LedgerError::ServiceStopped)?
    }

    /// Digest of the ledger state after every call submitted before this one.
    pub async fn state_digest(&self) -> Result<Blake3Hash> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::StateDigest(reply))
            .await
            .map_err(|_| LedgerError::ServiceStopped)?;
        rx.await.map_err(|_| LedgerError::ServiceStopped)?
    }
}

/// A ledger running on its own blocking worker.
pub struct LedgerService<S: Store + 'static> {
    handle: LedgerHandle,
    worker: JoinHandle<Ledger<S>>,
}

impl<S: Store + 'static> LedgerService<S> {
    /// Move `ledger` onto a blocking worker. Must be called inside a tokio runtime.
    pub fn spawn(ledger: Ledger<S>) -> Self {
        let (tx, mut rx) = mpsc::channel::<Request>(QUEUE_DEPTH);

        let worker = tokio::task::spawn_blocking(move || {
            tracing::debug!("ledger service started");
            let mut served = 0u64;

            while let Some(request) = rx.blocking_recv() {
                match request {
                    Request::Call(call, reply) => {
                        served += 1;
                        // The caller may have given up waiting; the call still ran.
                        let _ = reply.send(ledger.dispatch(&call));
                    }
                    Request::StateDigest(reply) => {
                        let _ = reply.send(ledger.state_digest());
                    }
                    Request::Shutdown => break,
                }
            }

            tracing::debug!(served, "ledger service stopped");
            ledger
        });

        Self {
            handle: LedgerHandle { tx },
            worker,
        }
    }

    /// A new handle to this service.
    pub fn handle(&self) -> LedgerHandle {
        self.handle.clone()
    }

    /// Stop after the calls already queued and give the ledger back.
    ///
    /// Handles still held elsewhere get [`LedgerError::ServiceStopped`].
    pub async fn shutdown(self) -> Result<Ledger<S>> {
        self.handle
            .tx
            .send(Request::Shutdown)
            .await
            .map_err(|_| LedgerError::ServiceStopped)?;
        self.worker.await.map_err(|e| {
            tracing::warn!(error = %e, "ledger worker panicked");
            LedgerError::ServiceStopped
        })
    }
}
