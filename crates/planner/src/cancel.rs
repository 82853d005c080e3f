use std::future::Future;
use tokio::sync::watch;

use crate::PlanError;

/// Owner side of a cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Cloneable cancellation signal threaded through a planning run.
///
/// Planning may be re-invoked on every input change; cancelling abandons the
/// in-flight quote or read of a stale run.
#[derive(Clone, Debug)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled; never resolves if the handle is dropped first
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Run an external call, aborting with [`PlanError::Cancelled`] if `signal` fires first
pub async fn guarded<F, T, E>(signal: Option<&CancelSignal>, fut: F) -> Result<T, PlanError>
where
    F: Future<Output = Result<T, E>>,
    PlanError: From<E>,
{
    match signal {
        None => fut.await.map_err(PlanError::from),
        Some(signal) => {
            if signal.is_cancelled() {
                return Err(PlanError::Cancelled);
            }
            tokio::select! {
                result = fut => result.map_err(PlanError::from),
                _ = signal.cancelled() => Err(PlanError::Cancelled),
            }
        }
    }
}
