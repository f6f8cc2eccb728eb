//! Single-assignment cell that carries the result of a code prompt.
//!
//! A [`PendingCode`] is handed to the caller, who waits on it. The matching
//! [`CodeCompleter`] is cloned into every UI callback that may finish the
//! prompt. Only the first call to [`CodeCompleter::complete`] has any
//! effect; the rest return `false`.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_std::channel::{self, Receiver, Sender};

/// Creates a connected pending cell and its completer.
pub fn channel() -> (PendingCode, CodeCompleter) {
    let (tx, rx) = channel::bounded(1);
    (
        PendingCode { rx },
        CodeCompleter {
            tx,
            completed: Arc::new(AtomicBool::new(false)),
        },
    )
}

#[derive(Debug)]
pub struct PendingCode {
    rx: Receiver<Option<String>>,
}

impl PendingCode {
    /// Waits for the user. `None` means the prompt was cancelled, or every
    /// completer was dropped before anyone answered.
    pub async fn wait(self) -> Option<String> {
        self.rx.recv().await.ok().flatten()
    }

    pub fn wait_blocking(self) -> Option<String> {
        self.rx.recv_blocking().ok().flatten()
    }

    /// True once the prompt has an answer or can no longer get one.
    pub fn is_resolved(&self) -> bool {
        !self.rx.is_empty() || self.rx.is_closed()
    }
}

#[derive(Clone, Debug)]
pub struct CodeCompleter {
    tx: Sender<Option<String>>,
    completed: Arc<AtomicBool>,
}

impl CodeCompleter {
    /// Stores the result. Returns `false` if a result was already stored.
    pub fn complete(&self, code: Option<String>) -> bool {
        if self.completed.swap(true, Ordering::AcqRel) {
            tracing::debug!("Ignoring second completion of code prompt");
            return false;
        }
        if self.tx.try_send(code).is_err() {
            tracing::debug!("Nobody is waiting for the code prompt anymore");
        }
        self.tx.close();
        true
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }
}
