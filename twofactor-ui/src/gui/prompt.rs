use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::{debug, info, warn};
use twofactor_common::{
    client::CodeResolver,
    model::{CODE_LENGTH, CodeRequest, HardwareRequiredData, PromptState},
    pending::{self, CodeCompleter, PendingCode},
};

use super::{
    UiExecutor,
    shell::{CodeDialog, DialogCallbacks, DialogShell},
};

type RequestId = u64;

/// Modal prompt that asks the user to type a two-factor code.
pub struct CodeEntryPrompt<S: DialogShell, E: UiExecutor> {
    shell: Arc<S>,
    executor: Arc<E>,
    dialogs: Arc<Mutex<Dialogs<S::Handle>>>,
}

struct Dialogs<H> {
    next_id: RequestId,
    active: BTreeMap<RequestId, ActiveDialog<H>>,
    latest: Option<(RequestId, PromptState)>,
}

struct ActiveDialog<H> {
    // None until the UI thread has shown the dialog.
    handle: Option<H>,
}

impl<H> Dialogs<H> {
    fn set_state(&mut self, id: RequestId, state: PromptState) {
        if let Some((latest_id, latest_state)) = self.latest.as_mut() {
            if *latest_id == id {
                *latest_state = state;
            }
        }
    }
}

impl<S: DialogShell, E: UiExecutor> CodeEntryPrompt<S, E> {
    pub fn new(shell: S, executor: E) -> Self {
        Self {
            shell: Arc::new(shell),
            executor: Arc::new(executor),
            dialogs: Arc::new(Mutex::new(Dialogs {
                next_id: 0,
                active: BTreeMap::new(),
                latest: None,
            })),
        }
    }

    /// Schedules the prompt on the UI thread and returns without waiting
    /// for it to appear.
    pub fn request_code(&self, method: &str, attempts_remaining: u32) -> PendingCode {
        let request = CodeRequest::new(method, attempts_remaining);
        let (pending, completer) = pending::channel();
        let id = {
            let mut dialogs = lock(&self.dialogs);
            let id = dialogs.next_id;
            dialogs.next_id += 1;
            dialogs.latest = Some((id, PromptState::Showing));
            dialogs.active.insert(id, ActiveDialog { handle: None });
            id
        };

        let context = RequestContext {
            id,
            shell: self.shell.clone(),
            executor: self.executor.clone(),
            dialogs: self.dialogs.clone(),
            completer,
        };
        let dialog = CodeDialog::for_request(&request);
        let callbacks = context.callbacks();
        let show = {
            let context = context.clone();
            move || {
                debug!(method = %request.method, "Showing code entry dialog");
                let handle = context.shell.show_modal_input(dialog, callbacks);
                context.attach(handle);
            }
        };
        if self.executor.post(Box::new(show)).is_err() {
            warn!("Could not show code entry dialog, treating request as cancelled");
            context.finish(None, false);
        }
        pending
    }

    /// Hardware requests are not handled here. Always `None`.
    pub fn hardware_request_code(
        &self,
        required_data: &HardwareRequiredData,
    ) -> Option<PendingCode> {
        debug!(
            action = %required_data.action,
            "Code entry prompt does not support hardware requests"
        );
        None
    }

    /// Closes any dialog that is showing. Requests stay unanswered; their
    /// cells resolve only when the user acts or the shell drops the
    /// dialog's callbacks.
    pub fn dismiss_current(&self) {
        let shell = self.shell.clone();
        let dialogs = self.dialogs.clone();
        let dismiss = move || {
            let drained = std::mem::take(&mut lock(&dialogs).active);
            for (id, active) in drained {
                if let Some(handle) = active.handle {
                    debug!(request = id, "Dismissing code entry dialog");
                    shell.dismiss(handle);
                }
            }
        };
        if self.executor.post(Box::new(dismiss)).is_err() {
            debug!("UI thread is gone, nothing to dismiss");
        }
    }

    /// State of the most recent request.
    pub fn state(&self) -> PromptState {
        lock(&self.dialogs)
            .latest
            .map(|(_, state)| state)
            .unwrap_or_default()
    }
}

impl<S: DialogShell, E: UiExecutor> CodeResolver for CodeEntryPrompt<S, E> {
    fn code(&self, method: &str, attempts_remaining: u32) -> PendingCode {
        self.request_code(method, attempts_remaining)
    }

    fn hardware_request(&self, required_data: &HardwareRequiredData) -> Option<PendingCode> {
        self.hardware_request_code(required_data)
    }

    fn dismiss(&self) {
        self.dismiss_current()
    }
}

/// Everything the callbacks of one dialog need.
struct RequestContext<S: DialogShell, E: UiExecutor> {
    id: RequestId,
    shell: Arc<S>,
    executor: Arc<E>,
    dialogs: Arc<Mutex<Dialogs<S::Handle>>>,
    completer: CodeCompleter,
}

impl<S: DialogShell, E: UiExecutor> Clone for RequestContext<S, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            shell: self.shell.clone(),
            executor: self.executor.clone(),
            dialogs: self.dialogs.clone(),
            completer: self.completer.clone(),
        }
    }
}

impl<S: DialogShell, E: UiExecutor> RequestContext<S, E> {
    fn callbacks(&self) -> DialogCallbacks {
        let on_input = self.clone();
        let on_positive = self.clone();
        let on_negative = self.clone();
        DialogCallbacks {
            on_input_change: Box::new(move |input: &str| {
                if input.chars().count() == CODE_LENGTH {
                    debug!(request = on_input.id, "Code entered");
                    on_input.finish(Some(input.to_string()), true);
                }
            }),
            on_positive: Box::new(move || {
                debug!(request = on_positive.id, "Code entry cancelled");
                on_positive.finish(None, false);
            }),
            on_negative: Box::new(move || {
                debug!(request = on_negative.id, "Code entry cancelled");
                on_negative.finish(None, false);
            }),
        }
    }

    /// Stores the handle of the dialog the UI thread just showed.
    fn attach(&self, handle: S::Handle) {
        let mut dialogs = lock(&self.dialogs);
        if let Some(active) = dialogs.active.get_mut(&self.id) {
            active.handle = Some(handle);
            return;
        }
        drop(dialogs);
        // Finished while the dialog was being built.
        self.shell.dismiss(handle);
    }

    /// Resolves this request. With `close` the dialog is dismissed as well;
    /// dismissal actions pass `false` since the shell already closed it.
    fn finish(&self, code: Option<String>, close: bool) {
        let state = if code.is_some() {
            PromptState::Fulfilled
        } else {
            PromptState::Cancelled
        };
        if !self.completer.complete(code) {
            return;
        }
        let active = {
            let mut dialogs = lock(&self.dialogs);
            dialogs.set_state(self.id, state);
            dialogs.active.remove(&self.id)
        };
        info!(request = self.id, ?state, "Code entry finished");

        if !close {
            return;
        }
        // No handle yet means `attach` will see the request gone and dismiss.
        let Some(handle) = active.and_then(|active| active.handle) else {
            return;
        };
        let shell = self.shell.clone();
        let id = self.id;
        let dismiss = move || {
            debug!(request = id, "Dismissing code entry dialog");
            shell.dismiss(handle);
        };
        if self.executor.post(Box::new(dismiss)).is_err() {
            warn!(request = id, "UI thread is gone, cannot dismiss code entry dialog");
        }
    }
}

fn lock<H>(dialogs: &Mutex<Dialogs<H>>) -> MutexGuard<'_, Dialogs<H>> {
    dialogs.lock().unwrap_or_else(PoisonError::into_inner)
}
