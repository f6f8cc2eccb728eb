pub mod prompt;
pub mod shell;
pub mod terminal;

use std::thread::{self, JoinHandle};

use async_std::channel::{Receiver, Sender};
use gettextrs::LocaleCategory;
use twofactor_common::model::Error;

use crate::config::{GETTEXT_PACKAGE, LOCALEDIR};

pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs work on the thread that owns the dialogs.
pub trait UiExecutor: Send + Sync + 'static {
    /// Queues `task` without waiting for it to run.
    fn post(&self, task: UiTask) -> Result<(), Error>;
}

#[derive(Clone, Debug)]
pub struct UiThread {
    tx: Sender<UiTask>,
}

impl UiThread {
    /// Stops accepting tasks. The thread exits after draining its queue.
    pub fn close(&self) {
        self.tx.close();
    }
}

impl UiExecutor for UiThread {
    fn post(&self, task: UiTask) -> Result<(), Error> {
        self.tx.try_send(task).map_err(|err| {
            tracing::error!("Failed to post task to UI thread: {err}");
            Error::UiUnavailable
        })
    }
}

pub fn start_ui_thread() -> Result<(UiThread, JoinHandle<()>), std::io::Error> {
    let (tx, rx) = async_std::channel::unbounded::<UiTask>();
    let handle = thread::Builder::new()
        .name("ui".into())
        .spawn(move || run_ui_loop(rx))?;
    Ok((UiThread { tx }, handle))
}

fn run_ui_loop(rx: Receiver<UiTask>) {
    while let Ok(task) = rx.recv_blocking() {
        task();
    }
    tracing::debug!("UI thread finished");
}

pub fn init_i18n() -> Result<(), std::io::Error> {
    gettextrs::setlocale(LocaleCategory::LcAll, "");
    gettextrs::bindtextdomain(GETTEXT_PACKAGE, LOCALEDIR)?;
    gettextrs::textdomain(GETTEXT_PACKAGE)?;
    gettextrs::bind_textdomain_codeset(GETTEXT_PACKAGE, "UTF-8")?;
    Ok(())
}
