//! A [`DialogShell`] for terminals.
//!
//! The dialog is printed to stderr and answered on stdin. Each line is
//! treated as the whole content of the input field and is fed to the
//! prompt one digit at a time, the way a text field reports keystrokes.
//! An empty line presses the positive button; end of input presses the
//! negative one.

use std::{
    io::{BufRead, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use gettextrs::{gettext, ngettext};
use twofactor_common::model::Error;

use super::{
    UiExecutor,
    shell::{CodeDialog, DialogCallbacks, DialogShell},
};

#[derive(Clone, Debug)]
pub struct TerminalShell<E> {
    executor: E,
}

impl<E: UiExecutor + Clone> TerminalShell<E> {
    /// `executor` must run on the same thread the prompt posts to.
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

#[derive(Debug)]
pub struct TerminalDialog {
    closed: Arc<AtomicBool>,
}

impl<E: UiExecutor + Clone> DialogShell for TerminalShell<E> {
    type Handle = TerminalDialog;

    fn show_modal_input(&self, dialog: CodeDialog, callbacks: DialogCallbacks) -> TerminalDialog {
        eprintln!();
        match dialog.icon {
            Some(icon) => eprintln!("[{}] {}", icon.icon_name(), dialog.title),
            None => eprintln!("{}", dialog.title),
        }
        eprintln!("{}", dialog.subtitle);
        eprintln!("{}", gettext("Press Enter on an empty line to cancel."));

        let closed = Arc::new(AtomicBool::new(false));
        let reader = InputReader {
            executor: self.executor.clone(),
            callbacks: Arc::new(callbacks),
            closed: closed.clone(),
            max_length: dialog.max_length,
        };
        if let Err(err) = thread::Builder::new()
            .name("terminal-input".into())
            .spawn(move || reader.run(std::io::stdin().lock()))
        {
            tracing::error!("Failed to start terminal input thread: {err}");
        }
        TerminalDialog { closed }
    }

    fn dismiss(&self, handle: TerminalDialog) {
        if !handle.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("Terminal dialog closed");
        }
    }
}

enum Dismissal {
    Positive,
    Negative,
}

struct InputReader<E> {
    executor: E,
    callbacks: Arc<DialogCallbacks>,
    closed: Arc<AtomicBool>,
    max_length: usize,
}

impl<E: UiExecutor + Clone> InputReader<E> {
    /// Feeds lines from `input` to the dialog until it is closed or the
    /// input ends. The callbacks are dropped on return.
    fn run<R: BufRead>(self, mut input: R) {
        while !self.closed.load(Ordering::Acquire) {
            eprint!("> ");
            let _ = std::io::stderr().flush();

            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) => {
                    self.close_with(Dismissal::Negative);
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!("Failed to read code from terminal: {err}");
                    self.close_with(Dismissal::Negative);
                    break;
                }
            }
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            if line.is_empty() {
                self.close_with(Dismissal::Positive);
                break;
            }

            if line.chars().any(|c| !c.is_ascii_digit()) {
                tracing::warn!("Ignoring non-digit characters in code");
            }
            let keystrokes = digit_prefixes(&line, self.max_length);
            let typed = keystrokes.last().map_or(0, String::len);
            for field in keystrokes {
                if self.deliver(field).is_err() {
                    return;
                }
            }
            if typed != self.max_length {
                let hint = ngettext(
                    "The code has one digit.",
                    "The code has %d digits.",
                    self.max_length as u32,
                )
                .replace("%d", &format!("{}", self.max_length));
                eprintln!("{hint}");
            }
            // Let the prompt react to the line before asking for another.
            if self.sync().is_err() {
                return;
            }
        }
    }

    /// Dismissal actions close the dialog before reporting.
    fn close_with(&self, dismissal: Dismissal) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let callbacks = self.callbacks.clone();
        let posted = self.executor.post(Box::new(move || match dismissal {
            Dismissal::Positive => (callbacks.on_positive)(),
            Dismissal::Negative => (callbacks.on_negative)(),
        }));
        if let Err(err) = posted {
            tracing::error!("Failed to report terminal dialog dismissal: {err}");
        }
    }

    fn deliver(&self, input: String) -> Result<(), Error> {
        let callbacks = self.callbacks.clone();
        let closed = self.closed.clone();
        self.executor.post(Box::new(move || {
            if !closed.load(Ordering::Acquire) {
                (callbacks.on_input_change)(&input);
            }
        }))
    }

    /// Returns once the UI thread has run the keystrokes already posted and
    /// whatever work they queued in turn, such as dismissing this dialog.
    fn sync(&self) -> Result<(), Error> {
        let (tx, rx) = async_std::channel::bounded::<()>(1);
        let executor = self.executor.clone();
        self.executor.post(Box::new(move || {
            let posted = executor.post(Box::new(move || {
                let _ = tx.try_send(());
            }));
            if let Err(err) = posted {
                tracing::debug!("UI thread closed during terminal sync: {err}");
            }
        }))?;
        rx.recv_blocking().map_err(|_| Error::UiUnavailable)
    }
}

/// Successive contents of a numeric field while `line` is typed into it.
fn digit_prefixes(line: &str, max_length: usize) -> Vec<String> {
    let mut field = String::with_capacity(max_length);
    line.chars()
        .filter(char::is_ascii_digit)
        .take(max_length)
        .map(|digit| {
            field.push(digit);
            field.clone()
        })
        .collect()
}

#[cfg(test)]
mod test {
    use std::{
        io::Cursor,
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, Ordering},
        },
    };

    use twofactor_common::pending;

    use super::{InputReader, digit_prefixes};
    use crate::gui::{
        UiExecutor, UiThread,
        shell::DialogCallbacks,
        start_ui_thread,
    };

    #[derive(Clone, Debug, PartialEq)]
    enum Event {
        Input(String),
        Positive,
        Negative,
    }

    type Events = Arc<Mutex<Vec<Event>>>;

    fn recording_callbacks(events: &Events) -> DialogCallbacks {
        let on_input = events.clone();
        let on_positive = events.clone();
        let on_negative = events.clone();
        DialogCallbacks {
            on_input_change: Box::new(move |input: &str| {
                on_input.lock().unwrap().push(Event::Input(input.to_string()));
            }),
            on_positive: Box::new(move || on_positive.lock().unwrap().push(Event::Positive)),
            on_negative: Box::new(move || on_negative.lock().unwrap().push(Event::Negative)),
        }
    }

    fn reader(ui: &UiThread, callbacks: DialogCallbacks) -> (InputReader<UiThread>, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        let reader = InputReader {
            executor: ui.clone(),
            callbacks: Arc::new(callbacks),
            closed: closed.clone(),
            max_length: 6,
        };
        (reader, closed)
    }

    /// Runs `input` through a reader on a real UI thread and returns what
    /// the dialog saw.
    fn feed(input: &str) -> Vec<Event> {
        let (ui, ui_thread) = start_ui_thread().unwrap();
        let events = Events::default();
        let (reader, _closed) = reader(&ui, recording_callbacks(&events));
        reader.run(Cursor::new(input.to_string()));
        ui.close();
        ui_thread.join().unwrap();
        events.lock().unwrap().clone()
    }

    fn inputs(fields: &[&str]) -> Vec<Event> {
        fields.iter().map(|f| Event::Input(f.to_string())).collect()
    }

    #[test]
    fn test_full_line_types_each_digit() {
        let mut expected = inputs(&["1", "12", "123", "1234", "12345", "123456"]);
        expected.push(Event::Negative);
        assert_eq!(expected, feed("123456\n"));
    }

    #[test]
    fn test_empty_line_presses_positive() {
        assert_eq!(vec![Event::Positive], feed("\n"));
    }

    #[test]
    fn test_end_of_input_presses_negative() {
        assert_eq!(vec![Event::Negative], feed(""));
    }

    #[test]
    fn test_short_code_then_empty_line() {
        let mut expected = inputs(&["1", "12"]);
        expected.push(Event::Positive);
        assert_eq!(expected, feed("12\n\n"));
    }

    #[test]
    fn test_non_digits_are_dropped() {
        let mut expected = inputs(&["1", "12", "123"]);
        expected.push(Event::Negative);
        assert_eq!(expected, feed("1a2-3\r\n"));
    }

    #[test]
    fn test_dialog_dismissed_by_its_callback_stops_reading() {
        let (ui, ui_thread) = start_ui_thread().unwrap();
        let events = Events::default();
        let closed_slot: Arc<Mutex<Option<Arc<AtomicBool>>>> = Arc::default();

        // Like the prompt, a full code queues the dismissal as a separate task.
        let on_input_events = events.clone();
        let dismiss_ui = ui.clone();
        let dismiss_slot = closed_slot.clone();
        let callbacks = DialogCallbacks {
            on_input_change: Box::new(move |input: &str| {
                on_input_events
                    .lock()
                    .unwrap()
                    .push(Event::Input(input.to_string()));
                if input.len() == 6 {
                    let slot = dismiss_slot.clone();
                    dismiss_ui
                        .post(Box::new(move || {
                            if let Some(closed) = slot.lock().unwrap().as_ref() {
                                closed.store(true, Ordering::Release);
                            }
                        }))
                        .unwrap();
                }
            }),
            on_positive: Box::new(|| panic!("positive pressed after dismissal")),
            on_negative: Box::new(|| panic!("negative pressed after dismissal")),
        };
        let (reader, closed) = reader(&ui, callbacks);
        closed_slot.lock().unwrap().replace(closed);

        let mut input = Cursor::new("123456\n654321\n".to_string());
        reader.run(&mut input);
        assert_eq!(7, input.position());

        ui.close();
        ui_thread.join().unwrap();
        assert_eq!(
            inputs(&["1", "12", "123", "1234", "12345", "123456"]),
            *events.lock().unwrap()
        );
    }

    #[test]
    fn test_keystrokes_after_dismissal_are_not_delivered() {
        let (ui, ui_thread) = start_ui_thread().unwrap();
        let events = Events::default();
        let (reader, closed) = reader(&ui, recording_callbacks(&events));
        // Hold the UI thread until the keystrokes are queued, then close.
        let (release_tx, release_rx) = async_std::channel::bounded::<()>(1);
        ui.post(Box::new(move || {
            let _ = release_rx.recv_blocking();
        }))
        .unwrap();
        for field in ["1", "12"] {
            reader.deliver(field.to_string()).unwrap();
        }
        closed.store(true, Ordering::Release);
        release_tx.try_send(()).unwrap();

        ui.close();
        ui_thread.join().unwrap();
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failed_dismissal_releases_the_request() {
        let (ui, ui_thread) = start_ui_thread().unwrap();
        ui.close();
        ui_thread.join().unwrap();

        let (pending, completer) = pending::channel();
        let on_input = completer.clone();
        let on_positive = completer.clone();
        let callbacks = DialogCallbacks {
            on_input_change: Box::new(move |_: &str| {
                on_input.complete(Some("000000".to_string()));
            }),
            on_positive: Box::new(move || {
                on_positive.complete(None);
            }),
            on_negative: Box::new(move || {
                completer.complete(None);
            }),
        };
        let (reader, closed) = reader(&ui, callbacks);
        assert!(!pending.is_resolved());

        reader.run(Cursor::new(String::new()));
        assert!(closed.load(Ordering::Acquire));
        assert!(pending.is_resolved());
        assert_eq!(None, pending.wait_blocking());
    }

    #[test]
    fn test_digit_prefixes() {
        assert_eq!(
            vec!["1", "12", "123", "1234", "12345", "123456"],
            digit_prefixes("123456", 6)
        );
    }

    #[test]
    fn test_digit_prefixes_drop_non_digits() {
        assert_eq!(vec!["1", "12", "123"], digit_prefixes("1-2 a3", 6));
        assert!(digit_prefixes("abc", 6).is_empty());
    }

    #[test]
    fn test_digit_prefixes_stop_at_max_length() {
        let prefixes = digit_prefixes("12345678", 6);
        assert_eq!(6, prefixes.len());
        assert_eq!("123456", prefixes[5]);
    }
}
