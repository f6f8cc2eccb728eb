use gettextrs::{gettext, ngettext};
use twofactor_common::model::{CODE_LENGTH, CodeRequest, Icon};

/// Host side of the prompt: whatever can put a modal input dialog on screen.
///
/// Both methods are only ever called on the UI thread.
pub trait DialogShell: Send + Sync + 'static {
    type Handle: Send + 'static;

    /// Shows `dialog` and returns a handle to it.
    ///
    /// `callbacks` must be invoked on the UI thread. A dismissal action
    /// closes the dialog on its own.
    fn show_modal_input(&self, dialog: CodeDialog, callbacks: DialogCallbacks) -> Self::Handle;

    /// Closes the dialog. Must be harmless if it is already closed.
    fn dismiss(&self, handle: Self::Handle);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Number,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeDialog {
    pub title: String,
    pub subtitle: String,
    pub icon: Option<Icon>,
    pub input: InputKind,
    pub max_length: usize,
    /// Whether back-press or tapping outside may close the dialog.
    pub cancelable: bool,
}

impl CodeDialog {
    pub fn for_request(request: &CodeRequest) -> Self {
        // TRANSLATORS: %s1 is the two-factor method, e.g. "email" or "sms"
        let title = gettext("Please provide your %s1 code").replace("%s1", &request.method);
        let left = request.attempts_remaining;
        let subtitle = ngettext(
            "One attempt remaining",
            "%d attempts remaining",
            left,
        )
        .replace("%d", &format!("{}", left));
        Self {
            title,
            subtitle,
            icon: request.icon(),
            input: InputKind::Number,
            max_length: CODE_LENGTH,
            cancelable: false,
        }
    }
}

pub struct DialogCallbacks {
    pub on_input_change: Box<dyn Fn(&str) + Send + Sync>,
    pub on_positive: Box<dyn Fn() + Send + Sync>,
    pub on_negative: Box<dyn Fn() + Send + Sync>,
}

impl std::fmt::Debug for DialogCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogCallbacks").finish_non_exhaustive()
    }
}
