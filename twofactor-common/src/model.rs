use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Number of digits a two-factor code has.
pub const CODE_LENGTH: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TwoFactorMethod {
    Email,
    Sms,
    GAuth,
    Phone,
    Unknown,
}

impl From<&str> for TwoFactorMethod {
    fn from(value: &str) -> Self {
        match value {
            "email" => TwoFactorMethod::Email,
            "sms" => TwoFactorMethod::Sms,
            "gauth" => TwoFactorMethod::GAuth,
            "phone" => TwoFactorMethod::Phone,
            _ => TwoFactorMethod::Unknown,
        }
    }
}

impl TwoFactorMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TwoFactorMethod::Email => "email",
            TwoFactorMethod::Sms => "sms",
            TwoFactorMethod::GAuth => "gauth",
            TwoFactorMethod::Phone => "phone",
            TwoFactorMethod::Unknown => "unknown",
        }
    }

    pub fn icon(&self) -> Option<Icon> {
        match self {
            TwoFactorMethod::Email => Some(Icon::Email),
            TwoFactorMethod::Sms => Some(Icon::Sms),
            TwoFactorMethod::GAuth => Some(Icon::Authenticator),
            TwoFactorMethod::Phone => Some(Icon::Call),
            TwoFactorMethod::Unknown => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Icon {
    Email,
    Sms,
    Authenticator,
    Call,
}

impl Icon {
    pub fn icon_name(&self) -> &'static str {
        match self {
            Icon::Email => "mail-unread-symbolic",
            Icon::Sms => "mail-message-new-symbolic",
            Icon::Authenticator => "dialog-password-symbolic",
            Icon::Call => "call-start-symbolic",
        }
    }
}

/// A request for the user to type in a code sent through `method`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRequest {
    /// Method name as given by the wallet, e.g. "email". Shown verbatim.
    pub method: String,
    pub attempts_remaining: u32,
}

impl CodeRequest {
    pub fn new(method: impl Into<String>, attempts_remaining: u32) -> Self {
        Self {
            method: method.into(),
            attempts_remaining,
        }
    }

    pub fn kind(&self) -> TwoFactorMethod {
        self.method.as_str().into()
    }

    pub fn icon(&self) -> Option<Icon> {
        self.kind().icon()
    }
}

/// What a hardware wallet needs from the user to complete an action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareRequiredData {
    pub action: String,
    pub device_id: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptState {
    /// No dialog has been requested yet.
    #[default]
    Idle,

    /// Dialog is scheduled or visible, waiting for the user.
    Showing,

    /// User typed a full code.
    Fulfilled,

    /// User dismissed the dialog without a full code.
    Cancelled,
}

impl PromptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PromptState::Fulfilled | PromptState::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The UI thread is gone and cannot take any more work.
    UiUnavailable,
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UiUnavailable => f.write_str("UiUnavailable"),
        }
    }
}
