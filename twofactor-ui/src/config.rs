pub static APP_ID: &str = match option_env!("TWOFACTOR_APP_ID") {
    Some(id) => id,
    None => "io.github.twofactor.CodePrompt",
};
pub static GETTEXT_PACKAGE: &str = match option_env!("TWOFACTOR_GETTEXT_PACKAGE") {
    Some(package) => package,
    None => "twofactor-prompt",
};
pub static LOCALEDIR: &str = match option_env!("TWOFACTOR_LOCALEDIR") {
    Some(dir) => dir,
    None => "/usr/share/locale",
};
pub static PROFILE: &str = match option_env!("TWOFACTOR_PROFILE") {
    Some(profile) => profile,
    None => "default",
};
pub static VERSION: &str = env!("CARGO_PKG_VERSION");
