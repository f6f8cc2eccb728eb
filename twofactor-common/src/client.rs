use crate::{model::HardwareRequiredData, pending::PendingCode};

/// Used by wallet code to ask the user for two-factor codes.
pub trait CodeResolver {
    /// Asks for the code sent through `method`. Returns immediately; the
    /// answer arrives through the returned [`PendingCode`].
    fn code(&self, method: &str, attempts_remaining: u32) -> PendingCode;

    /// Asks a hardware device for the data in `required_data`.
    ///
    /// `None` means this resolver cannot handle hardware requests at all.
    fn hardware_request(&self, required_data: &HardwareRequiredData) -> Option<PendingCode>;

    /// Closes whatever prompt is currently showing, if any.
    fn dismiss(&self);
}
