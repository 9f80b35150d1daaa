use anyhow::Result;
use rsvp_core::{Response, ResponseKey, Screen};

/// Whatever shows screens to the participant and collects key presses.
///
/// Calls block: `present` returns once the screen is visible, `wait_key`
/// once one of `accepted` was pressed.
pub trait Frontend {
    fn present(&mut self, screen: &Screen) -> Result<()>;

    /// Reaction time is measured from the call.
    fn wait_key(&mut self, accepted: &[ResponseKey]) -> Result<Response>;

    /// Wait for any key, used on instruction screens.
    fn wait_continue(&mut self) -> Result<()>;
}

impl<F: Frontend + ?Sized> Frontend for &mut F {
    fn present(&mut self, screen: &Screen) -> Result<()> {
        (**self).present(screen)
    }

    fn wait_key(&mut self, accepted: &[ResponseKey]) -> Result<Response> {
        (**self).wait_key(accepted)
    }

    fn wait_continue(&mut self) -> Result<()> {
        (**self).wait_continue()
    }
}
