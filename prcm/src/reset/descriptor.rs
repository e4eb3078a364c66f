use crate::{
    ResetError,
    dev::{handle::HandleRef, mmio::IoWindow},
};
use alloc::boxed::Box;

/// Where one reset line lives: a control bit and a status bit inside the
/// register window of its PRCM instance.
///
/// The window is only referenced, never owned; every line under the same
/// parent shares it and the controller holds the owning handle.
#[derive(Debug, Clone)]
pub struct RegisterDescriptor {
    pub window: HandleRef<IoWindow>,
    pub rstctrl_offs: u32,
    pub rstst_offs: u32,
    pub rstctrl_bit: u8,
    pub rstst_bit: u8,
    /// Phandle of the reset-line node.
    pub id: u32,
    pub name: Box<str>,
}

impl RegisterDescriptor {
    /// Run `f` on the live window, or fail if it has been torn down.
    pub(super) fn with_window<R>(
        &self,
        f: impl FnOnce(&IoWindow) -> R,
    ) -> Result<R, ResetError> {
        let window = self.window.get_handle().ok_or(ResetError::Detached)?;
        Ok(f(&window))
    }
}
