use core::ops::{Deref, DerefMut};

use crate::HostInterface;

/// Holds the interrupt state of the host, as it was when the guard was created.
///
/// Creating the guard disables the module interrupt. While the guard is alive, the interrupt
/// can be turned on with [InterruptGuard::enable]. Once dropped, the interrupt is put back
/// into the state it was in before, regardless of what happened in between.
pub struct InterruptGuard<'a, H: HostInterface> {
    host: &'a mut H,
    was_enabled: bool,
}
impl<'a, H: HostInterface> InterruptGuard<'a, H> {
    /// Save the current interrupt state and disable the interrupt.
    pub fn new(host: &'a mut H) -> Self {
        let was_enabled = host.disable_interrupts();
        Self { host, was_enabled }
    }
    /// Enable the interrupt until the guard is dropped.
    pub fn enable(&mut self) {
        self.host.enable_interrupts();
    }
}
impl<H: HostInterface> Deref for InterruptGuard<'_, H> {
    type Target = H;
    fn deref(&self) -> &Self::Target {
        self.host
    }
}
impl<H: HostInterface> DerefMut for InterruptGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.host
    }
}
impl<H: HostInterface> Drop for InterruptGuard<'_, H> {
    fn drop(&mut self) {
        if self.was_enabled {
            self.host.enable_interrupts();
        } else {
            self.host.disable_interrupts();
        }
    }
}
