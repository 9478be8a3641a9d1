use embassy_time::Instant;

use crate::WindowId;

/// Access to the MRF24WG from the host.
///
/// This is implemented by the platform. It covers the SPI register accessors, a monotonic
/// clock, a short busy delay and control over the host side interrupt line of the module.
pub trait HostInterface {
    /// Read an 8-bit register.
    fn read_u8(&mut self, register: u8) -> u8;
    /// Write an 8-bit register.
    fn write_u8(&mut self, register: u8, value: u8);
    /// Read a 16-bit register.
    fn read_u16(&mut self, register: u8) -> u16;
    /// Write a 16-bit register.
    fn write_u16(&mut self, register: u8, value: u16);
    /// Read `buffer.len()` bytes from `register` in one bulk transfer.
    fn read_array(&mut self, register: u8, buffer: &mut [u8]);
    /// Write all of `buffer` to `register` in one bulk transfer.
    fn write_array(&mut self, register: u8, buffer: &[u8]);
    /// The current time.
    fn now(&mut self) -> Instant;
    /// Busy wait for `us` microseconds.
    fn delay_us(&mut self, us: u32);
    /// Enable the module interrupt. Returns, whether it was enabled before.
    fn enable_interrupts(&mut self) -> bool;
    /// Disable the module interrupt. Returns, whether it was enabled before.
    fn disable_interrupts(&mut self) -> bool;
    /// Best-effort sink for driver faults.
    ///
    /// This must not block. The default implementation drops the fault.
    fn report_fault(&mut self, _fault: Fault) {}
}

/// A non-fatal condition detected by the driver.
///
/// None of these abort the operation, which raised them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// The hardware didn't signal completion of a move in time. The byte count returned by
    /// that move is not trustworthy.
    MoveTimeout { window: WindowId },
    /// The index couldn't be set, because it's past the end of the window.
    IndexOutOfBounds { window: WindowId, index: u16 },
    /// A read or write was performed, while the index was out of bounds.
    OutOfBoundsAccess { window: WindowId },
    /// The pool reported enough free bytes, but the allocation still yielded nothing.
    AllocationFailed {
        window: WindowId,
        requested: u16,
        available: u16,
    },
    /// Mounting a received frame returned a length of zero.
    EmptyRxMount { window: WindowId },
}
