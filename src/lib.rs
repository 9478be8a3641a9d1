//! # `mrf24-raw`
//! This is a driver for the Random Access Windows (RAW) of the MRF24WG Wi-Fi module.
//! It implements the windowing and buffer management, which the MAC layer builds upon to
//! exchange frames with the module.
//! ## Hardware overview
//! This chapter will give a short overview of how the host accesses the memory of the module.
//!
//! ### Windows
//! The host can't address the RAM of the module directly. Instead there are six windows, which
//! are small apertures, that can be mounted onto a region of the memory on the chip. Each
//! window consists of five registers: An index register, which moves the cursor inside the
//! window, a status register, which indicates if the index is still being updated, two control
//! registers and a data register. Reading or writing the data register accesses the byte at the
//! cursor and advances it. The windows are statically assigned to their roles, see
//! [WindowId].
//!
//! ### Moves
//! What's mounted in a window is changed by a move. A control word, holding the pool, the
//! direction and a size, is written to `CTRL0`, which makes the module mount a pool segment into
//! the window or release the window back into the pool. Once the move is done, the module
//! raises the completion interrupt of that window and reports the amount of bytes mounted in
//! `CTRL1`. The completion bits of the data windows live in the 8-bit host interrupt register,
//! all others in the 16-bit second level one.
//! The interrupt line is edge-triggered and the completion is only latched, while it's enabled.
//! We therefore enable it for the duration of every move and restore the previous state
//! afterwards, see [InterruptGuard].
//!
//! ### Pools
//! Frames to be transmitted are allocated from the management or data pool, after checking
//! the free bytes count of that pool. Received frames are mounted from the MAC frame buffer.
//! Scratch memory is static memory, which is permanently mounted into its own window.
//!
//! ### Faults
//! The module is a remote peripheral, which sometimes is slow to respond. None of the faults
//! the driver detects are fatal. Timeouts are logged and forwarded to
//! [HostInterface::report_fault], but the operation carries on with whatever the hardware
//! reported.

#![cfg_attr(not(test), no_std)]
pub(crate) mod fmt;

mod host;
mod pool;
mod raw;
pub mod regs;
mod state;
mod sync;

pub use host::{Fault, HostInterface};
pub use raw::{Pool, PoolSelector, Raw, RawConfig, RawControl};
pub use regs::WindowId;
pub use state::{DataWindow, OutOfBoundsMask, WindowState, WindowStates};
pub use sync::InterruptGuard;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RawError {
    /// There is no window with that id.
    InvalidWindow(u8),
    /// The pool doesn't have enough free bytes for the allocation.
    InsufficientPoolMemory { available: u16, needed: u16 },
    /// The pool had enough free bytes, but the hardware didn't allocate anything.
    AllocationFailed { window: WindowId },
}

pub type RawResult<T> = Result<T, RawError>;
