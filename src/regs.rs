//! Host register layout of the MRF24WG.
//!
//! Everything in here is fixed by the chip. The addresses are the ones the host uses on the
//! SPI bus, not chip memory addresses.

use macro_bits::bit;

use crate::{RawError, RawResult};

/// 8-bit first level host interrupt register.
pub const HOST_INTR: u8 = 0x01;
/// 16-bit second level host interrupt register.
pub const HOST_INTR2: u8 = 0x2d;
/// 16-bit register holding the free bytes in the data tx pool.
pub const WFIFO_BCNT0: u8 = 0x2e;
/// 16-bit register holding the free bytes in the management tx pool.
pub const WFIFO_BCNT1: u8 = 0x2f;
/// Only the lower twelve bits of the FIFO byte count registers are valid.
pub const FIFO_BCNT_MASK: u16 = 0x0fff;

/// Set in [HOST_INTR], when any interrupt in [HOST_INTR2] is pending.
pub const INTR_INT2: u8 = bit!(0);
pub const INTR_RAW0: u8 = bit!(1);
pub const INTR_RAW1: u8 = bit!(2);
pub const INTR2_RAW4: u16 = bit!(2);
pub const INTR2_RAW5: u16 = bit!(3);
pub const INTR2_RAW2: u16 = bit!(4);
pub const INTR2_RAW3: u16 = bit!(5);
/// All RAW completion bits living in [HOST_INTR2].
pub const INTR2_RAW_ALL: u16 = INTR2_RAW2 | INTR2_RAW3 | INTR2_RAW4 | INTR2_RAW5;

/// Set in a window's status register, while an index update is in progress.
pub const RAW_STATUS_BUSY: u16 = bit!(0);

/// The number of RAW windows.
pub const WINDOW_COUNT: usize = 6;

/// Identifies one of the six RAW windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowId(u8);
impl WindowId {
    /// Window used for received data frames.
    pub const DATA_RX: Self = Self(0);
    /// Window used for data frames being assembled for transmission.
    pub const DATA_TX: Self = Self(1);
    /// Window used for received management frames.
    pub const MGMT_RX: Self = Self(2);
    /// Window used for management frames being assembled for transmission.
    pub const MGMT_TX: Self = Self(3);
    /// Window the scratch memory is permanently mounted to.
    pub const SCRATCH: Self = Self(4);
    /// Unassigned window.
    pub const SPARE: Self = Self(5);

    /// Returns the [WindowId] for `id`, if it names an existing window.
    pub const fn new(id: u8) -> RawResult<Self> {
        if (id as usize) < WINDOW_COUNT {
            Ok(Self(id))
        } else {
            Err(RawError::InvalidWindow(id))
        }
    }
    /// The raw id of the window.
    pub const fn id(self) -> u8 {
        self.0
    }
    /// Iterate over all windows.
    pub fn all() -> impl Iterator<Item = WindowId> {
        (0..WINDOW_COUNT as u8).map(Self)
    }
    /// Returns the registers of this window.
    pub fn registers(self) -> &'static WindowRegisters {
        &WINDOW_REGISTERS[self.0 as usize]
    }
    /// Data windows signal completion in [HOST_INTR], all others in [HOST_INTR2].
    pub const fn completes_in_intr(self) -> bool {
        self.0 <= 1
    }
}
impl TryFrom<u8> for WindowId {
    type Error = RawError;
    fn try_from(id: u8) -> RawResult<Self> {
        Self::new(id)
    }
}

/// Where a window signals, that a move has completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionBit {
    /// A bit in the 8-bit [HOST_INTR] register.
    Intr(u8),
    /// A bit in the 16-bit [HOST_INTR2] register.
    Intr2(u16),
}

/// The register set of a single window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowRegisters {
    /// Write only. Moves the cursor of the window.
    pub index: u8,
    /// Bit 0 is set, while the index is being updated.
    pub status: u8,
    /// Writing a control word starts a move.
    pub ctrl0: u8,
    /// Holds the amount of bytes mounted after a move.
    pub ctrl1: u8,
    /// Reading or writing this register accesses the byte at the cursor and advances it.
    pub data: u8,
    pub completion: CompletionBit,
}

static WINDOW_REGISTERS: [WindowRegisters; WINDOW_COUNT] = [
    WindowRegisters {
        index: 0x27,
        status: 0x28,
        ctrl0: 0x25,
        ctrl1: 0x26,
        data: 0x20,
        completion: CompletionBit::Intr(INTR_RAW0),
    },
    WindowRegisters {
        index: 0x2b,
        status: 0x2c,
        ctrl0: 0x29,
        ctrl1: 0x2a,
        data: 0x21,
        completion: CompletionBit::Intr(INTR_RAW1),
    },
    WindowRegisters {
        index: 0x1a,
        status: 0x1b,
        ctrl0: 0x18,
        ctrl1: 0x19,
        data: 0x06,
        completion: CompletionBit::Intr2(INTR2_RAW2),
    },
    WindowRegisters {
        index: 0x1e,
        status: 0x1f,
        ctrl0: 0x1c,
        ctrl1: 0x1d,
        data: 0x07,
        completion: CompletionBit::Intr2(INTR2_RAW3),
    },
    WindowRegisters {
        index: 0x0c,
        status: 0x0d,
        ctrl0: 0x0a,
        ctrl1: 0x0b,
        data: 0x08,
        completion: CompletionBit::Intr2(INTR2_RAW4),
    },
    WindowRegisters {
        index: 0x22,
        status: 0x23,
        ctrl0: 0x0e,
        ctrl1: 0x0f,
        data: 0x09,
        completion: CompletionBit::Intr2(INTR2_RAW5),
    },
];
