use bitfield_struct::bitfield;
use embassy_time::{Duration, Instant};
use macro_bits::{check_bit, serializable_enum};

use crate::{
    regs::{
        CompletionBit, HOST_INTR, HOST_INTR2, INTR2_RAW_ALL, INTR_INT2, RAW_STATUS_BUSY,
    },
    state::{OutOfBoundsMask, WindowStates},
    sync::InterruptGuard,
    Fault, HostInterface, WindowId,
};

serializable_enum! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    /// The value of the pool selector in the control word.
    pub enum PoolSelector: u8 {
        MacFrame => 0x0,
        MgmtPool => 0x1,
        DataPool => 0x2,
        ScratchPool => 0x3,
        StackMem => 0x4,
        Copy => 0x7
    }
}

/// The counterpart of a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pool {
    /// The MAC frame buffer. Received frames are mounted from here and frames to be sent are
    /// released into it.
    MacFrame,
    /// Management frame pool.
    MgmtPool,
    /// Data frame pool.
    DataPool,
    /// Static scratch memory.
    ScratchPool,
    /// Internal stack memory of the chip.
    StackMem,
    /// Another window.
    ///
    /// The move is issued on `dst`. The packed `(src << 4) | dst` ids are written to the `CTRL1`
    /// register of `dst` beforehand. This is the encoding chosen by this driver, the chip
    /// documentation doesn't specify where the ids go.
    Copy { src: WindowId, dst: WindowId },
}
impl Pool {
    pub const fn selector(&self) -> PoolSelector {
        match self {
            Self::MacFrame => PoolSelector::MacFrame,
            Self::MgmtPool => PoolSelector::MgmtPool,
            Self::DataPool => PoolSelector::DataPool,
            Self::ScratchPool => PoolSelector::ScratchPool,
            Self::StackMem => PoolSelector::StackMem,
            Self::Copy { .. } => PoolSelector::Copy,
        }
    }
}

/// The word written to `CTRL0`, which starts a move.
///
/// Sizes are limited to twelve bits by the hardware.
#[bitfield(u16)]
#[derive(PartialEq, Eq)]
pub struct RawControl {
    pub size_low: u8,
    #[bits(4)]
    pub size_high: u8,
    #[bits(3)]
    pub selector: u8,
    /// If set, the pool is mounted into the window, otherwise the window is released into the
    /// pool.
    pub mount_as_destination: bool,
}
impl RawControl {
    /// Assemble the control word for a move.
    pub fn for_move(pool: Pool, mount_as_destination: bool, size: u16) -> Self {
        Self::new()
            .with_size_low((size & 0xff) as u8)
            .with_size_high(((size >> 8) & 0x0f) as u8)
            .with_selector(pool.selector().into_bits())
            .with_mount_as_destination(mount_as_destination)
    }
    /// The size encoded in this control word.
    pub fn size(&self) -> u16 {
        ((self.size_high() as u16) << 8) | self.size_low() as u16
    }
}

/// Timing parameters of the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawConfig {
    /// How long to wait for the completion interrupt of a move.
    pub move_timeout: Duration,
    /// How long the status register may stay busy after setting an index.
    pub index_timeout: Duration,
    /// Delay between two polls of a status or interrupt register.
    pub poll_interval_us: u32,
}
impl Default for RawConfig {
    fn default() -> Self {
        Self {
            move_timeout: Duration::from_millis(20),
            index_timeout: Duration::from_millis(5),
            poll_interval_us: 10,
        }
    }
}

/// Poll `done` until it returns `true` or `timeout` elapsed.
///
/// Returns, whether `done` returned `true`.
fn poll_until<H: HostInterface>(
    host: &mut H,
    timeout: Duration,
    poll_interval_us: u32,
    mut done: impl FnMut(&mut H) -> bool,
) -> bool {
    let start_time: Instant = host.now();
    loop {
        if done(&mut *host) {
            return true;
        }
        if host.now().saturating_duration_since(start_time) > timeout {
            return false;
        }
        host.delay_us(poll_interval_us);
    }
}

/// Driver for the Random Access Windows of the MRF24WG.
pub struct Raw<H: HostInterface> {
    pub(crate) host: H,
    pub(crate) config: RawConfig,
    pub(crate) out_of_bounds: OutOfBoundsMask,
    pub(crate) window_states: WindowStates,
    pub(crate) scratch_len: Option<u16>,
}
impl<H: HostInterface> Raw<H> {
    /// Create a new driver.
    ///
    /// This doesn't touch the hardware. Call [Raw::init] before using any windows.
    pub fn new(host: H, config: RawConfig) -> Self {
        Self {
            host,
            config,
            out_of_bounds: OutOfBoundsMask::new(),
            window_states: WindowStates::new(),
            scratch_len: None,
        }
    }
    pub fn host(&self) -> &H {
        &self.host
    }
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
    pub fn config(&self) -> &RawConfig {
        &self.config
    }

    /// Clear a stale completion bit of `window`, so it isn't mistaken for the completion of
    /// the next move.
    fn clear_move_complete(host: &mut H, window: WindowId) {
        match window.registers().completion {
            CompletionBit::Intr(mask) => host.write_u8(HOST_INTR, mask),
            CompletionBit::Intr2(mask) => host.write_u16(HOST_INTR2, mask),
        }
    }
    /// Wait for the completion interrupt of a move on `window`.
    ///
    /// Returns `false`, if the move didn't complete in time.
    fn wait_for_move_complete(host: &mut H, window: WindowId, config: &RawConfig) -> bool {
        let completion = window.registers().completion;
        let completed = poll_until(host, config.move_timeout, config.poll_interval_us, |host| {
            let intr = host.read_u8(HOST_INTR);
            match completion {
                CompletionBit::Intr(mask) => check_bit!(intr, mask),
                // INT2 only says, that some bit in HOST_INTR2 is set. A leftover bit of another
                // window must not count as our completion.
                CompletionBit::Intr2(mask) => {
                    check_bit!(intr, INTR_INT2) && check_bit!(host.read_u16(HOST_INTR2), mask)
                }
            }
        });
        if completed {
            match completion {
                CompletionBit::Intr(mask) => host.write_u8(HOST_INTR, mask),
                CompletionBit::Intr2(_) => {
                    host.write_u16(HOST_INTR2, INTR2_RAW_ALL);
                    host.write_u8(HOST_INTR, INTR_INT2);
                }
            }
        }
        completed
    }
    /// Perform a move and wait for it to complete.
    ///
    /// Returns the number of bytes mounted into the window. This is only meaningful for moves,
    /// which mount something. If the move timed out, the byte count can't be trusted.
    ///
    /// For [Pool::Copy], the move is issued on the destination window and `window` is ignored.
    pub fn raw_move(
        &mut self,
        window: WindowId,
        pool: Pool,
        mount_as_destination: bool,
        size: u16,
    ) -> u16 {
        let window = match pool {
            Pool::Copy { dst, .. } => dst,
            _ => window,
        };
        let registers = window.registers();
        let control = RawControl::for_move(pool, mount_as_destination, size);
        trace!(
            "Moving {:?} on window {}, control word {:x}.",
            pool,
            window.id(),
            control.into_bits()
        );

        let mut host = InterruptGuard::new(&mut self.host);
        Self::clear_move_complete(&mut host, window);
        if let Pool::Copy { src, dst } = pool {
            host.write_u16(registers.ctrl1, ((src.id() as u16) << 4) | dst.id() as u16);
        }
        host.write_u16(registers.ctrl0, control.into_bits());

        // The completion edge is only latched, while the interrupt is enabled.
        host.enable();
        let completed = Self::wait_for_move_complete(&mut host, window, &self.config);
        let byte_count = host.read_u16(registers.ctrl1);
        if !completed {
            warn!(
                "Timeout waiting for move completion on window {}.",
                window.id()
            );
            host.report_fault(Fault::MoveTimeout { window });
        }
        byte_count
    }

    /// Set the cursor of `window` to `index`.
    ///
    /// Setting the index past the end of the window is allowed. The window is then flagged as
    /// out of bounds, until the index is set successfully again.
    pub fn set_index(&mut self, window: WindowId, index: u16) {
        let registers = window.registers();
        self.host.write_u16(registers.index, index);

        let in_bounds = poll_until(
            &mut self.host,
            self.config.index_timeout,
            self.config.poll_interval_us,
            |host| host.read_u16(registers.status) & RAW_STATUS_BUSY == 0,
        );
        if in_bounds {
            self.out_of_bounds.clear(window);
        } else {
            self.out_of_bounds.set(window);
            warn!(
                "Index {} is out of bounds for window {}.",
                index,
                window.id()
            );
            self.host.report_fault(Fault::IndexOutOfBounds { window, index });
        }
    }
    /// Check if the last index set on `window` was past its end.
    pub fn is_index_out_of_bounds(&self, window: WindowId) -> bool {
        self.out_of_bounds.is_set(window)
    }
    pub fn out_of_bounds_mask(&self) -> OutOfBoundsMask {
        self.out_of_bounds
    }
    fn check_access(&mut self, window: WindowId) {
        if self.out_of_bounds.is_set(window) {
            warn!("Accessing window {} out of bounds.", window.id());
            self.host.report_fault(Fault::OutOfBoundsAccess { window });
        }
    }

    /// Read `buffer.len()` bytes from the cursor of `window`.
    pub fn read_bytes(&mut self, window: WindowId, buffer: &mut [u8]) {
        self.check_access(window);
        self.host.read_array(window.registers().data, buffer);
    }
    /// Write `buffer` at the cursor of `window`.
    pub fn write_bytes(&mut self, window: WindowId, buffer: &[u8]) {
        self.check_access(window);
        self.host.write_array(window.registers().data, buffer);
    }
    /// Read `buffer.len()` bytes from `window`, starting at `index`.
    pub fn read_at(&mut self, window: WindowId, index: u16, buffer: &mut [u8]) {
        self.set_index(window, index);
        self.read_bytes(window, buffer);
    }
    /// Write `buffer` to `window`, starting at `index`.
    pub fn write_at(&mut self, window: WindowId, index: u16, buffer: &[u8]) {
        self.set_index(window, index);
        self.write_bytes(window, buffer);
    }
}
