//! Buffer allocation on top of the windows.
//!
//! The windows are statically assigned to their roles, see the constants on [WindowId].

use crate::{
    regs::{FIFO_BCNT_MASK, WFIFO_BCNT0, WFIFO_BCNT1},
    state::{DataWindow, WindowState},
    Fault, HostInterface, Pool, Raw, RawError, RawResult, WindowId,
};

impl<H: HostInterface> Raw<H> {
    /// Initialize the RAW windows.
    ///
    /// After reset, the firmware mounts scratch to the data tx window. This releases it again
    /// and permanently mounts scratch to [WindowId::SCRATCH] instead.
    ///
    /// Returns the size of the scratch memory.
    pub fn init(&mut self) -> u16 {
        debug!("Initializing RAW windows.");
        self.unmount_scratch(DataWindow::Tx.window());
        let scratch_len = self.mount_scratch(WindowId::SCRATCH);
        self.scratch_len = Some(scratch_len);

        self.window_states.set(DataWindow::Tx, WindowState::Unmounted);
        self.window_states.set(DataWindow::Rx, WindowState::Unmounted);
        debug!("Scratch is {} bytes.", scratch_len);
        scratch_len
    }
    /// The size of the scratch memory, as reported by [Raw::init].
    pub fn scratch_len(&self) -> Option<u16> {
        self.scratch_len
    }
    /// Mount the scratch memory to `window`.
    ///
    /// Scratch is static memory, so its content is retained across mounts. Returns the size
    /// of the scratch memory.
    pub fn mount_scratch(&mut self, window: WindowId) -> u16 {
        self.raw_move(window, Pool::ScratchPool, true, 0)
    }
    /// Unmount the scratch memory from `window`.
    pub fn unmount_scratch(&mut self, window: WindowId) {
        self.raw_move(window, Pool::ScratchPool, false, 0);
    }

    /// Check the pool behind `register` for `bytes_needed` free bytes and allocate them into
    /// `window`.
    fn allocate_tx_buffer(
        &mut self,
        window: WindowId,
        pool: Pool,
        register: u8,
        bytes_needed: u16,
    ) -> RawResult<()> {
        let available = self.host.read_u16(register) & FIFO_BCNT_MASK;
        if available < bytes_needed {
            return Err(RawError::InsufficientPoolMemory {
                available,
                needed: bytes_needed,
            });
        }
        if self.raw_move(window, pool, true, bytes_needed) == 0 {
            error!(
                "Failed to allocate {} of {} free bytes to window {}.",
                bytes_needed,
                available,
                window.id()
            );
            self.host.report_fault(Fault::AllocationFailed {
                window,
                requested: bytes_needed,
                available,
            });
            // Whatever the hardware did mount into the window is returned to the pool.
            self.raw_move(window, pool, false, 0);
            return Err(RawError::AllocationFailed { window });
        }
        self.out_of_bounds.clear(window);
        Ok(())
    }
    /// Allocate a buffer of `bytes_needed` bytes for a management frame in
    /// [WindowId::MGMT_TX].
    pub fn allocate_mgmt_tx_buffer(&mut self, bytes_needed: u16) -> RawResult<()> {
        self.allocate_tx_buffer(WindowId::MGMT_TX, Pool::MgmtPool, WFIFO_BCNT1, bytes_needed)
    }
    /// Allocate a buffer of `bytes_needed` bytes for a data frame in [WindowId::DATA_TX].
    ///
    /// On success, the data tx window is marked as mounted.
    pub fn allocate_data_tx_buffer(&mut self, bytes_needed: u16) -> RawResult<()> {
        self.allocate_tx_buffer(
            DataWindow::Tx.window(),
            Pool::DataPool,
            WFIFO_BCNT0,
            bytes_needed,
        )?;
        self.window_states.set(DataWindow::Tx, WindowState::Mounted);
        Ok(())
    }
    /// Release the management tx buffer without sending it.
    pub fn deallocate_mgmt_tx_buffer(&mut self) {
        self.raw_move(WindowId::MGMT_TX, Pool::MgmtPool, false, 0);
    }
    /// Release the data tx buffer without sending it.
    pub fn deallocate_data_tx_buffer(&mut self) {
        self.window_states.set(DataWindow::Tx, WindowState::Unmounted);
        self.raw_move(DataWindow::Tx.window(), Pool::DataPool, false, 0);
    }
    /// Release the received management frame, once it's been processed.
    pub fn deallocate_mgmt_rx_buffer(&mut self) {
        self.raw_move(WindowId::MGMT_RX, Pool::MgmtPool, false, 0);
    }
    /// Release the received data frame, once it's been processed.
    pub fn deallocate_data_rx_buffer(&mut self) {
        self.window_states.set(DataWindow::Rx, WindowState::Unmounted);
        self.raw_move(DataWindow::Rx.window(), Pool::DataPool, false, 0);
    }
    /// Mount the most recently received frame into `window`.
    ///
    /// This should only be called after the chip signalled a received frame. Returns the
    /// length of the frame.
    pub fn mount_rx_buffer(&mut self, window: WindowId) -> u16 {
        let length = self.raw_move(window, Pool::MacFrame, true, 0);
        if length == 0 {
            error!("Mounting rx frame to window {} failed.", window.id());
            self.host.report_fault(Fault::EmptyRxMount { window });
        }
        if window == DataWindow::Rx.window() {
            self.window_states.set(DataWindow::Rx, WindowState::Mounted);
        }
        length
    }
    /// Hand the management frame in [WindowId::MGMT_TX] to the chip for transmission.
    ///
    /// The frame, including its management header, must already be written to the window.
    pub fn send_management_frame(&mut self, length: u16) {
        self.raw_move(WindowId::MGMT_TX, Pool::MacFrame, false, length);
    }
    /// Hand the data frame in [WindowId::DATA_TX] to the chip for transmission.
    ///
    /// The buffer is owned by the chip afterwards, so the data tx window becomes unmounted.
    pub fn send_data_frame(&mut self, length: u16) {
        self.raw_move(DataWindow::Tx.window(), Pool::MacFrame, false, length);
        self.window_states.set(DataWindow::Tx, WindowState::Unmounted);
    }
    /// Copy `length` bytes from the window `src` into the window `dst`.
    ///
    /// Returns the amount of bytes copied.
    pub fn copy_window(&mut self, src: WindowId, dst: WindowId, length: u16) -> u16 {
        self.raw_move(dst, Pool::Copy { src, dst }, true, length)
    }
    /// Get the mount state of a data window.
    pub fn data_window_state(&self, window: DataWindow) -> WindowState {
        self.window_states.get(window)
    }
}
