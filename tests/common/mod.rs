#![allow(dead_code)]
//! A simulated MRF24WG, which models the RAW registers closely enough to drive the driver.

use std::collections::VecDeque;

use embassy_time::Instant;
use mrf24_raw::{
    regs::{
        CompletionBit, HOST_INTR, HOST_INTR2, INTR_INT2, RAW_STATUS_BUSY, WFIFO_BCNT0,
        WFIFO_BCNT1, WINDOW_COUNT,
    },
    Fault, HostInterface, PoolSelector, Raw, RawConfig, RawControl, WindowId,
};

pub const SCRATCH_LEN: usize = 400;
/// Garbage in the upper nibble of the FIFO byte count registers.
const FIFO_JUNK: u16 = 0xa000;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Mount {
    #[default]
    None,
    /// A segment allocated from the management or data pool.
    Pool { selector: u8, data: Vec<u8> },
    /// A frame mounted from the MAC frame buffer.
    Frame(Vec<u8>),
    Scratch,
}

#[derive(Clone, Debug, Default)]
pub struct SimWindow {
    pub mount: Mount,
    pub cursor: usize,
    pub index_busy: bool,
    pub ctrl1: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub window: WindowId,
    pub control: RawControl,
}
impl MoveRecord {
    pub fn is_allocation(&self) -> bool {
        let selector = self.control.selector();
        self.control.mount_as_destination()
            && (selector == PoolSelector::MgmtPool.into_bits()
                || selector == PoolSelector::DataPool.into_bits())
    }
    pub fn is_release(&self) -> bool {
        !self.control.mount_as_destination()
    }
}

pub struct SimChip {
    pub windows: [SimWindow; WINDOW_COUNT],
    pub scratch: Vec<u8>,
    pub mgmt_free: u16,
    pub data_free: u16,
    pub rx_queue: VecDeque<Vec<u8>>,
    pub sent: Vec<(WindowId, Vec<u8>)>,
    pub moves: Vec<MoveRecord>,
    pub faults: Vec<Fault>,
    /// Moves, which completed, but haven't been latched by an enabled interrupt yet.
    pending_completions: Vec<WindowId>,
    pub intr: u8,
    pub intr2: u16,
    pub interrupts_enabled: bool,
    pub now_us: u64,
    /// Never signal completion of a move.
    pub stall_moves: bool,
    /// Allocations from a pool yield no bytes, even if there's enough space.
    pub fail_allocations: bool,
}
impl SimChip {
    pub fn new() -> Self {
        let mut windows: [SimWindow; WINDOW_COUNT] = Default::default();
        // The firmware mounts scratch to RAW 1 after reset.
        windows[1].mount = Mount::Scratch;
        Self {
            windows,
            scratch: vec![0; SCRATCH_LEN],
            mgmt_free: 1024,
            data_free: 2048,
            rx_queue: VecDeque::new(),
            sent: Vec::new(),
            moves: Vec::new(),
            faults: Vec::new(),
            pending_completions: Vec::new(),
            intr: 0,
            intr2: 0,
            interrupts_enabled: false,
            now_us: 0,
            stall_moves: false,
            fail_allocations: false,
        }
    }
    pub fn window(&self, window: WindowId) -> &SimWindow {
        &self.windows[window.id() as usize]
    }
    pub fn allocations(&self) -> impl Iterator<Item = &MoveRecord> {
        self.moves.iter().filter(|record| record.is_allocation())
    }
    fn window_data(&self, window: usize) -> &[u8] {
        match &self.windows[window].mount {
            Mount::None => &[],
            Mount::Pool { data, .. } | Mount::Frame(data) => data,
            Mount::Scratch => &self.scratch,
        }
    }
    fn window_data_mut(&mut self, window: usize) -> &mut [u8] {
        match &mut self.windows[window].mount {
            Mount::None => &mut [],
            Mount::Pool { data, .. } | Mount::Frame(data) => data,
            Mount::Scratch => &mut self.scratch,
        }
    }
    fn free_bytes(&mut self, selector: u8) -> &mut u16 {
        if selector == PoolSelector::MgmtPool.into_bits() {
            &mut self.mgmt_free
        } else {
            &mut self.data_free
        }
    }
    fn release(&mut self, window: usize) {
        if let Mount::Pool { selector, data } = core::mem::take(&mut self.windows[window].mount)
        {
            *self.free_bytes(selector) += data.len() as u16;
        }
    }
    /// Carry out a move, as the firmware would.
    fn perform_move(&mut self, window: usize, control: RawControl) {
        let size = control.size() as usize;
        let dest = control.mount_as_destination();
        let selector = control.selector();
        let count = if selector == PoolSelector::MacFrame.into_bits() {
            if dest {
                let frame = self.rx_queue.pop_front().unwrap_or_default();
                let length = frame.len();
                self.windows[window].mount = Mount::Frame(frame);
                length
            } else {
                let data = self.window_data(window);
                let frame = data[..size.min(data.len())].to_vec();
                self.sent.push((WindowId::new(window as u8).unwrap(), frame));
                self.release(window);
                self.windows[window].mount = Mount::None;
                0
            }
        } else if selector == PoolSelector::MgmtPool.into_bits()
            || selector == PoolSelector::DataPool.into_bits()
        {
            if dest {
                let free = *self.free_bytes(selector) as usize;
                if size <= free && !self.fail_allocations {
                    *self.free_bytes(selector) -= size as u16;
                    self.windows[window].mount = Mount::Pool {
                        selector,
                        data: vec![0; size],
                    };
                    size
                } else {
                    0
                }
            } else {
                self.release(window);
                self.windows[window].mount = Mount::None;
                0
            }
        } else if selector == PoolSelector::ScratchPool.into_bits() {
            if dest {
                self.windows[window].mount = Mount::Scratch;
                self.scratch.len()
            } else {
                if self.windows[window].mount == Mount::Scratch {
                    self.windows[window].mount = Mount::None;
                }
                0
            }
        } else if selector == PoolSelector::Copy.into_bits() {
            let src = (self.windows[window].ctrl1 >> 4) as usize & 0xf;
            assert_eq!(
                self.windows[window].ctrl1 as usize & 0xf,
                window,
                "copy issued on a window other than the destination"
            );
            let copied = self.window_data(src)[..size.min(self.window_data(src).len())].to_vec();
            let dst = self.window_data_mut(window);
            let length = copied.len().min(dst.len());
            dst[..length].copy_from_slice(&copied[..length]);
            length
        } else {
            0
        };
        let sim_window = &mut self.windows[window];
        sim_window.ctrl1 = count as u16;
        sim_window.cursor = 0;
        sim_window.index_busy = false;
        if !self.stall_moves {
            self.pending_completions.push(WindowId::new(window as u8).unwrap());
        }
    }
    fn latch_completions(&mut self) {
        if !self.interrupts_enabled {
            return;
        }
        for window in self.pending_completions.drain(..) {
            match window.registers().completion {
                CompletionBit::Intr(mask) => self.intr |= mask,
                CompletionBit::Intr2(mask) => self.intr2 |= mask,
            }
        }
    }
    fn find_window(&self, register: u8, select: impl Fn(WindowId) -> u8) -> Option<usize> {
        WindowId::all()
            .position(|window| select(window) == register)
    }
}
impl HostInterface for SimChip {
    fn read_u8(&mut self, register: u8) -> u8 {
        assert_eq!(register, HOST_INTR, "unexpected 8-bit read");
        self.latch_completions();
        if self.intr2 != 0 {
            self.intr | INTR_INT2
        } else {
            self.intr
        }
    }
    fn write_u8(&mut self, register: u8, value: u8) {
        assert_eq!(register, HOST_INTR, "unexpected 8-bit write");
        self.intr &= !value;
    }
    fn read_u16(&mut self, register: u8) -> u16 {
        match register {
            WFIFO_BCNT0 => FIFO_JUNK | self.data_free,
            WFIFO_BCNT1 => FIFO_JUNK | self.mgmt_free,
            HOST_INTR2 => {
                self.latch_completions();
                self.intr2
            }
            _ => {
                if let Some(window) = self.find_window(register, |w| w.registers().ctrl1) {
                    self.windows[window].ctrl1
                } else if let Some(window) = self.find_window(register, |w| w.registers().status)
                {
                    if self.windows[window].index_busy {
                        RAW_STATUS_BUSY
                    } else {
                        0
                    }
                } else {
                    panic!("unexpected 16-bit read of {register:#x}")
                }
            }
        }
    }
    fn write_u16(&mut self, register: u8, value: u16) {
        if register == HOST_INTR2 {
            self.intr2 &= !value;
        } else if let Some(window) = self.find_window(register, |w| w.registers().ctrl0) {
            let control = RawControl::from_bits(value);
            self.moves.push(MoveRecord {
                window: WindowId::new(window as u8).unwrap(),
                control,
            });
            self.perform_move(window, control);
        } else if let Some(window) = self.find_window(register, |w| w.registers().ctrl1) {
            self.windows[window].ctrl1 = value;
        } else if let Some(window) = self.find_window(register, |w| w.registers().index) {
            let capacity = self.window_data(window).len();
            let sim_window = &mut self.windows[window];
            sim_window.cursor = value as usize;
            sim_window.index_busy = value as usize > capacity;
        } else {
            panic!("unexpected 16-bit write of {register:#x}")
        }
    }
    fn read_array(&mut self, register: u8, buffer: &mut [u8]) {
        let window = self
            .find_window(register, |w| w.registers().data)
            .expect("bulk read from a non data register");
        let cursor = self.windows[window].cursor;
        let data = self.window_data(window);
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = data.get(cursor + i).copied().unwrap_or(0xff);
        }
        self.windows[window].cursor += buffer.len();
    }
    fn write_array(&mut self, register: u8, buffer: &[u8]) {
        let window = self
            .find_window(register, |w| w.registers().data)
            .expect("bulk write to a non data register");
        let cursor = self.windows[window].cursor;
        let data = self.window_data_mut(window);
        for (i, byte) in buffer.iter().enumerate() {
            if let Some(target) = data.get_mut(cursor + i) {
                *target = *byte;
            }
        }
        self.windows[window].cursor += buffer.len();
    }
    fn now(&mut self) -> Instant {
        Instant::from_micros(self.now_us)
    }
    fn delay_us(&mut self, us: u32) {
        self.now_us += us as u64;
    }
    fn enable_interrupts(&mut self) -> bool {
        core::mem::replace(&mut self.interrupts_enabled, true)
    }
    fn disable_interrupts(&mut self) -> bool {
        core::mem::replace(&mut self.interrupts_enabled, false)
    }
    fn report_fault(&mut self, fault: Fault) {
        self.faults.push(fault);
    }
}

/// A driver on top of a freshly reset [SimChip].
pub fn driver() -> Raw<SimChip> {
    Raw::new(SimChip::new(), RawConfig::default())
}
/// A driver, on which [Raw::init] was already called.
pub fn initialized_driver() -> Raw<SimChip> {
    let mut raw = driver();
    raw.init();
    raw.host_mut().moves.clear();
    raw
}
