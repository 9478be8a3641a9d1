use macro_bits::{bit, check_bit, serializable_enum};

use crate::WindowId;

/// Tracks which windows had their index set past the end of the window.
///
/// This is purely advisory. The hardware allows such an index, as long as nothing is read or
/// written there.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutOfBoundsMask(u8);
impl OutOfBoundsMask {
    pub const fn new() -> Self {
        Self(0)
    }
    pub fn set(&mut self, window: WindowId) {
        self.0 |= bit!(window.id());
    }
    pub fn clear(&mut self, window: WindowId) {
        self.0 &= !bit!(window.id());
    }
    pub fn is_set(&self, window: WindowId) -> bool {
        check_bit!(self.0, bit!(window.id()))
    }
    /// The raw mask, with bit `n` belonging to window `n`.
    pub const fn bits(&self) -> u8 {
        self.0
    }
}

serializable_enum! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    /// Whether a data window currently holds a frame.
    pub enum WindowState: u8 {
        #[default]
        Unmounted => 0x00,
        Mounted => 0x01
    }
}
#[cfg(feature = "defmt")]
impl defmt::Format for WindowState {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.into_bits())
    }
}

/// The two data windows, for which the mount state is tracked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataWindow {
    Rx,
    Tx,
}
impl DataWindow {
    /// The window backing this data window.
    pub const fn window(self) -> WindowId {
        match self {
            Self::Rx => WindowId::DATA_RX,
            Self::Tx => WindowId::DATA_TX,
        }
    }
    const fn slot(self) -> usize {
        match self {
            Self::Rx => 0,
            Self::Tx => 1,
        }
    }
}

/// Mount state of the data rx and tx windows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowStates([WindowState; 2]);
impl WindowStates {
    pub const fn new() -> Self {
        Self([WindowState::Unmounted; 2])
    }
    pub fn get(&self, window: DataWindow) -> WindowState {
        self.0[window.slot()]
    }
    pub(crate) fn set(&mut self, window: DataWindow, state: WindowState) {
        self.0[window.slot()] = state;
    }
}
