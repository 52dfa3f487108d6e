//! Press/release detection over polled button snapshots.

use mprofile_traits::InputSource;

/// Snapshot slots; index is the 1-based button id, slot 0 is unused.
pub const MAX_BUTTONS: usize = 12;

/// Button states for one cycle, indexed by button id.
pub type ButtonSnapshot = [bool; MAX_BUTTONS];

/// True when `id` went from released to pressed. Out-of-range ids never fire.
#[inline]
pub fn rising_edge(current: &ButtonSnapshot, previous: &ButtonSnapshot, id: usize) -> bool {
    matches!((current.get(id), previous.get(id)), (Some(true), Some(false)))
}

/// True when `id` went from pressed to released.
#[inline]
pub fn falling_edge(current: &ButtonSnapshot, previous: &ButtonSnapshot, id: usize) -> bool {
    matches!((current.get(id), previous.get(id)), (Some(false), Some(true)))
}

/// Sample every button id once.
pub fn read_snapshot<I: InputSource + ?Sized>(input: &mut I) -> ButtonSnapshot {
    let mut snap = [false; MAX_BUTTONS];
    for (id, slot) in snap.iter_mut().enumerate().skip(1) {
        *slot = input.raw_button(id);
    }
    snap
}

/// Owns the previous snapshot and answers edge queries against it.
///
/// Query edges for the current cycle first, then [`ButtonEdges::commit`] the
/// snapshot so the next cycle compares against it.
#[derive(Debug, Clone, Default)]
pub struct ButtonEdges {
    previous: ButtonSnapshot,
}

impl ButtonEdges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rising(&self, current: &ButtonSnapshot, id: usize) -> bool {
        rising_edge(current, &self.previous, id)
    }

    pub fn falling(&self, current: &ButtonSnapshot, id: usize) -> bool {
        falling_edge(current, &self.previous, id)
    }

    pub fn commit(&mut self, current: ButtonSnapshot) {
        self.previous = current;
    }

    pub const fn previous(&self) -> &ButtonSnapshot {
        &self.previous
    }
}
