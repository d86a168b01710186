use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Key bindings and input polling
// ---------------------------------------------------------------------------

/// Keys the rocket can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    Q,
    E,
    R,
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Polled keyboard state, provided by whatever owns the real input device.
pub trait InputSource {
    /// Key is down this frame.
    fn held(&self, key: Key) -> bool;

    /// Key went down this frame.
    fn pressed(&self, key: Key) -> bool;

    /// Key went up this frame.
    fn released(&self, key: Key) -> bool;
}

/// Frame-edge tracking input state.
///
/// Call [`InputState::end_frame`] once per rendered frame so that
/// `pressed` / `released` only report transitions for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    current: u32,
    previous: u32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.current |= key.bit();
    }

    pub fn release(&mut self, key: Key) {
        self.current &= !key.bit();
    }

    pub fn set(&mut self, key: Key, down: bool) {
        if down {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    pub fn end_frame(&mut self) {
        self.previous = self.current;
    }
}

impl InputSource for InputState {
    fn held(&self, key: Key) -> bool {
        self.current & key.bit() != 0
    }

    fn pressed(&self, key: Key) -> bool {
        self.held(key) && self.previous & key.bit() == 0
    }

    fn released(&self, key: Key) -> bool {
        !self.held(key) && self.previous & key.bit() != 0
    }
}
