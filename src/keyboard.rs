pub const KEY_COUNT: usize = 16;

/// The 16-key hex keypad latch. Written by the host, read by the interpreter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keyboard {
    keys: [bool; KEY_COUNT],
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }

    /// Keys above 0xF do not exist and are ignored.
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        match self.keys.get_mut(key as usize) {
            Some(slot) => *slot = pressed,
            None => log::warn!("ignoring state for nonexistent key {key:#X}"),
        }
    }

    pub fn press(&mut self, key: u8) {
        self.set_key(key, true);
    }

    pub fn release(&mut self, key: u8) {
        self.set_key(key, false);
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&k| k).map(|k| k as u8)
    }
}
