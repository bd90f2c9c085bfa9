use chipvm::{
    display::{HEIGHT, WIDTH},
    keyboard::Keyboard,
};
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

const OFF: u32 = 0x00_00_00;
const ON: u32 = 0x00_7F_FF;

/// The minifb window the frame buffer is shown in, and the source of keypad input.
pub struct Screen {
    pixel_buffer: Vec<u32>,
    window: Window,
}

impl Screen {
    pub fn new(scale: Scale) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "chipvm - ESC to exit",
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )?;
        window.set_position(500, 300);
        // the host loop paces itself
        window.limit_update_rate(None);
        Ok(Self {
            pixel_buffer: vec![OFF; WIDTH * HEIGHT],
            window,
        })
    }

    pub fn is_running(&self) -> bool {
        self.window.is_open() && !self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
    }

    pub fn present(&mut self, frame: &[u8]) -> Result<(), minifb::Error> {
        for (pixel, &bit) in self.pixel_buffer.iter_mut().zip(frame) {
            *pixel = if bit == 0 { OFF } else { ON };
        }
        self.window
            .update_with_buffer(&self.pixel_buffer, WIDTH, HEIGHT)
    }

    /// Processes window events without redrawing.
    pub fn pump(&mut self) {
        self.window.update();
    }

    /// Rewrites the latch from the keys held right now.
    pub fn read_keys(&self, keys: &mut Keyboard) {
        keys.release_all();
        for key in self.window.get_keys() {
            if let Some(n) = key_to_num(key) {
                keys.press(n);
            }
        }
    }
}

// 1 2 3 4      1 2 3 C
// Q W E R  ->  4 5 6 D
// A S D F      7 8 9 E
// Z X C V      A 0 B F
pub fn key_to_num(key: Key) -> Option<u8> {
    match key {
        Key::Key1 => Some(0x1),
        Key::Key2 => Some(0x2),
        Key::Key3 => Some(0x3),
        Key::Key4 => Some(0xC),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xD),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xE),
        Key::Z => Some(0xA),
        Key::X => Some(0x0),
        Key::C => Some(0xB),
        Key::V => Some(0xF),
        _ => None,
    }
}
