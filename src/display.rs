pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// Monochrome 64x32 screen, one byte per pixel holding 0 or 1, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bit_buffer: [u8; WIDTH * HEIGHT],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bit_buffer: [0; WIDTH * HEIGHT],
        }
    }

    pub fn clear_buffer(&mut self) {
        self.bit_buffer = [0; WIDTH * HEIGHT];
    }

    pub fn pixels(&self) -> &[u8] {
        &self.bit_buffer
    }

    #[cfg(test)]
    fn pixel(&self, x: usize, y: usize) -> u8 {
        self.bit_buffer[(y % HEIGHT) * WIDTH + x % WIDTH]
    }

    /// XORs an 8 pixel wide sprite in with its top-left corner at (x, y), one byte per row,
    /// most significant bit leftmost. Pixels that run off an edge wrap to the opposite one.
    ///
    /// Returns true if any set sprite bit landed on a pixel that was already lit.
    pub fn paint(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (i, row) in sprite.iter().enumerate() {
            for j in 0..8 {
                if (row >> (7 - j)) & 1 == 0 {
                    continue;
                }
                let (nx, ny) = ((x as usize + j) % WIDTH, (y as usize + i) % HEIGHT);
                let index = (ny * WIDTH) + nx;
                if self.bit_buffer[index] == 1 {
                    collision = true;
                }
                self.bit_buffer[index] ^= 1;
            }
        }
        collision
    }
}
