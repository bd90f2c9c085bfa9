//! A CHIP-8 interpreter core: 4 KiB memory, sixteen V registers, a 16 deep call stack,
//! delay and sound timers, a 64x32 monochrome frame buffer and a 16-key latch.
//!
//! The host owns pacing. It loads a program, sets keys, calls [`Emulator::step`] at its own
//! cadence, and presents [`Emulator::frame_buffer`] whenever [`Emulator::redraw`] is set.

pub mod decode;
pub mod display;
pub mod emulator;
pub mod error;
pub mod keyboard;
pub mod memory;
pub mod registers;

pub use emulator::{Emulator, Quirks};
pub use error::{Anomaly, LoadError};
