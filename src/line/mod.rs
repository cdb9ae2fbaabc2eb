//! Digital output lines driving the relay coils.
//!
//! A [`Line`] is one output that can be energized or de-energized. There is
//! no readback path: a write is assumed to land, so implementations are
//! infallible once constructed.

mod memory;

#[cfg(feature = "rpi")]
mod gpio;

use std::fmt;

pub use memory::{LineEvent, LineJournal, MemoryLine};

#[cfg(feature = "rpi")]
pub use gpio::GpioLine;

/// A single relay output.
pub trait Line: Send + fmt::Debug {
    /// Drives the line high (`true`) or low (`false`).
    fn set(&mut self, energized: bool);
}
