//! This crate drives the pins of a USB-Blaster style programmer: a microcontroller that bit-bangs
//! JTAG, Altera Active Serial (AS) and Passive Serial (PS) configuration over one set of GPIO
//! lines.  It sits below the USB command layer, which hands it pin states and bytes to shift.
//!
//! At the lowest level is the board.  A board implements the `Port` trait to read and write
//! numbered port lines, and the `Board` trait for the chip settings applied at bring-up.  The
//! `port::hal` module builds a port out of embedded-hal pins; `port::sim` (feature `sim`) is a
//! simulated board for testing without hardware.
//!
//! Which logical signal lives on which line, and which signals exist at all, is described by a
//! `Config`.  The AS, PS and LED circuitry are optional features of a board; building a `Config`
//! checks that no two signals claim the same line.
//!
//! The `Blaster` driver owns the board.  It brings the board up, applies output state words,
//! reads input state words back, and shifts bytes out least significant bit first, optionally
//! reading a byte back from TDO or, with nCS held low in AS mode, from ASDO.
//!
//! # Example
//! ```no_run
//! use blaster_io::{Blaster, Config, OutputState, Timing};
//! # fn board() -> blaster_io::port::hal::HalPort<'static> { unimplemented!() }
//! # struct Delay;
//! # impl embedded_hal::delay::DelayNs for Delay { fn delay_ns(&mut self, _: u32) {} }
//! let config = Config::LCSOFT_MINI.with_timing(Timing::from_khz(6000));
//! let mut blaster = Blaster::new(board(), Delay, config);
//! blaster.initialize();
//!
//! // nCS high: JTAG.  Shift an instruction and read TDO back.
//! blaster.set_output_state(OutputState::NCS | OutputState::NCE | OutputState::OE);
//! let captured = blaster.shift_in_out(0x06);
//! let status = blaster.set_and_read_state(OutputState::NCS | OutputState::NCE | OutputState::OE);
//! ```

#![cfg_attr(not(test), no_std)]

#[cfg(any(test, feature = "sim"))]
extern crate alloc;

pub mod blaster;
pub mod board;
pub mod port;
pub mod shift;
pub mod signals;
pub mod state;

pub use blaster::Blaster;
pub use board::Board;
pub use port::Port;
pub use shift::{Feedback, Timing};
pub use signals::{Config, ConfigError, Features, Line, PinMap, Signal};
pub use state::{InputState, OutputState};
