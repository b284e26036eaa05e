//! Access to the programmer port.  Backends implement the `Port` trait; the driver and the shift
//! engine are written once against it.
//!
//! Line operations are infallible.  A backend built on fallible pins has no way to report a
//! failure to the host mid-transfer, so the `hal` backend only accepts pins whose error type is
//! `Infallible`.
pub mod hal;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

use crate::signals::Line;

pub trait Port {
    /// Set the direction of every line at once: a set bit drives the line, a clear bit leaves it
    /// as an input.
    fn set_output_enable(&mut self, mask: u8);

    /// Drive `line` high or low.  On an input line the level is latched and shows once the line
    /// is switched to an output.
    fn write(&mut self, line: Line, high: bool);

    /// Level currently seen on `line`.  For an output this is the driven level.
    fn read(&mut self, line: Line) -> bool;
}
