//! Implement the `Port` trait on top of individual embedded-hal pins.
//!
//! Direction is fixed by the pin types, so the output-enable mask only gates which outputs get
//! driven: a write to a line that is not enabled is latched and applied once it is.
use core::convert::Infallible;

use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::board::Board;
use crate::port::Port;
use crate::signals::{Line, PORT_WIDTH};

type Out<'a> = &'a mut dyn OutputPin<Error = Infallible>;
type In<'a> = &'a mut dyn InputPin<Error = Infallible>;

enum Slot<'a> {
    Unused,
    Output(Out<'a>),
    Input(In<'a>),
}

pub struct HalPort<'a> {
    slots: [Slot<'a>; PORT_WIDTH as usize],
    latch: u8,
    enabled: u8,
}

impl<'a> Default for HalPort<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> HalPort<'a> {
    /// Create a port with no pins attached.  Unattached lines read high.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| Slot::Unused),
            latch: 0,
            enabled: 0,
        }
    }

    /// Attach an output pin to `line`, replacing whatever was attached there.
    ///
    /// # Panics
    ///
    /// Panics if `line` is not below `PORT_WIDTH`.
    pub fn output(mut self, line: Line, pin: Out<'a>) -> Self {
        assert!(line.0 < PORT_WIDTH, "line {} is outside the port", line.0);
        self.slots[line.0 as usize] = Slot::Output(pin);
        self
    }

    /// Attach an input pin to `line`, replacing whatever was attached there.
    ///
    /// # Panics
    ///
    /// Panics if `line` is not below `PORT_WIDTH`.
    pub fn input(mut self, line: Line, pin: In<'a>) -> Self {
        assert!(line.0 < PORT_WIDTH, "line {} is outside the port", line.0);
        self.slots[line.0 as usize] = Slot::Input(pin);
        self
    }

    fn drive(&mut self, line: Line) {
        if self.enabled & line.mask() == 0 {
            return;
        }
        let state = PinState::from(self.latch & line.mask() != 0);
        if let Slot::Output(pin) = &mut self.slots[line.0 as usize] {
            pin.set_state(state).unwrap_or_else(|e| match e {});
        }
    }
}

impl<'a> Port for HalPort<'a> {
    fn set_output_enable(&mut self, mask: u8) {
        let newly_enabled = mask & !self.enabled;
        self.enabled = mask;
        for n in 0..PORT_WIDTH {
            if newly_enabled & Line(n).mask() != 0 {
                self.drive(Line(n));
            }
        }
    }

    fn write(&mut self, line: Line, high: bool) {
        if high {
            self.latch |= line.mask();
        } else {
            self.latch &= !line.mask();
        }
        self.drive(line);
    }

    fn read(&mut self, line: Line) -> bool {
        match &mut self.slots[line.0 as usize] {
            Slot::Input(pin) => pin.is_high().unwrap_or_else(|e| match e {}),
            Slot::Output(_) => self.latch & line.mask() != 0,
            Slot::Unused => true,
        }
    }
}

/// Plain GPIO has no clock, interface or regulator setup; bring-up only touches the port.
impl<'a> Board for HalPort<'a> {}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embedded_hal::digital::ErrorType;

    struct TestPin<'c>(&'c Cell<bool>);

    impl ErrorType for TestPin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for TestPin<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.set(true);
            Ok(())
        }
    }

    impl InputPin for TestPin<'_> {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0.get())
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0.get())
        }
    }

    #[test]
    fn writes_wait_for_output_enable() {
        let level = Cell::new(false);
        let mut pin = TestPin(&level);
        let mut port = HalPort::new().output(Line(3), &mut pin);

        port.write(Line(3), true);
        assert!(!level.get());
        assert!(port.read(Line(3)));

        port.set_output_enable(Line(3).mask());
        assert!(level.get());

        port.write(Line(3), false);
        assert!(!level.get());
    }

    #[test]
    fn inputs_and_unused_lines() {
        let level = Cell::new(false);
        let mut pin = TestPin(&level);
        let mut port = HalPort::new().input(Line(6), &mut pin);

        assert!(!port.read(Line(6)));
        level.set(true);
        assert!(port.read(Line(6)));
        assert!(port.read(Line(4)));
    }

    #[test]
    #[should_panic(expected = "outside the port")]
    fn output_past_port_width_panics() {
        let level = Cell::new(false);
        let mut pin = TestPin(&level);
        let _ = HalPort::new().output(Line(PORT_WIDTH), &mut pin);
    }

    #[test]
    #[should_panic(expected = "outside the port")]
    fn input_past_port_width_panics() {
        let level = Cell::new(false);
        let mut pin = TestPin(&level);
        let _ = HalPort::new().input(Line(8), &mut pin);
    }
}
