//! A simulated programmer board, for exercising the driver without hardware.
//!
//! Outputs are plain latches.  Every line that is not output-enabled is driven from the outside
//! by a `Drive`, which can follow the clock line to model a target shifting data out.
//!
//! Bring-up settings, clock edges and the waits of the delay handed out by `SimBoard::delay` go
//! into one shared event log, so tests can check the order they happen in.
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use embedded_hal::delay::DelayNs;

use crate::board::{Board, CpuControl, InterfaceConfig, Regulator};
use crate::port::Port;
use crate::signals::{Line, PORT_WIDTH};

/// What the outside world drives onto an input line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drive {
    Level(bool),
    /// Bit `n` of the pattern is presented after the `n`th falling clock edge counted from when
    /// the drive was attached, wrapping after eight edges.
    Pattern(u8),
    /// Wired to another line and reads back its latched level.
    Loopback(Line),
}

/// Something the board or its delay did, in the order it happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    CpuControl(CpuControl),
    InterfaceConfig(InterfaceConfig),
    OutputEnable(u8),
    Regulator(Regulator),
    ClockRise,
    ClockFall,
    Delay(u32),
}

type Log = Rc<RefCell<Vec<Event>>>;

/// Delay that waits for nothing and records each request in the board's event log.
pub struct SimDelay {
    log: Log,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::Delay(ns));
    }
}

pub struct SimBoard {
    log: Log,
    clock: Line,
    latch: u8,
    output_enable: u8,
    drives: [Drive; PORT_WIDTH as usize],
    pattern_start: [u32; PORT_WIDTH as usize],
    rising: u32,
    falling: u32,
    samples: u32,
    samples_while_clock_high: u32,
    cpu_control: Option<CpuControl>,
    interface_config: Option<InterfaceConfig>,
    regulator: Option<Regulator>,
}

impl SimBoard {
    /// A board in its reset state: all lines inputs, pulled high, latches low.  Edges and
    /// sampling are tracked against `clock`.
    pub fn new(clock: Line) -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            clock,
            latch: 0,
            output_enable: 0,
            drives: [Drive::Level(true); PORT_WIDTH as usize],
            pattern_start: [0; PORT_WIDTH as usize],
            rising: 0,
            falling: 0,
            samples: 0,
            samples_while_clock_high: 0,
            cpu_control: None,
            interface_config: None,
            regulator: None,
        }
    }

    /// A delay logging into this board's event log.
    pub fn delay(&self) -> SimDelay {
        SimDelay { log: Rc::clone(&self.log) }
    }

    /// Everything logged since the board was created or last cleared.
    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.log.borrow_mut().clear();
    }

    /// Sum of all logged delays.
    pub fn delayed_ns(&self) -> u64 {
        self.log
            .borrow()
            .iter()
            .map(|event| match event {
                Event::Delay(ns) => u64::from(*ns),
                _ => 0,
            })
            .sum()
    }

    fn record(&self, event: Event) {
        self.log.borrow_mut().push(event);
    }

    /// Drive `line` from the outside.  Has no visible effect while the line is an output.
    pub fn drive(&mut self, line: Line, drive: Drive) {
        self.drives[line.0 as usize] = drive;
        self.pattern_start[line.0 as usize] = self.falling;
    }

    /// Latched level of `line`, whether or not it is driven.
    pub fn latched(&self, line: Line) -> bool {
        self.latch & line.mask() != 0
    }

    /// Levels of all lines the board currently drives, as a port-wide bit mask.
    pub fn driven(&self) -> u8 {
        self.latch & self.output_enable
    }

    pub fn output_enable(&self) -> u8 {
        self.output_enable
    }

    pub fn rising_edges(&self) -> u32 {
        self.rising
    }

    pub fn falling_edges(&self) -> u32 {
        self.falling
    }

    /// Number of reads of input lines so far.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Number of input reads made while the clock line was high.
    pub fn samples_while_clock_high(&self) -> u32 {
        self.samples_while_clock_high
    }

    pub fn cpu_control(&self) -> Option<CpuControl> {
        self.cpu_control
    }

    pub fn interface_config(&self) -> Option<InterfaceConfig> {
        self.interface_config
    }

    pub fn regulator(&self) -> Option<Regulator> {
        self.regulator
    }

    fn external(&self, line: Line) -> bool {
        let n = line.0 as usize;
        match self.drives[n] {
            Drive::Level(level) => level,
            Drive::Pattern(bits) => {
                let bit = self.falling.wrapping_sub(self.pattern_start[n]) % 8;
                (bits >> bit) & 1 != 0
            }
            Drive::Loopback(source) => self.latched(source),
        }
    }
}

impl Port for SimBoard {
    fn set_output_enable(&mut self, mask: u8) {
        self.record(Event::OutputEnable(mask));
        self.output_enable = mask;
    }

    fn write(&mut self, line: Line, high: bool) {
        let was = self.latched(line);
        if high {
            self.latch |= line.mask();
        } else {
            self.latch &= !line.mask();
        }
        if line == self.clock {
            match (was, high) {
                (false, true) => {
                    self.rising += 1;
                    self.record(Event::ClockRise);
                }
                (true, false) => {
                    self.falling += 1;
                    self.record(Event::ClockFall);
                }
                _ => {}
            }
        }
    }

    fn read(&mut self, line: Line) -> bool {
        if self.output_enable & line.mask() != 0 {
            return self.latched(line);
        }
        self.samples += 1;
        if self.latched(self.clock) {
            self.samples_while_clock_high += 1;
        }
        self.external(line)
    }
}

impl Board for SimBoard {
    fn set_cpu_control(&mut self, control: CpuControl) {
        self.record(Event::CpuControl(control));
        self.cpu_control = Some(control);
    }

    fn set_interface_config(&mut self, config: InterfaceConfig) {
        self.record(Event::InterfaceConfig(config));
        self.interface_config = Some(config);
    }

    fn set_regulator(&mut self, state: Regulator) {
        self.record(Event::Regulator(state));
        self.regulator = Some(state);
    }
}
