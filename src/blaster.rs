//! The `Blaster` driver: board bring-up and the pin state interface used by the USB-Blaster
//! bit-bang commands.  The byte shift operations live in `shift`.
use embedded_hal::delay::DelayNs;

use crate::board::{Board, CpuControl, InterfaceConfig, Regulator};
use crate::signals::{Config, Features, Signal};
use crate::state::{InputState, OutputState};

/// Sole owner of the programmer pins.  Every operation takes `&mut self`, so the command layer
/// can't overlap two transfers.
pub struct Blaster<B, D> {
    pub(crate) board: B,
    pub(crate) delay: D,
    pub(crate) config: Config,
}

impl<B, D> Blaster<B, D>
where
    B: Board,
    D: DelayNs,
{
    /// Take ownership of `board`.  Nothing is touched until `initialize`.
    pub fn new(board: B, delay: D, config: Config) -> Self {
        #[cfg(feature = "defmt")]
        defmt::debug!("blaster: {}", config);
        Self { board, delay, config }
    }

    /// Give back the board and delay.  The pins keep their last state.
    pub fn release(self) -> (B, D) {
        (self.board, self.delay)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Bring the board up.  Must run once after reset, before any other operation; running it
    /// again reapplies the same settings.
    pub fn initialize(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "initialize: outputs {=u8:#x}, inputs {=u8:#x}",
            self.config.output_mask(),
            self.config.input_mask()
        );

        self.board.set_cpu_control(CpuControl::BLASTER);
        self.board.set_interface_config(InterfaceConfig::BLASTER);
        self.board.set_output_enable(self.config.output_mask());
        // the target may not draw more than 100 mA before configuration
        self.board.set_regulator(Regulator::Disconnected);
        self.board.set_output_enable(self.directions());
    }

    /// Output-enable mask in effect after `initialize`.
    pub fn directions(&self) -> u8 {
        self.config.output_mask() | self.config.jtag_mask()
    }

    /// Drive the programmer outputs again after `disable`.  Does nothing unless the board has
    /// switchable outputs.
    pub fn enable(&mut self) {
        if self.config.features().contains(Features::OUTPUT_ENABLE) {
            #[cfg(feature = "defmt")]
            defmt::trace!("outputs enabled");
            self.board.set_output_enable(self.directions());
        }
    }

    /// Tri-state every programmer output.  Does nothing unless the board has switchable
    /// outputs.
    pub fn disable(&mut self) {
        if self.config.features().contains(Features::OUTPUT_ENABLE) {
            #[cfg(feature = "defmt")]
            defmt::trace!("outputs disabled");
            self.board.set_output_enable(0);
        }
    }

    /// Set the level of `signal`.  Signals absent from this variant ignore the write.
    pub fn write_signal(&mut self, signal: Signal, high: bool) {
        if let Some(line) = self.config.line(signal) {
            self.board.write(line, high);
        }
    }

    /// Level of `signal`.  Signals absent from this variant read high.
    pub fn read_signal(&mut self, signal: Signal) -> bool {
        match self.config.line(signal) {
            Some(line) => self.board.read(line),
            None => true,
        }
    }

    /// Apply an output state word.  nCE/nCS follow bits 2 and 3 only with AS-mode fitted, the
    /// LED follows bit 5 only when fitted.
    pub fn set_output_state(&mut self, state: OutputState) {
        self.write_signal(Signal::Tck, state.contains(OutputState::TCK));
        self.write_signal(Signal::Tms, state.contains(OutputState::TMS));
        self.write_signal(Signal::Nce, state.contains(OutputState::NCE));
        self.write_signal(Signal::Ncs, state.contains(OutputState::NCS));
        self.write_signal(Signal::Tdi, state.contains(OutputState::TDI));
        self.write_signal(Signal::OeLed, state.contains(OutputState::OE));
    }

    /// Apply an output state word, then sample the inputs.  The sample always reflects the
    /// levels just set, which lets the caller poll CONF_DONE / nSTATUS during configuration.
    pub fn set_and_read_state(&mut self, state: OutputState) -> InputState {
        self.set_output_state(state);

        let mut input = InputState::empty();
        input.set(InputState::TDO, self.read_signal(Signal::Tdo));
        input.set(InputState::ASDO, self.read_signal(Signal::Asdo));
        input
    }
}
