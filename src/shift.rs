//! Byte shifts over TDI/TCK, least significant bit first, with optional read-back.
//!
//! The bidirectional shift samples the feedback line before it drives TDI and raises TCK, so
//! every sample sees what the target presented after the previous falling edge.  Fed straight
//! back from TDI, the byte returns one bit late; that skew is part of the protocol the host
//! software expects and must not be corrected here.
use embedded_hal::delay::DelayNs;

use crate::blaster::Blaster;
use crate::board::Board;
use crate::signals::{Line, Signal};

/// Minimum time TCK is held in each half of a bit.  Zero skips the delay entirely and leaves
/// the pace to the instruction timing of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    pub high_ns: u32,
    pub low_ns: u32,
}

impl Timing {
    pub const FULL_SPEED: Timing = Timing { high_ns: 0, low_ns: 0 };

    /// Symmetric clock of at most `freq_khz`.  Zero means no limit.
    pub const fn from_khz(freq_khz: u32) -> Self {
        if freq_khz == 0 {
            return Self::FULL_SPEED;
        }
        // round up so the clock never runs faster than freq_khz
        let half_period = 1_000_000u64.div_ceil(2 * freq_khz as u64) as u32;
        Timing { high_ns: half_period, low_ns: half_period }
    }

    /// Minimum duration of one bit.
    pub const fn bit_ns(&self) -> u32 {
        self.high_ns.saturating_add(self.low_ns)
    }
}

/// Line the bidirectional shift reads back from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Feedback {
    /// JTAG TDO
    Tdo,
    /// AS DATAOUT
    Asdo,
}

impl<B, D> Blaster<B, D>
where
    B: Board,
    D: DelayNs,
{
    /// Feedback source for the next bidirectional shift.  nCS held low selects the AS device;
    /// without AS-mode fitted this is always TDO.
    ///
    /// nCS is read once per shift.  The caller must not change it while a shift is in progress.
    pub fn feedback(&mut self) -> Feedback {
        if !self.config.has_as_mode() || self.read_signal(Signal::Ncs) {
            Feedback::Tdo
        } else {
            Feedback::Asdo
        }
    }

    fn feedback_line(&self, feedback: Feedback) -> Line {
        match (feedback, self.config.line(Signal::Asdo)) {
            (Feedback::Asdo, Some(asdo)) if self.config.has_as_mode() => asdo,
            _ => self.config.pins().tdo,
        }
    }

    fn clock_high(&mut self, tck: Line) {
        self.board.write(tck, true);
        let ns = self.config.timing().high_ns;
        if ns > 0 {
            self.delay.delay_ns(ns);
        }
    }

    fn clock_low(&mut self, tck: Line) {
        self.board.write(tck, false);
        let ns = self.config.timing().low_ns;
        if ns > 0 {
            self.delay.delay_ns(ns);
        }
    }

    /// Clock `byte` out on TDI without reading anything back.
    ///
    /// TCK is lowered at the start of each following bit, and once more after the last one.
    /// TDI is left at bit 7.
    pub fn shift_out(&mut self, byte: u8) {
        let tck = self.config.pins().tck;
        let tdi = self.config.pins().tdi;
        let mut byte = byte;

        self.board.write(tdi, byte & 1 != 0);
        self.clock_high(tck);
        for _ in 1..8 {
            byte >>= 1;
            self.clock_low(tck);
            self.board.write(tdi, byte & 1 != 0);
            self.clock_high(tck);
        }
        self.clock_low(tck);
    }

    /// Clock `byte` out on TDI and return the byte read back from the feedback line picked by
    /// `feedback`.
    pub fn shift_in_out(&mut self, byte: u8) -> u8 {
        let feedback = self.feedback();
        self.shift_in_out_from(feedback, byte)
    }

    /// Bidirectional shift reading TDO regardless of nCS.
    pub fn shift_in_out_jtag(&mut self, byte: u8) -> u8 {
        self.shift_in_out_from(Feedback::Tdo, byte)
    }

    /// Bidirectional shift reading ASDO regardless of nCS.  Without AS-mode fitted this reads
    /// TDO.
    pub fn shift_in_out_as(&mut self, byte: u8) -> u8 {
        self.shift_in_out_from(Feedback::Asdo, byte)
    }

    fn shift_in_out_from(&mut self, feedback: Feedback, byte: u8) -> u8 {
        let tck = self.config.pins().tck;
        let tdi = self.config.pins().tdi;
        let from = self.feedback_line(feedback);
        let mut byte = byte;

        for _ in 0..8 {
            // TCK is low here: sample first, then drive
            let bit = self.board.read(from) as u8;
            self.board.write(tdi, byte & 1 != 0);
            self.clock_high(tck);
            byte = (byte >> 1) | (bit << 7);
            self.clock_low(tck);
        }
        byte
    }

    /// `shift_out` every byte of `data` in order.
    pub fn shift_out_all(&mut self, data: &[u8]) {
        for &byte in data {
            self.shift_out(byte);
        }
    }

    /// `shift_in_out` every byte of `data` in place.  The feedback source is resolved again for
    /// each byte.
    pub fn shift_in_out_all(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            *byte = self.shift_in_out(*byte);
        }
    }
}
