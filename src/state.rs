//! Pin state words exchanged with the command layer.  The layouts are fixed by the USB-Blaster
//! bit-bang protocol.
use bitflags::bitflags;

bitflags! {
    /// Output pin levels requested by the host.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct OutputState: u8 {
        const TCK = 1 << 0;
        const TMS = 1 << 1;
        /// Only drives hardware with AS-mode fitted
        const NCE = 1 << 2;
        /// Only drives hardware with AS-mode fitted
        const NCS = 1 << 3;
        const TDI = 1 << 4;
        /// LED / output enable, only drives hardware with the LED fitted
        const OE = 1 << 5;
    }
}

bitflags! {
    /// Input pin levels reported to the host.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct InputState: u8 {
        /// TDO, CONF_DONE
        const TDO = 1 << 0;
        /// ASDO, nSTATUS; reads high without AS/PS circuitry
        const ASDO = 1 << 1;
    }
}

impl From<u8> for OutputState {
    /// Bits above bit 5 carry command flags, not pin levels, and are dropped.
    fn from(byte: u8) -> Self {
        OutputState::from_bits_truncate(byte)
    }
}

impl From<InputState> for u8 {
    fn from(state: InputState) -> u8 {
        state.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_flags_are_dropped() {
        // shift and read flags of a bit-bang command byte
        let state = OutputState::from(0xc0 | 0x11);
        assert_eq!(state, OutputState::TCK | OutputState::TDI);
    }
}
