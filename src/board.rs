//! Chip-level bring-up hooks needed besides the programmer port.
//!
//! The bit layouts are those of the Cypress EZ-USB FX2 (CPUCS and IFCONFIG), which the
//! USB-Blaster compatible host software expects.  Boards built on other chips translate the
//! requested settings into their own equivalents, or ignore the hooks they have no use for.
use bitflags::bitflags;

use crate::port::Port;

bitflags! {
    /// CPU control and status.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CpuControl: u8 {
        const PRTCSTB = 1 << 5;
        const CLKSPD1 = 1 << 4;
        const CLKSPD0 = 1 << 3;
        const CLKINV = 1 << 2;
        /// Drive the CPU clock out to the target
        const CLKOE = 1 << 1;
    }
}

impl CpuControl {
    /// 48 MHz CPU clock, clock output enabled.
    pub const BLASTER: CpuControl = CpuControl::CLKSPD1.union(CpuControl::CLKOE);
}

bitflags! {
    /// Data-transfer engine configuration.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct InterfaceConfig: u8 {
        /// Internal interface clock
        const IFCLKSRC = 1 << 7;
        /// 48 MHz rather than 30 MHz internal clock
        const CLK_48MHZ = 1 << 6;
        /// Drive the interface clock pin
        const IFCLKOE = 1 << 5;
        const IFCLKPOL = 1 << 4;
        const ASYNC = 1 << 3;
        const GSTATE = 1 << 2;
        const IFCFG1 = 1 << 1;
        const IFCFG0 = 1 << 0;
    }
}

impl InterfaceConfig {
    /// Slave FIFO on the internal 48 MHz clock with the clock pin driven.  The host drivers do
    /// not work with any other setting.
    pub const BLASTER: InterfaceConfig = InterfaceConfig::IFCLKSRC
        .union(InterfaceConfig::CLK_48MHZ)
        .union(InterfaceConfig::IFCLKOE)
        .union(InterfaceConfig::ASYNC)
        .union(InterfaceConfig::IFCFG1)
        .union(InterfaceConfig::IFCFG0);
}

/// State of the auxiliary core-voltage regulator feeding the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Regulator {
    Connected,
    /// Keeps the target's draw within the unconfigured USB budget of 100 mA
    Disconnected,
}

/// A programmer board: the port plus the chip settings `Blaster::initialize` applies.  Every hook
/// defaults to doing nothing.
pub trait Board: Port {
    fn set_cpu_control(&mut self, _control: CpuControl) {}

    fn set_interface_config(&mut self, _config: InterfaceConfig) {}

    fn set_regulator(&mut self, _state: Regulator) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_values() {
        assert_eq!(CpuControl::BLASTER.bits(), 0x12);
        assert_eq!(InterfaceConfig::BLASTER.bits(), 0xeb);
    }
}
