//! The signal map: which logical programmer signal lives on which physical port line, and which
//! of them exist at all for a given hardware variant.
//!
//! A `Config` is built once from a set of `Features` and a `PinMap`.  Building it validates that
//! every physical line has at most one owner.  `Config::new` is a `const fn`, so a configuration
//! held in a `const` is checked by the compiler and an invalid board never gets flashed.
use core::fmt;

use bitflags::bitflags;

use crate::shift::Timing;

/// Number of lines on the programmer port.
pub const PORT_WIDTH: u8 = 8;

/// A physical line on the programmer port, numbered from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line(pub u8);

impl Line {
    /// Bit of this line in a port-wide register such as the output-enable mask.
    pub const fn mask(self) -> u8 {
        1 << self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Output,
    Input,
}

/// Logical signals of the programmer.  Most lines carry a different meaning per protocol; the
/// names follow JTAG where one exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Signal {
    /// JTAG TCK, AS/PS DCLK
    Tck,
    /// JTAG TDI, AS ASDI, PS DATA0
    Tdi,
    /// JTAG TMS, AS/PS nCONFIG
    Tms,
    /// JTAG TDO, AS/PS CONF_DONE
    Tdo,
    /// AS DATAOUT, PS nSTATUS
    Asdo,
    /// AS nCE
    Nce,
    /// AS nCS
    Ncs,
    /// Enable line of the JTAG level shifters
    JtagEn,
    /// Status LED / output enable
    OeLed,
}

impl Signal {
    pub const ALL: [Signal; 9] = [
        Signal::Tck,
        Signal::Tdi,
        Signal::Tms,
        Signal::Tdo,
        Signal::Asdo,
        Signal::Nce,
        Signal::Ncs,
        Signal::JtagEn,
        Signal::OeLed,
    ];

    pub const fn direction(self) -> Direction {
        match self {
            Signal::Tdo | Signal::Asdo => Direction::Input,
            _ => Direction::Output,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Signal::Tck => "TCK",
            Signal::Tdi => "TDI",
            Signal::Tms => "TMS",
            Signal::Tdo => "TDO",
            Signal::Asdo => "ASDO",
            Signal::Nce => "nCE",
            Signal::Ncs => "nCS",
            Signal::JtagEn => "JTAG_EN",
            Signal::OeLed => "OE_LED",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Optional circuitry fitted to the programmer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Features: u8 {
        /// Active Serial: nCE, nCS and ASDO are wired.
        const AS_MODE = 1 << 0;
        /// Passive Serial: nSTATUS is wired to the ASDO line.
        const PS_MODE = 1 << 1;
        /// The output-enable / LED line is driven from bit 5 of the output state.
        const OE_LED = 1 << 2;
        /// Tri-state the programmer outputs while the programmer is disabled.
        const OUTPUT_ENABLE = 1 << 3;
    }
}

/// Physical placement of every signal.  The feature-gated signals may be left unwired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMap {
    pub tck: Line,
    pub tdi: Line,
    pub tms: Line,
    pub tdo: Line,
    pub jtag_en: Line,
    pub asdo: Option<Line>,
    pub nce: Option<Line>,
    pub ncs: Option<Line>,
    pub oe_led: Option<Line>,
}

impl PinMap {
    /// Port A of the CY7C68013A "Lcsoft Mini Board".  JTAG_EN and the LED share PA0.
    pub const LCSOFT_MINI: PinMap = PinMap {
        tck: Line(3),
        tdi: Line(5),
        tms: Line(7),
        tdo: Line(6),
        jtag_en: Line(0),
        asdo: Some(Line(4)),
        nce: Some(Line(1)),
        ncs: Some(Line(2)),
        oe_led: Some(Line(0)),
    };

    const fn wired(&self, signal: Signal) -> Option<Line> {
        match signal {
            Signal::Tck => Some(self.tck),
            Signal::Tdi => Some(self.tdi),
            Signal::Tms => Some(self.tms),
            Signal::Tdo => Some(self.tdo),
            Signal::JtagEn => Some(self.jtag_en),
            Signal::Asdo => self.asdo,
            Signal::Nce => self.nce,
            Signal::Ncs => self.ncs,
            Signal::OeLed => self.oe_led,
        }
    }
}

/// Reasons a feature set and pin map cannot form a configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// An enabled feature needs a signal the pin map leaves unwired.
    MissingLine(Signal),
    /// The signal is placed beyond the width of the port.
    LineOutOfRange(Signal, Line),
    /// Both signals would own the same physical line.
    Conflict(Signal, Signal),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingLine(s) => write!(f, "{} is required by the enabled features but not wired", s),
            ConfigError::LineOutOfRange(s, l) => write!(f, "{} is placed on line {}, port is {} lines wide", s, l.0, PORT_WIDTH),
            ConfigError::Conflict(a, b) => write!(f, "{} and {} are placed on the same line", a, b),
        }
    }
}

/// A validated hardware variant: features, pin placement and clock timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    features: Features,
    pins: PinMap,
    timing: Timing,
}

impl Config {
    /// The Lcsoft Mini Board with AS, PS and the LED fitted.
    pub const LCSOFT_MINI: Config = Config::new(
        Features::AS_MODE.union(Features::PS_MODE).union(Features::OE_LED),
        PinMap::LCSOFT_MINI,
    );

    /// Build a configuration, panicking if the pin map is invalid for `features`.  Use this in a
    /// `const` item to have the check done at compile time.
    pub const fn new(features: Features, pins: PinMap) -> Self {
        match Self::try_new(features, pins) {
            Ok(config) => config,
            Err(ConfigError::MissingLine(_)) => panic!("signal required by the enabled features is not wired"),
            Err(ConfigError::LineOutOfRange(..)) => panic!("signal placed beyond the port width"),
            Err(ConfigError::Conflict(..)) => panic!("two signals own the same line"),
        }
    }

    pub const fn try_new(features: Features, pins: PinMap) -> Result<Self, ConfigError> {
        if let Err(e) = validate(features, &pins) {
            return Err(e);
        }
        Ok(Config { features, pins, timing: Timing::FULL_SPEED })
    }

    /// Replace the clock timing.
    pub const fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub const fn features(&self) -> Features {
        self.features
    }

    pub const fn pins(&self) -> &PinMap {
        &self.pins
    }

    pub const fn timing(&self) -> Timing {
        self.timing
    }

    /// True if AS-mode circuitry is fitted, i.e. nCS exists and steers the feedback source.
    pub const fn has_as_mode(&self) -> bool {
        self.features.contains(Features::AS_MODE)
    }

    /// The line owned by `signal`, or `None` if the signal does not exist in this variant.
    /// JTAG_EN yields its line to the LED when both are placed on the same one.
    pub const fn line(&self, signal: Signal) -> Option<Line> {
        match signal {
            Signal::JtagEn => match self.present(Signal::OeLed) {
                Some(led) if led.0 == self.pins.jtag_en.0 => None,
                _ => Some(self.pins.jtag_en),
            },
            _ => self.present(signal),
        }
    }

    const fn present(&self, signal: Signal) -> Option<Line> {
        present(self.features, &self.pins, signal)
    }

    /// Lines that must be driven for every existing output signal.
    pub const fn output_mask(&self) -> u8 {
        self.mask_of(Direction::Output)
    }

    /// Lines read back from the target.
    pub const fn input_mask(&self) -> u8 {
        self.mask_of(Direction::Input)
    }

    /// Outputs every variant drives: TDI, TCK, TMS and the JTAG enable line.
    pub const fn jtag_mask(&self) -> u8 {
        self.pins.tdi.mask() | self.pins.tck.mask() | self.pins.tms.mask() | self.pins.jtag_en.mask()
    }

    const fn mask_of(&self, direction: Direction) -> u8 {
        let mut mask = 0;
        let mut i = 0;
        while i < Signal::ALL.len() {
            let signal = Signal::ALL[i];
            if signal.direction() as u8 == direction as u8 {
                if let Some(line) = self.line(signal) {
                    mask |= line.mask();
                }
            }
            i += 1;
        }
        mask
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Config {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Config {{ features: {=u8:#x}, pins: {}, timing: {} }}",
            self.features.bits(),
            self.pins,
            self.timing,
        )
    }
}

/// Wired line of `signal` if the features bring it into existence.  Ownership is not resolved.
const fn present(features: Features, pins: &PinMap, signal: Signal) -> Option<Line> {
    if required(features, signal) {
        pins.wired(signal)
    } else {
        None
    }
}

const fn required(features: Features, signal: Signal) -> bool {
    match signal {
        Signal::Asdo => features.intersects(Features::AS_MODE.union(Features::PS_MODE)),
        Signal::Nce | Signal::Ncs => features.contains(Features::AS_MODE),
        Signal::OeLed => features.contains(Features::OE_LED),
        _ => true,
    }
}

const fn validate(features: Features, pins: &PinMap) -> Result<(), ConfigError> {
    let mut i = 0;
    while i < Signal::ALL.len() {
        let a = Signal::ALL[i];
        let line_a = match present(features, pins, a) {
            Some(line) => line,
            None if required(features, a) => return Err(ConfigError::MissingLine(a)),
            None => {
                i += 1;
                continue;
            }
        };
        if line_a.0 >= PORT_WIDTH {
            return Err(ConfigError::LineOutOfRange(a, line_a));
        }

        let mut j = i + 1;
        while j < Signal::ALL.len() {
            let b = Signal::ALL[j];
            if let Some(line_b) = present(features, pins, b) {
                // JTAG_EN is direction-only, the LED may take over its line
                let shared_enable = matches!(
                    (a, b),
                    (Signal::JtagEn, Signal::OeLed) | (Signal::OeLed, Signal::JtagEn)
                );
                if line_a.0 == line_b.0 && !shared_enable {
                    return Err(ConfigError::Conflict(a, b));
                }
            }
            j += 1;
        }
        i += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const JTAG_ONLY: Config = Config::new(Features::empty(), PinMap::LCSOFT_MINI);

    #[test]
    fn lcsoft_masks() {
        let config = Config::LCSOFT_MINI;
        // PA0 LED, PA1 nCE, PA2 nCS, PA3 TCK, PA5 TDI, PA7 TMS
        assert_eq!(config.output_mask(), 0b1010_1111);
        // PA4 ASDO, PA6 TDO
        assert_eq!(config.input_mask(), 0b0101_0000);
        assert_eq!(config.jtag_mask(), 0b1010_1001);
    }

    #[test]
    fn jtag_only_masks() {
        assert_eq!(JTAG_ONLY.output_mask(), 0b1010_1001);
        assert_eq!(JTAG_ONLY.input_mask(), 0b0100_0000);
    }

    #[test]
    fn led_takes_over_jtag_enable_line() {
        let config = Config::LCSOFT_MINI;
        assert_eq!(config.line(Signal::OeLed), Some(Line(0)));
        assert_eq!(config.line(Signal::JtagEn), None);

        let without_led = Config::new(Features::AS_MODE, PinMap::LCSOFT_MINI);
        assert_eq!(without_led.line(Signal::OeLed), None);
        assert_eq!(without_led.line(Signal::JtagEn), Some(Line(0)));
    }

    #[test_case(Features::empty(), Signal::Asdo, None)]
    #[test_case(Features::PS_MODE, Signal::Asdo, Some(Line(4)))]
    #[test_case(Features::PS_MODE, Signal::Ncs, None)]
    #[test_case(Features::AS_MODE, Signal::Ncs, Some(Line(2)))]
    #[test_case(Features::AS_MODE, Signal::Nce, Some(Line(1)))]
    #[test_case(Features::AS_MODE, Signal::Asdo, Some(Line(4)))]
    #[test_case(Features::OE_LED, Signal::OeLed, Some(Line(0)))]
    fn existence_follows_features(features: Features, signal: Signal, expected: Option<Line>) {
        let config = Config::new(features, PinMap::LCSOFT_MINI);
        assert_eq!(config.line(signal), expected);
    }

    #[test]
    fn led_on_tms_line_is_rejected() {
        let pins = PinMap { oe_led: Some(Line(7)), ..PinMap::LCSOFT_MINI };
        assert_eq!(
            Config::try_new(Features::OE_LED, pins),
            Err(ConfigError::Conflict(Signal::Tms, Signal::OeLed))
        );
        // without the LED fitted the stray placement is harmless
        assert!(Config::try_new(Features::AS_MODE, pins).is_ok());
    }

    #[test]
    fn unwired_as_signal_is_rejected() {
        let pins = PinMap { ncs: None, ..PinMap::LCSOFT_MINI };
        assert_eq!(
            Config::try_new(Features::AS_MODE, pins),
            Err(ConfigError::MissingLine(Signal::Ncs))
        );
        assert!(Config::try_new(Features::PS_MODE, pins).is_ok());
    }

    #[test]
    fn line_beyond_port_is_rejected() {
        let pins = PinMap { tdo: Line(8), ..PinMap::LCSOFT_MINI };
        assert_eq!(
            Config::try_new(Features::empty(), pins),
            Err(ConfigError::LineOutOfRange(Signal::Tdo, Line(8)))
        );
    }

    #[test]
    fn input_sharing_output_line_is_rejected() {
        let pins = PinMap { tdo: Line(5), ..PinMap::LCSOFT_MINI };
        assert_eq!(
            Config::try_new(Features::empty(), pins),
            Err(ConfigError::Conflict(Signal::Tdi, Signal::Tdo))
        );
    }

    #[test]
    #[should_panic]
    fn new_panics_on_conflict() {
        let pins = PinMap { tck: Line(5), ..PinMap::LCSOFT_MINI };
        Config::new(Features::empty(), pins);
    }

    #[test]
    fn error_display() {
        let e = ConfigError::Conflict(Signal::Tms, Signal::OeLed);
        assert_eq!(e.to_string(), "TMS and OE_LED are placed on the same line");
    }
}
