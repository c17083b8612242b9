//! Voltage sample representation and the telemetry line format.
//!
//! The sensor is a 12-bit ADC referenced to 3.3 V. All arithmetic is
//! integer millivolts so the firmware never needs a floating-point
//! formatter: `millivolts = raw * 3300 / 4096`, displayed as
//! `<whole>.<frac:03>` with the fraction being millivolts modulo 1000.

use core::fmt::Write;

use heapless::String;

/// Full-scale code of the 12-bit converter
pub const ADC_FULL_SCALE: u32 = 4096;

/// Reference voltage in millivolts
pub const VREF_MILLIVOLTS: u32 = 3300;

/// Capacity of a formatted telemetry line (`adc:3.299\r\n` worst case)
pub const TELEMETRY_LINE_LEN: usize = 16;

/// One converted voltage reading.
///
/// Recomputed every control-loop tick; only the previously displayed sample
/// is retained, and only so a failed conversion does not blank the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VoltageSample {
    raw: u16,
}

impl VoltageSample {
    /// Wrap a raw conversion code (0..=4095)
    pub fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    /// The raw 12-bit code
    pub fn raw(&self) -> u16 {
        self.raw
    }

    /// The reading in millivolts
    pub fn millivolts(&self) -> u32 {
        self.raw as u32 * VREF_MILLIVOLTS / ADC_FULL_SCALE
    }

    /// Integer volts, for the panel's whole-number field
    pub fn volts_whole(&self) -> u32 {
        self.millivolts() / 1000
    }

    /// Three-decimal fraction in millivolts (0..=999)
    pub fn millivolt_frac(&self) -> u32 {
        self.millivolts() % 1000
    }
}

/// Format one telemetry line for the link: `adc:<volts>\r\n`, three decimals.
pub fn telemetry_line(sample: &VoltageSample) -> String<TELEMETRY_LINE_LEN> {
    let mut line = String::new();
    // Cannot overflow TELEMETRY_LINE_LEN: "adc:" + 1 digit + '.' + 3 digits + CRLF
    let _ = write!(
        line,
        "adc:{}.{:03}\r\n",
        sample.volts_whole(),
        sample.millivolt_frac()
    );
    line
}
