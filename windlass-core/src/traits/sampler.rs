//! Analog sampler trait
//!
//! One 12-bit input channel, software-triggered, single-shot per call,
//! configured for the slowest (most accurate) sampling window.

/// Errors from a single conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleError {
    /// The conversion did not complete within the bounded poll window.
    /// Callers keep their previous sample; a timed-out conversion never
    /// yields a stale register value.
    Timeout,
}

/// A single-shot analog-to-digital converter channel
pub trait AnalogSampler {
    /// Perform one blocking conversion and return the 12-bit code (0..=4095)
    fn convert(&mut self) -> Result<u16, SampleError>;
}

impl<T: AnalogSampler + ?Sized> AnalogSampler for &mut T {
    fn convert(&mut self) -> Result<u16, SampleError> {
        (**self).convert()
    }
}
