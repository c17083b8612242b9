//! Voltage monitor
//!
//! Averages repeated single-shot conversions into a stable reading. The
//! raw-code mean uses integer truncation, matching the fixed-point display
//! pipeline downstream.

use windlass_protocol::VoltageSample;

use crate::traits::{AnalogSampler, DelayMs, SampleError};

/// Settle time between consecutive conversions
pub const SETTLE_DELAY_MS: u32 = 5;

/// Averaging monitor over one sampler channel
pub struct VoltageMonitor<A: AnalogSampler> {
    sampler: A,
}

impl<A: AnalogSampler> VoltageMonitor<A> {
    pub fn new(sampler: A) -> Self {
        Self { sampler }
    }

    /// Read access to the sampler
    pub fn sampler(&self) -> &A {
        &self.sampler
    }

    /// Average `count` sequential conversions (a zero count is read once).
    ///
    /// Any conversion timeout aborts the whole average - the caller keeps
    /// its previous sample rather than mixing in garbage.
    pub fn sample_average<D: DelayMs>(
        &mut self,
        count: u16,
        delay: &mut D,
    ) -> Result<VoltageSample, SampleError> {
        let count = count.max(1);
        let mut sum: u32 = 0;
        for _ in 0..count {
            sum += self.sampler.convert()? as u32;
            delay.delay_ms(SETTLE_DELAY_MS);
        }
        Ok(VoltageSample::from_raw((sum / count as u32) as u16))
    }
}
