//! Per-stream meter state and its block update.
//!
//! `MeterState` is a small value owned by the audio callback. It is the only
//! place the statistics are computed; consumers see copies of it through
//! [`MeterSnapshot`].
//!
//! # Ballistics
//! - RMS: exponential mean-square integration with a 3 s time constant
//! - Peak: instant attack, release of 20 dB per 1.7 s (linear in dB)
//! - Max peak: high-water mark of peak until reset
//! - Overs: samples with magnitude at or above full scale

use crate::error::{MeterError, Result};

/// Level that stands in for negative infinity dBFS
pub const FLOOR_DB: f32 = -120.0;

/// Time constant of the RMS integrator
const RMS_TIME_CONSTANT_SECS: f64 = 3.0;

/// Peak release rate
const PEAK_RELEASE_DB_PER_SEC: f32 = 20.0 / 1.7;

/// Magnitude counted as an over
const FULL_SCALE: f32 = 1.0;

/// Convert a linear magnitude to dBFS, bounded to `FLOOR_DB..=0`.
pub fn to_dbfs(magnitude: f32) -> f32 {
    if magnitude <= 0.0 || magnitude.is_nan() {
        return FLOOR_DB;
    }
    (20.0 * magnitude.log10()).clamp(FLOOR_DB, 0.0)
}

/// A committed, self-consistent reading of the meter
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeterSnapshot {
    pub rms: f32,
    pub peak: f32,
    pub max_peak: f32,
    pub overs: u32,
    pub frames: u64,
    pub sample_rate: u32,
}

impl MeterSnapshot {
    /// Reading of a meter that has not processed anything yet
    #[cfg(test)]
    pub fn silent(sample_rate: u32) -> Self {
        Self {
            rms: FLOOR_DB,
            peak: FLOOR_DB,
            max_peak: FLOOR_DB,
            overs: 0,
            frames: 0,
            sample_rate,
        }
    }

    /// Stream time covered by this reading
    pub fn elapsed_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / f64::from(self.sample_rate)
    }
}

#[derive(Clone, Debug)]
pub struct MeterState {
    sample_rate: u32,
    /// Weight of each new squared sample in the mean-square average
    rms_weight: f64,
    /// Peak release per frame, in dB
    release_per_frame: f32,
    mean_square: f64,
    rms: f32,
    peak: f32,
    max_peak: f32,
    overs: u32,
    frames: u64,
}

impl MeterState {
    /// Create the state for a stream running at `sample_rate` frames per second.
    pub fn new(sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(MeterError::InvalidSampleRate(sample_rate));
        }

        let rate = f64::from(sample_rate);
        let rms_weight = 1.0 - (-1.0 / (RMS_TIME_CONSTANT_SECS * rate)).exp();

        Ok(Self {
            sample_rate,
            rms_weight,
            release_per_frame: PEAK_RELEASE_DB_PER_SEC / sample_rate as f32,
            mean_square: 0.0,
            rms: FLOOR_DB,
            peak: FLOOR_DB,
            max_peak: FLOOR_DB,
            overs: 0,
            frames: 0,
        })
    }

    /// Fold one block of mono samples into the statistics.
    ///
    /// Runs on the real-time thread: no allocation, no locking, one pass.
    /// An empty block leaves the state untouched.
    pub fn update<I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = f32>,
    {
        let mut n: u64 = 0;
        let mut block_peak = 0.0f32;
        let mut overs: u32 = 0;

        for x in samples {
            n += 1;
            let magnitude = x.abs();
            if magnitude >= FULL_SCALE {
                overs = overs.saturating_add(1);
            }

            // NaN carries no energy, infinity is clipped to full scale
            let magnitude = if magnitude.is_nan() {
                0.0
            } else if magnitude.is_infinite() {
                FULL_SCALE
            } else {
                magnitude
            };

            block_peak = block_peak.max(magnitude);
            let energy = f64::from(magnitude) * f64::from(magnitude);
            self.mean_square += (energy - self.mean_square) * self.rms_weight;
        }

        if n == 0 {
            return;
        }

        let released = self.peak - self.release_per_frame * n as f32;
        self.peak = to_dbfs(block_peak).max(released).max(FLOOR_DB);
        self.max_peak = self.max_peak.max(self.peak);
        self.rms = to_dbfs(self.mean_square.sqrt() as f32);
        self.overs = self.overs.saturating_add(overs);
        self.frames += n;
    }

    /// Clear the peak statistics and the over count.
    ///
    /// RMS and the frame counter keep running.
    pub fn reset(&mut self) {
        self.peak = FLOOR_DB;
        self.max_peak = FLOOR_DB;
        self.overs = 0;
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            rms: self.rms,
            peak: self.peak,
            max_peak: self.max_peak,
            overs: self.overs,
            frames: self.frames,
            sample_rate: self.sample_rate,
        }
    }
}

#[cfg(test)]
impl MeterState {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn rms(&self) -> f32 {
        self.rms
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn max_peak(&self) -> f32 {
        self.max_peak
    }

    pub fn overs(&self) -> u32 {
        self.overs
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
