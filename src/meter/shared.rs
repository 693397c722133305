//! Lock-free publication of meter readings.
//!
//! The audio callback is the single writer; it publishes each snapshot under a
//! sequence counter (odd while a write is in progress). Readers retry until
//! they observe the same even sequence before and after copying the fields,
//! so a snapshot is never torn across fields and the writer never waits.
//!
//! Reset requests travel the other way through a single flag that the
//! callback consumes, keeping the audio thread the only writer of state.

use super::state::MeterSnapshot;
use std::sync::atomic::{fence, AtomicBool, AtomicU32, AtomicU64, Ordering};

pub struct SharedMeter {
    sample_rate: u32,
    seq: AtomicU64,
    // f32 bits
    rms: AtomicU32,
    peak: AtomicU32,
    max_peak: AtomicU32,
    overs: AtomicU32,
    frames: AtomicU64,
    reset_requested: AtomicBool,
}

impl SharedMeter {
    pub fn new(initial: MeterSnapshot) -> Self {
        Self {
            sample_rate: initial.sample_rate,
            seq: AtomicU64::new(0),
            rms: AtomicU32::new(initial.rms.to_bits()),
            peak: AtomicU32::new(initial.peak.to_bits()),
            max_peak: AtomicU32::new(initial.max_peak.to_bits()),
            overs: AtomicU32::new(initial.overs),
            frames: AtomicU64::new(initial.frames),
            reset_requested: AtomicBool::new(false),
        }
    }

    /// Publish a new reading. Must only be called from the one writer thread.
    pub fn publish(&self, snap: &MeterSnapshot) {
        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        self.rms.store(snap.rms.to_bits(), Ordering::Relaxed);
        self.peak.store(snap.peak.to_bits(), Ordering::Relaxed);
        self.max_peak.store(snap.max_peak.to_bits(), Ordering::Relaxed);
        self.overs.store(snap.overs, Ordering::Relaxed);
        self.frames.store(snap.frames, Ordering::Relaxed);

        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    /// Copy the latest committed reading.
    pub fn snapshot(&self) -> MeterSnapshot {
        loop {
            let before = self.seq.load(Ordering::Acquire);
            if before % 2 == 1 {
                std::hint::spin_loop();
                continue;
            }

            let snap = MeterSnapshot {
                rms: f32::from_bits(self.rms.load(Ordering::Relaxed)),
                peak: f32::from_bits(self.peak.load(Ordering::Relaxed)),
                max_peak: f32::from_bits(self.max_peak.load(Ordering::Relaxed)),
                overs: self.overs.load(Ordering::Relaxed),
                frames: self.frames.load(Ordering::Relaxed),
                sample_rate: self.sample_rate,
            };

            fence(Ordering::Acquire);
            if self.seq.load(Ordering::Relaxed) == before {
                return snap;
            }
            std::hint::spin_loop();
        }
    }

    /// Ask the writer to clear peaks and overs before its next block.
    pub fn request_reset(&self) {
        self.reset_requested.store(true, Ordering::Release);
    }

    /// Consume a pending reset request (writer side).
    pub fn take_reset(&self) -> bool {
        self.reset_requested.swap(false, Ordering::Acquire)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
