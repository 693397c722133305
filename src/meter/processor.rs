//! Real-time audio callback body.

use super::shared::SharedMeter;
use super::signal::Notifier;
use super::state::{MeterSnapshot, MeterState};
use rtrb::Producer;
use std::sync::Arc;

/// Owns the meter state for the lifetime of the stream.
///
/// Moved into the audio callback; every method here runs on the real-time
/// thread and must not block, lock, or allocate.
pub struct MeterProcessor {
    state: MeterState,
    channels: usize,
    shared: Arc<SharedMeter>,
    ready: Notifier,
    readings: Option<Producer<MeterSnapshot>>,
}

impl MeterProcessor {
    /// `readings` receives every block's snapshot when a consumer wants them
    /// all (dump mode); the signal is then posted only for queued readings.
    pub fn new(
        state: MeterState,
        channels: u16,
        shared: Arc<SharedMeter>,
        ready: Notifier,
        readings: Option<Producer<MeterSnapshot>>,
    ) -> Self {
        Self {
            state,
            channels: usize::from(channels.max(1)),
            shared,
            ready,
            readings,
        }
    }

    /// Process one block of interleaved samples; channel 0 is metered.
    pub fn process(&mut self, data: &[f32]) {
        if data.is_empty() {
            return;
        }

        if self.shared.take_reset() {
            self.state.reset();
        }

        self.state.update(data.iter().step_by(self.channels).copied());

        let snap = self.state.snapshot();
        self.shared.publish(&snap);

        match self.readings.as_mut() {
            Some(queue) => {
                // Full queue: the consumer is behind, drop this reading
                if queue.push(snap).is_ok() {
                    self.ready.post();
                }
            }
            None => {
                self.ready.post();
            }
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &MeterState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::signal::{signal, Waiter};
    use crate::meter::state::FLOOR_DB;
    use rtrb::{Consumer, RingBuffer};

    type Harness = (MeterProcessor, Arc<SharedMeter>, Waiter, Consumer<MeterSnapshot>);

    fn processor(channels: u16, queue: usize) -> Harness {
        let state = MeterState::new(48_000).unwrap();
        let shared = Arc::new(SharedMeter::new(state.snapshot()));
        let (notifier, waiter) = signal(queue);
        let (producer, consumer) = RingBuffer::new(queue);
        let processor = MeterProcessor::new(
            state,
            channels,
            Arc::clone(&shared),
            notifier,
            Some(producer),
        );
        (processor, shared, waiter, consumer)
    }

    #[test]
    fn block_is_published_queued_and_signalled() {
        let (mut processor, shared, waiter, mut readings) = processor(1, 16);
        processor.process(&[0.5, -1.0, 0.25]);

        let snap = shared.snapshot();
        assert_eq!(snap.frames, 3);
        assert_eq!(snap.overs, 1);
        assert_eq!(waiter.wait(), Ok(()));
        assert_eq!(readings.pop().unwrap(), snap);
    }

    #[test]
    fn empty_block_does_nothing() {
        let (mut processor, shared, waiter, readings) = processor(1, 16);
        processor.process(&[]);
        assert_eq!(shared.snapshot().frames, 0);
        assert_eq!(waiter.pending(), 0);
        assert!(readings.is_empty());
    }

    #[test]
    fn only_first_channel_is_metered() {
        let (mut processor, shared, _waiter, _readings) = processor(2, 16);
        // Right channel clips, left stays quiet
        processor.process(&[0.1, 1.0, -0.1, -1.0, 0.1, 1.0]);
        let snap = shared.snapshot();
        assert_eq!(snap.frames, 3);
        assert_eq!(snap.overs, 0);
    }

    #[test]
    fn reset_request_is_applied_by_next_block() {
        let (mut processor, shared, _waiter, _readings) = processor(1, 16);
        processor.process(&[1.0, 1.0, 1.0]);
        assert_eq!(shared.snapshot().overs, 3);

        shared.request_reset();
        // Not applied until the callback runs again
        assert_eq!(shared.snapshot().overs, 3);

        processor.process(&[0.0; 4]);
        let snap = shared.snapshot();
        assert_eq!(snap.overs, 0);
        assert_eq!(snap.peak, FLOOR_DB);
        assert_eq!(snap.max_peak, FLOOR_DB);
        assert_eq!(snap.frames, 7);
    }

    #[test]
    fn full_queue_drops_readings_without_signalling() {
        let (mut processor, _shared, waiter, readings) = processor(1, 2);
        for _ in 0..5 {
            processor.process(&[0.1; 8]);
        }
        assert_eq!(readings.slots(), 2);
        assert_eq!(waiter.pending(), 2);
        assert_eq!(processor.state().frames(), 40);
    }

    #[test]
    fn without_queue_every_block_signals() {
        let state = MeterState::new(48_000).unwrap();
        let shared = Arc::new(SharedMeter::new(state.snapshot()));
        let (notifier, waiter) = signal(64);
        let mut processor = MeterProcessor::new(state, 1, shared, notifier, None);
        for _ in 0..3 {
            processor.process(&[0.2; 16]);
        }
        assert_eq!(waiter.pending(), 3);
    }
}
