//! Real-time metering engine
//!
//! The audio callback owns a [`MeterProcessor`]; the consumer reads
//! [`MeterSnapshot`]s from a [`SharedMeter`] and, in dump mode, waits on the
//! readiness [`signal`].

pub mod processor;
pub mod scale;
pub mod shared;
pub mod signal;
pub mod state;

pub use processor::MeterProcessor;
pub use scale::{scale, Zone, METER_WIDTH};
pub use shared::SharedMeter;
pub use signal::{signal, Notifier, Waiter};
pub use state::{MeterSnapshot, MeterState, FLOOR_DB};
