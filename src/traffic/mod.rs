pub mod meter;
pub mod registry;
pub mod sample;

pub use meter::{TrafficMeter, spawn_simulated_capture};
pub use registry::TrafficRegistry;
pub use sample::TrafficSample;

/// How many drained samples the meter keeps for display.
pub const METER_HISTORY_LEN: usize = 10;
