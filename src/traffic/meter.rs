use log::{debug, info};
use rand::Rng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{METER_HISTORY_LEN, TrafficSample};

/// Local packet counters fed by the capture collaborator.
///
/// Counters are atomics shared with the capture thread; `take_sample` swaps
/// each back to zero in one step, so no increment is lost or double counted.
#[derive(Debug, Default)]
pub struct TrafficMeter {
    packets_in: AtomicU64,
    packets_out: AtomicU64,
    running: AtomicBool,
    history: Mutex<VecDeque<TrafficSample>>,
}

impl TrafficMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) {
        if !self.running.swap(true, Ordering::SeqCst) {
            info!("traffic meter started");
        }
    }

    /// Cooperative stop: later `record_*` calls become no-ops, counts
    /// already recorded stay intact until drained.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("traffic meter stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn record_inbound(&self, packets: u64) {
        if self.is_running() {
            self.packets_in.fetch_add(packets, Ordering::Relaxed);
        }
    }

    pub fn record_outbound(&self, packets: u64) {
        if self.is_running() {
            self.packets_out.fetch_add(packets, Ordering::Relaxed);
        }
    }

    /// Counts accumulated since the last drain, without resetting them.
    pub fn peek(&self) -> TrafficSample {
        TrafficSample::new(
            self.packets_in.load(Ordering::Relaxed),
            self.packets_out.load(Ordering::Relaxed),
        )
    }

    /// Drain the counters into a sample and remember it in the history.
    pub fn take_sample(&self) -> TrafficSample {
        let sample = TrafficSample::new(
            self.packets_in.swap(0, Ordering::Relaxed),
            self.packets_out.swap(0, Ordering::Relaxed),
        );
        let mut history = self.history.lock().expect("mutex poisoned");
        if history.len() == METER_HISTORY_LEN {
            history.pop_front();
        }
        history.push_back(sample);
        sample
    }

    /// Most recent drained samples, oldest first.
    pub fn history(&self) -> Vec<TrafficSample> {
        let history = self.history.lock().expect("mutex poisoned");
        history.iter().copied().collect()
    }
}

/// Stand-in for real packet capture: feeds random counts into `meter`
/// every `period` until the meter is stopped.
pub fn spawn_simulated_capture(meter: Arc<TrafficMeter>, period: Duration) -> JoinHandle<()> {
    meter.start();
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        while meter.is_running() {
            let inbound = rng.gen_range(0..50);
            let outbound = rng.gen_range(0..50);
            meter.record_inbound(inbound);
            meter.record_outbound(outbound);
            thread::sleep(period);
        }
        debug!("simulated capture loop exited");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_sample_drains_counters() {
        let meter = TrafficMeter::new();
        meter.start();
        meter.record_inbound(7);
        meter.record_outbound(3);
        assert_eq!(meter.peek(), TrafficSample::new(7, 3));
        assert_eq!(meter.take_sample(), TrafficSample::new(7, 3));
        assert_eq!(meter.take_sample(), TrafficSample::zero());
    }

    #[test]
    fn recording_is_ignored_until_started_and_after_stop() {
        let meter = TrafficMeter::new();
        meter.record_inbound(5);
        assert_eq!(meter.peek(), TrafficSample::zero());

        meter.start();
        meter.record_inbound(5);
        meter.stop();
        meter.record_inbound(100);
        assert_eq!(meter.take_sample(), TrafficSample::new(5, 0));
    }

    #[test]
    fn history_is_bounded() {
        let meter = TrafficMeter::new();
        meter.start();
        for i in 0..(METER_HISTORY_LEN as u64 + 3) {
            meter.record_inbound(i);
            meter.take_sample();
        }
        let history = meter.history();
        assert_eq!(history.len(), METER_HISTORY_LEN);
        assert_eq!(history[0].packets_in, 3);
    }

    #[test]
    fn simulated_capture_stops_cooperatively() {
        let meter = Arc::new(TrafficMeter::new());
        let handle = spawn_simulated_capture(meter.clone(), Duration::from_millis(1));
        thread::sleep(Duration::from_millis(20));
        meter.stop();
        handle.join().expect("capture thread panicked");
        assert!(!meter.is_running());

        let before = meter.peek();
        meter.record_outbound(10);
        assert_eq!(meter.peek(), before);
    }
}
