use actix_web::rt::time;
use chrono::{DateTime, Utc};
use log::error;
use std::sync::Arc;
use std::time::Duration;

use super::ConsensusEngine;
use crate::blockchain::LedgerError;
use crate::traffic::TrafficMeter;

/// One driver tick. The local meter is only drained once a mint is due, so
/// the sample handed to the round covers the whole interval.
pub fn tick(
    engine: &ConsensusEngine,
    meter: &TrafficMeter,
    now: DateTime<Utc>,
) -> Result<bool, LedgerError> {
    if !meter.is_running() || !engine.is_mint_due(now) {
        return Ok(false);
    }
    let sample = meter.take_sample();
    engine.try_mint_block_at(sample, now)
}

/// Periodic consensus loop; runs until the runtime shuts down.
pub async fn run(engine: Arc<ConsensusEngine>, meter: Arc<TrafficMeter>, period: Duration) {
    let mut ticker = time::interval(period);
    loop {
        ticker.tick().await;
        if let Err(e) = tick(&engine, &meter, Utc::now()) {
            error!("mint tick failed: {e}");
        }
    }
}
