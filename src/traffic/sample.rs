use serde::{Deserialize, Serialize};

/// Packet counts observed by one node over one minting interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrafficSample {
    pub packets_in: u64,
    pub packets_out: u64,
}

impl TrafficSample {
    pub fn new(packets_in: u64, packets_out: u64) -> Self {
        Self {
            packets_in,
            packets_out,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Raw PoT score input: inbound plus outbound packets.
    pub fn total(&self) -> u64 {
        self.packets_in.saturating_add(self.packets_out)
    }
}
