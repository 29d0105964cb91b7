use serde::Serialize;
use std::collections::BTreeMap;

use super::TrafficSample;

/// Latest traffic snapshot per node address (last write wins).
///
/// Backed by a `BTreeMap` so iteration is ordered by address; winner
/// selection relies on that order to break score ties.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct TrafficRegistry {
    entries: BTreeMap<String, TrafficSample>,
}

impl TrafficRegistry {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Overwrite the entry for `address`. Returns the previous sample, if any.
    pub fn register(
        &mut self,
        address: impl Into<String>,
        sample: TrafficSample,
    ) -> Option<TrafficSample> {
        self.entries.insert(address.into(), sample)
    }

    pub fn get(&self, address: &str) -> Option<&TrafficSample> {
        self.entries.get(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TrafficSample)> {
        self.entries.iter()
    }

    /// Stable JSON encoding of the whole registry, used as seed material.
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(&self.entries).expect("serialize registry")
    }
}

#[cfg(test)]
mod tests {
    use super::{TrafficRegistry, TrafficSample};

    #[test]
    fn register_overwrites_instead_of_accumulating() {
        let mut reg = TrafficRegistry::new();
        assert!(reg.register("peer", TrafficSample::new(10, 10)).is_none());
        let prev = reg.register("peer", TrafficSample::new(1, 2));
        assert_eq!(prev, Some(TrafficSample::new(10, 10)));
        assert_eq!(reg.get("peer"), Some(&TrafficSample::new(1, 2)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn iteration_is_ordered_by_address() {
        let mut reg = TrafficRegistry::new();
        reg.register("zeta", TrafficSample::zero());
        reg.register("alpha", TrafficSample::zero());
        reg.register("mid", TrafficSample::zero());
        let keys: Vec<_> = reg.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn canonical_json_lists_every_entry() {
        let mut reg = TrafficRegistry::new();
        assert_eq!(reg.canonical_json(), "{}");
        reg.register("peer", TrafficSample::new(3, 4));
        assert_eq!(
            reg.canonical_json(),
            r#"{"peer":{"packets_in":3,"packets_out":4}}"#
        );
    }

    #[test]
    fn canonical_json_is_order_independent() {
        let mut a = TrafficRegistry::new();
        a.register("x", TrafficSample::new(1, 1));
        a.register("y", TrafficSample::new(2, 2));
        let mut b = TrafficRegistry::new();
        b.register("y", TrafficSample::new(2, 2));
        b.register("x", TrafficSample::new(1, 1));
        assert_eq!(a.canonical_json(), b.canonical_json());
    }
}
