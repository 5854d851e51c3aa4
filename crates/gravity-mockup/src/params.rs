use gravity_core::constants::DEFAULT_MOCKUP_DATAFEEDS;
use serde::{Deserialize, Serialize};

/// Sizes and RNG seed for a mockup fill.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MockupParams {
    pub nebulas: usize,
    pub nodes: usize,
    pub datafeeds: usize,
    /// Rewards and history entries written per node.
    pub events_per_node: usize,
    /// Same seed, same data.
    pub seed: u64,
}

impl Default for MockupParams {
    fn default() -> Self {
        Self {
            nebulas: 12,
            nodes: 40,
            datafeeds: DEFAULT_MOCKUP_DATAFEEDS,
            events_per_node: 5,
            seed: 0x6772_6176,
        }
    }
}
