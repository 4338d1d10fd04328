use crate::index::DEFAULT_INDEX_BUCKETS;
use crate::zipf::DEFAULT_FREQUENCY_BUCKETS;
use serde::{Deserialize, Serialize};

/// Sizing for a [`SearchEngine`](crate::SearchEngine). Bucket counts are
/// fixed for the lifetime of the tables; zero is treated as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub index_buckets: usize,
    pub frequency_buckets: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_buckets: DEFAULT_INDEX_BUCKETS,
            frequency_buckets: DEFAULT_FREQUENCY_BUCKETS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"index_buckets": 64}"#).unwrap();
        assert_eq!(cfg.index_buckets, 64);
        assert_eq!(cfg.frequency_buckets, DEFAULT_FREQUENCY_BUCKETS);
    }
}
