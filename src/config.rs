//! Configuration for the analysis pipeline

/// Settings for a full analysis run.
pub struct Config {
    /// Maximum number of community-detection levels to produce.
    pub community_levels: usize,

    /// Attribute key under which node metadata payloads are stored.
    pub metadata_key: String,

    /// Worker threads for parallel sweeps (0 = all available cores).
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            community_levels: 5,
            metadata_key: "genres".to_string(),
            threads: 0,
        }
    }
}

impl Config {
    /// Creates a configuration with custom values.
    pub fn new(community_levels: usize, metadata_key: String, threads: usize) -> Self {
        Self {
            community_levels,
            metadata_key,
            threads,
        }
    }
}
