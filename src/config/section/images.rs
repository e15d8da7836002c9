//! `[images]` section configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// WebP quality factor, 0..=100.
    pub quality: u8,

    /// PNG optimization preset, 0..=6.
    pub optimization_level: u8,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            quality: 70,
            optimization_level: 3,
        }
    }
}
