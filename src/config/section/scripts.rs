//! `[scripts]` section configuration.
//!
//! ```toml
//! [scripts]
//! bundler = ["esbuild"]          # command (and leading args) of the bundler
//! target = "es2015"              # syntax lowering target
//! output = "script.min.js"       # fixed output file name
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptsConfig {
    /// Bundler executable followed by leading arguments.
    pub bundler: Vec<String>,

    /// Language level the bundle is lowered to.
    pub target: String,

    /// Output file name under the build `js` directory.
    pub output: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            bundler: vec!["esbuild".to_string()],
            target: "es2015".to_string(),
            output: "script.min.js".to_string(),
        }
    }
}
