//! `[paths]` section configuration.
//!
//! ```toml
//! [paths]
//! source = "#src"       # source root, relative to the invocation directory
//! build = "dist"        # build root (default: invocation directory name)
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source and build roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Source root.
    pub source: PathBuf,

    /// Build root. `None` means "named after the invocation directory".
    pub build: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("#src"),
            build: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::config::test_parse_config;

    #[test]
    fn test_paths_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.paths.source, PathBuf::from("#src"));
        assert!(config.paths.build.is_none());
    }

    #[test]
    fn test_paths_override() {
        let config = test_parse_config("[paths]\nsource = \"src\"\nbuild = \"public\"");
        assert_eq!(config.paths.source, PathBuf::from("src"));
        assert_eq!(config.paths.build, Some(PathBuf::from("public")));
    }
}
