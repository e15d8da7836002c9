//! `[styles]` section configuration.
//!
//! ```toml
//! [styles]
//! browsers = ["last 5 versions"]   # browserslist queries for vendor prefixes
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylesConfig {
    /// Browserslist queries used to pick vendor prefixes.
    pub browsers: Vec<String>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            browsers: vec!["last 5 versions".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_styles_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.styles.browsers, vec!["last 5 versions"]);
    }

    #[test]
    fn test_styles_browsers() {
        let config = test_parse_config("[styles]\nbrowsers = [\"> 1%\", \"not dead\"]");
        assert_eq!(config.styles.browsers.len(), 2);
    }
}
