//! `[markup]` section configuration.

use serde::{Deserialize, Serialize};

/// Markup include settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkupConfig {
    /// Directive prefix: `@` gives `@include('header.html')`.
    pub include_prefix: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            include_prefix: "@".to_string(),
        }
    }
}
