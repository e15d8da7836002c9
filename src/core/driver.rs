//! Build mode configuration for production/development builds.

/// Build mode configuration.
///
/// Every transform task exists in two variants; the variant is selected by
/// the mode carried in the task context rather than by separate code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Emit source maps (inline for scripts, sidecar `.map` for styles).
    pub source_maps: bool,

    /// Emit minified artifacts and run lossless/lossy optimizers.
    pub minify: bool,

    /// Notify the live-reload channel after writing output.
    pub live_reload: bool,
}

impl BuildMode {
    /// Production mode: minified output, no maps, no reload.
    pub const PRODUCTION: Self = Self {
        source_maps: false,
        minify: true,
        live_reload: false,
    };

    /// Development mode: readable output with maps and live reload.
    pub const DEVELOPMENT: Self = Self {
        source_maps: true,
        minify: false,
        live_reload: true,
    };

    /// Check if this is development mode.
    #[inline]
    pub const fn is_dev(&self) -> bool {
        !self.minify
    }

    /// Short label used in log lines.
    pub const fn label(&self) -> &'static str {
        if self.is_dev() { "dev" } else { "prod" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_are_distinct() {
        assert!(BuildMode::DEVELOPMENT.is_dev());
        assert!(!BuildMode::PRODUCTION.is_dev());
        assert_ne!(BuildMode::DEVELOPMENT, BuildMode::PRODUCTION);
    }

    #[test]
    fn test_production_has_no_reload_or_maps() {
        let mode = BuildMode::PRODUCTION;
        assert!(!mode.live_reload);
        assert!(!mode.source_maps);
        assert_eq!(mode.label(), "prod");
    }
}
