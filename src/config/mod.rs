//! Project configuration from `assetline.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── paths      # [paths]
//! │   ├── serve      # [serve]
//! │   ├── markup     # [markup]
//! │   ├── styles     # [styles]
//! │   ├── scripts    # [scripts]
//! │   ├── images     # [images]
//! │   └── fonts      # [fonts]
//! ├── types/         # ConfigError, diagnostics, field paths
//! └── mod.rs         # Config (this file)
//! ```
//!
//! The file is optional. Without it every value takes its default, which
//! reproduces the fixed `#src` → `<project name>/` layout.

pub mod section;
pub mod types;

pub use section::{
    FontsConfig, ImagesConfig, MarkupConfig, PathsConfig, ScriptsConfig, ServeConfig,
    StylesConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{cli::Cli, debug, paths::PathMap};
use anyhow::{Context, Result};
use lightningcss::targets::Browsers;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing assetline.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Invocation directory; all relative paths resolve against it (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub markup: MarkupConfig,

    #[serde(default)]
    pub styles: StylesConfig,

    #[serde(default)]
    pub scripts: ScriptsConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub fonts: FontsConfig,
}

impl Config {
    /// Load configuration for the current invocation.
    ///
    /// Reads `cli.config` relative to the working directory when present,
    /// applies CLI overrides, then validates.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let config_path = cwd.join(&cli.config);

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            debug!("config"; "{} not found, using defaults", cli.config.display());
            Self::default()
        };

        debug!("config"; "root {}", cwd.display());
        config.root = cwd;
        config.apply_cli(cli);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content).with_context(|| format!("in {}", path.display()))
    }

    fn apply_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.serve.port, cli.port.as_ref());
        Self::update_option(&mut self.serve.open, cli.open.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Build root: `[paths] build`, or a directory named after the project.
    pub fn build_root(&self) -> PathBuf {
        match &self.paths.build {
            Some(build) => self.root.join(build),
            None => {
                let name = self
                    .root
                    .file_name()
                    .map(|n| n.to_os_string())
                    .unwrap_or_else(|| "dist".into());
                self.root.join(name)
            }
        }
    }

    /// Source root resolved against the invocation directory.
    pub fn source_root(&self) -> PathBuf {
        self.root.join(&self.paths.source)
    }

    /// Path Map for this project.
    pub fn path_map(&self) -> PathMap {
        PathMap::new(&self.source_root(), &self.build_root())
    }

    /// Browserslist targets for vendor prefixing.
    ///
    /// Queries are checked by `validate`, so a failure here yields `None`
    /// (no prefixing) instead of an error.
    pub fn browsers(&self) -> Option<Browsers> {
        Browsers::from_browserslist(self.styles.browsers.iter().map(String::as_str))
            .ok()
            .flatten()
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Collect every problem in one pass and fail with all of them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if self.images.quality > 100 {
            diag.error(
                FieldPath::new("images.quality"),
                format!("{} is out of range 0..=100", self.images.quality),
            );
        }
        if self.images.optimization_level > 6 {
            diag.error(
                FieldPath::new("images.optimization_level"),
                format!("{} is out of range 0..=6", self.images.optimization_level),
            );
        }
        if self.serve.port == self.serve.reload_port {
            diag.error_with_hint(
                FieldPath::new("serve.reload_port"),
                "must differ from serve.port",
                format!("the default live-reload port is {}", ServeConfig::default().reload_port),
            );
        }
        if self.markup.include_prefix.is_empty() {
            diag.error(FieldPath::new("markup.include_prefix"), "must not be empty");
        }
        if self.scripts.output.is_empty() || self.scripts.output.contains(['/', '\\']) {
            diag.error(
                FieldPath::new("scripts.output"),
                "must be a plain file name",
            );
        }

        match self.scripts.bundler.first() {
            None => diag.error(FieldPath::new("scripts.bundler"), "must name a program"),
            Some(program) if which::which(program).is_err() => diag.hint(
                FieldPath::new("scripts.bundler"),
                format!("`{program}` not found in PATH, script tasks will fail"),
            ),
            Some(_) => {}
        }

        for (field, template) in [
            (FieldPath::new("fonts.woff"), &self.fonts.woff),
            (FieldPath::new("fonts.woff2"), &self.fonts.woff2),
            (FieldPath::new("fonts.otf2ttf"), &self.fonts.otf2ttf),
        ] {
            Self::check_template(&mut diag, field, template);
        }

        if let Err(e) =
            Browsers::from_browserslist(self.styles.browsers.iter().map(String::as_str))
        {
            diag.error_with_hint(
                FieldPath::new("styles.browsers"),
                format!("invalid query: {e}"),
                "see https://browsersl.ist for the query syntax",
            );
        }

        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    fn check_template(diag: &mut ConfigDiagnostics, field: FieldPath, template: &[String]) {
        if template.is_empty() {
            diag.error(field, "must name a program");
            return;
        }
        let has = |placeholder: &str| template.iter().any(|arg| arg.contains(placeholder));
        if !has(section::INPUT) || !has(section::OUTPUT) {
            diag.error_with_hint(
                field,
                "command template is missing a placeholder",
                "use `{input}` and `{output}` where the file paths go",
            );
        }
    }
}

/// Parse a config snippet in tests, panicking on error.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    Config::from_str(content).expect("config should parse")
}
