//! Command-line interface definitions.

use clap::{ColorChoice, Parser, ValueEnum};
use std::path::PathBuf;

/// Front-end asset pipeline: markup, styles, scripts, images, fonts, sprites
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Task or pipeline to run
    #[arg(value_enum, default_value_t = Target::Dev)]
    pub target: Target,

    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Print debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: assetline.toml)
    #[arg(short = 'C', long, default_value = "assetline.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Port for the preview server
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Open the preview in a browser once the server is up
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub open: Option<bool>,
}

/// Every task and pipeline that can be invoked by name.
///
/// The camelCase aliases keep old invocations working (`svgSprites`, ...).
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Remove the build root
    Clean,
    /// Expand includes in top-level markup
    Html,
    /// Compile the entry stylesheet (development)
    Css,
    /// Compile the entry stylesheet with a minified copy
    #[value(alias = "cssProd")]
    CssProd,
    /// Bundle scripts in watch mode
    Js,
    /// Bundle and minify scripts
    #[value(alias = "jsProd")]
    JsProd,
    /// Copy images and add WebP variants
    Images,
    /// Same as `images`, plus optimization of the originals
    #[value(alias = "imagesProd")]
    ImagesProd,
    /// Convert TrueType fonts to WOFF and WOFF2
    Fonts,
    /// Regenerate the font include manifest when it is empty
    #[value(alias = "fontsStyle")]
    FontsStyle,
    /// Convert OpenType fonts to TrueType inside the source tree
    Otf2ttf,
    /// Pack icons into a stacked sprite with an example page
    #[value(alias = "svgSprites")]
    SvgSprites,
    /// Pack icons into a stacked sprite
    #[value(alias = "svgSpritesProd")]
    SvgSpritesProd,
    /// Watch sources and re-run the matching task
    Watch,
    /// Serve the build root with live reload
    Serve,
    /// clean, fonts, all development tasks, watch, serve
    Dev,
    /// clean, all production tasks
    Prod,
    /// otf2ttf, then fonts-style
    Start,
}

impl Target {
    /// Name as written on the command line.
    pub fn name(self) -> String {
        self.to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default()
    }

    /// Whether this target keeps the process alive after its tasks finish.
    pub const fn is_resident(self) -> bool {
        matches!(self, Self::Dev | Self::Serve | Self::Watch | Self::Js)
    }
}
