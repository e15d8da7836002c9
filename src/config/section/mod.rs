//! Configuration sections of `assetline.toml`.
//!
//! Every section is `#[serde(default)]`, so an absent file or an empty
//! table reproduces the built-in layout.

pub(crate) mod fonts;
mod images;
mod markup;
mod paths;
mod scripts;
mod serve;
mod styles;

pub use fonts::FontsConfig;
pub use images::ImagesConfig;
pub use markup::MarkupConfig;
pub use paths::PathsConfig;
pub use scripts::ScriptsConfig;
pub use serve::ServeConfig;
pub use styles::StylesConfig;
pub use fonts::{INPUT, OUTPUT};
