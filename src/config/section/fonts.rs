//! `[fonts]` section configuration.
//!
//! Converters are external programs. Each command is a list of arguments in
//! which `{input}` and `{output}` are replaced per file.
//!
//! ```toml
//! [fonts]
//! woff = ["fonttools", "ttLib", "--flavor", "woff", "-o", "{output}", "{input}"]
//! manifest = "scss/fonts.scss"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const INPUT: &str = "{input}";
pub const OUTPUT: &str = "{output}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontsConfig {
    /// TTF → WOFF command template.
    pub woff: Vec<String>,

    /// TTF → WOFF2 command template.
    pub woff2: Vec<String>,

    /// OTF → TTF command template.
    pub otf2ttf: Vec<String>,

    /// Include manifest, relative to the source root.
    pub manifest: PathBuf,
}

fn template(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| (*s).to_string()).collect()
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            woff: template(&[
                "fonttools", "ttLib", "--flavor", "woff", "-o", OUTPUT, INPUT,
            ]),
            woff2: template(&[
                "fonttools", "ttLib", "--flavor", "woff2", "-o", OUTPUT, INPUT,
            ]),
            otf2ttf: template(&[
                "fontforge",
                "-lang=ff",
                "-c",
                "Open($1); Generate($2)",
                INPUT,
                OUTPUT,
            ]),
            manifest: PathBuf::from("scss/fonts.scss"),
        }
    }
}

impl FontsConfig {
    /// Fill a command template for one conversion.
    pub fn render(template: &[String], input: &str, output: &str) -> Vec<String> {
        template
            .iter()
            .map(|arg| arg.replace(INPUT, input).replace(OUTPUT, output))
            .collect()
    }
}
