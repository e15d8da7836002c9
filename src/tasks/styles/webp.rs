//! Add `.webp` variants of rules whose background points at a PNG or JPEG.
//!
//! ```css
//! .hero {
//!   background: url("../img/hero.jpg") no-repeat;
//! }
//! .webp .hero {
//!   background: url("../img/hero.webp") no-repeat;
//! }
//! ```
//!
//! Runs on expanded compiler output, one innermost `{}` block at a time, so
//! rules nested in `@media` get their variant inside the same query.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::tasks::markup::webp_path;

/// Innermost block: prelude (selector) and body without nested braces.
static BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^{}]*)\{([^{}]*)\}").expect("static regex"));

/// A `background` / `background-image` declaration.
static DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(background(?:-image)?)\s*:\s*([^;]*)").expect("static regex")
});

/// `url(...)` with optional quotes.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(["']?)([^"')]+)(["']?)\s*\)"#).expect("static regex")
});

/// Keyframe selectors (`from`, `to`, `50%`) cannot take a class prefix.
static KEYFRAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(from|to|[\d.]+%)(\s*,\s*(from|to|[\d.]+%))*$").expect("static regex")
});

const WEBP_CLASS: &str = ".webp";

pub fn rewrite(css: &str) -> String {
    BLOCK_RE
        .replace_all(css, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let selector = clean_selector(&caps[1]);
            if selector.is_empty() || selector.starts_with('@') || KEYFRAME_RE.is_match(selector)
            {
                return whole.to_string();
            }

            let decls: Vec<String> = DECL_RE
                .captures_iter(&caps[2])
                .filter_map(|d| {
                    let value = swap_urls(&d[2])?;
                    Some(format!("  {}: {};", &d[1], value.trim()))
                })
                .collect();
            if decls.is_empty() {
                return whole.to_string();
            }

            let prefixed = selector
                .split(',')
                .map(|s| format!("{WEBP_CLASS} {}", s.trim()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{whole}\n{prefixed} {{\n{}\n}}", decls.join("\n"))
        })
        .into_owned()
}

/// Selector text of a block prelude, minus leading comments, statements
/// such as `@charset` and `@import`, and whitespace.
fn clean_selector(prelude: &str) -> &str {
    let start = [prelude.rfind("*/").map(|i| i + 2), prelude.rfind(';').map(|i| i + 1)]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0);
    prelude[start..].trim()
}

/// Replace raster URLs with WebP ones; `None` when nothing changed.
fn swap_urls(value: &str) -> Option<String> {
    let mut changed = false;
    let out = URL_RE.replace_all(value, |u: &Captures<'_>| match webp_path(&u[2]) {
        Some(webp) => {
            changed = true;
            format!("url({}{}{})", &u[1], webp, &u[3])
        }
        None => u[0].to_string(),
    });
    changed.then(|| out.into_owned())
}
