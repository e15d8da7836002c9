//! Wrap raster `<img>` tags in `<picture>` with a WebP `<source>`.
//!
//! ```html
//! <img src="img/logo.png" alt="">
//! <!-- becomes -->
//! <picture><source srcset="img/logo.webp" type="image/webp"><img src="img/logo.png" alt=""></picture>
//! ```
//!
//! Images already inside a `<picture>` are left alone.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Existing `<picture>` blocks, or bare `<img>` tags.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<picture\b.*?</picture\s*>|<img\b[^>]*>").expect("static regex")
});

static SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("static regex")
});

/// Rewrite every eligible `<img>` in `html`.
pub fn rewrite(html: &str) -> String {
    TAG_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let tag = &caps[0];
            if tag.get(..8).is_some_and(|s| s.eq_ignore_ascii_case("<picture")) {
                return tag.to_string();
            }
            match webp_src(tag) {
                Some(webp) => format!(
                    r#"<picture><source srcset="{webp}" type="image/webp">{tag}</picture>"#
                ),
                None => tag.to_string(),
            }
        })
        .into_owned()
}

/// WebP counterpart of the tag's `src`, when it points at a PNG or JPEG.
fn webp_src(tag: &str) -> Option<String> {
    let caps = SRC_RE.captures(tag)?;
    let src = caps.get(1).or_else(|| caps.get(2))?.as_str();
    webp_path(src)
}

/// `a/b.jpg?v=2` -> `a/b.webp?v=2`; `None` for other formats.
pub fn webp_path(url: &str) -> Option<String> {
    let split = url.find(['?', '#']).unwrap_or(url.len());
    let (path, suffix) = url.split_at(split);
    let dot = path.rfind('.')?;
    let ext = &path[dot + 1..];
    if ["png", "jpg", "jpeg"]
        .iter()
        .any(|e| ext.eq_ignore_ascii_case(e))
    {
        Some(format!("{}.webp{}", &path[..dot], suffix))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_png() {
        let out = rewrite(r#"<p><img src="img/logo.png" alt="Logo"></p>"#);
        assert_eq!(
            out,
            r#"<p><picture><source srcset="img/logo.webp" type="image/webp"><img src="img/logo.png" alt="Logo"></picture></p>"#
        );
    }

    #[test]
    fn test_single_quotes_and_uppercase() {
        let out = rewrite("<IMG class='x' SRC='a/B.JPG' />");
        assert!(out.contains(r#"srcset="a/B.webp""#));
    }

    #[test]
    fn test_skips_svg_and_gif() {
        let html = r#"<img src="icon.svg"><img src="anim.gif">"#;
        assert_eq!(rewrite(html), html);
    }

    #[test]
    fn test_skips_existing_picture() {
        let html = r#"<picture><source srcset="a.avif"><img src="a.jpg"></picture>"#;
        assert_eq!(rewrite(html), html);
    }

    #[test]
    fn test_data_src_is_not_src() {
        let html = r#"<img data-src="lazy.png">"#;
        assert_eq!(rewrite(html), html);
    }

    #[test]
    fn test_webp_path_keeps_query() {
        assert_eq!(webp_path("x.jpeg?v=1#f").as_deref(), Some("x.webp?v=1#f"));
        assert_eq!(webp_path("no-extension"), None);
        assert_eq!(webp_path("x.webp"), None);
    }
}
