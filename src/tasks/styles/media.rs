//! Merge scattered `@media` blocks and move them after the plain rules.
//!
//! Blocks with identical queries are concatenated in source order. Merged
//! blocks are ordered mobile-first: `min-width` ascending, then `max-width`
//! descending, then every other query in first-seen order.

use std::cmp::Ordering;
use std::sync::LazyLock;

use lightningcss::rules::CssRule;
use lightningcss::rules::media::MediaRule;
use lightningcss::stylesheet::PrinterOptions;
use lightningcss::traits::ToCss;
use regex::Regex;

/// `min-width: 40em` or the range form `width >= 40em`.
static WIDTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(min|max)-width\s*:|width\s*(>=?|<=?))\s*([\d.]+)(px|em|rem)?")
        .expect("static regex")
});

/// Root font size used to compare `em`/`rem` breakpoints with `px`.
const ROOT_FONT_PX: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Breakpoint {
    Min(f64),
    Max(f64),
    Other,
}

impl Breakpoint {
    fn parse(query: &str) -> Self {
        let Some(caps) = WIDTH_RE.captures(query) else {
            return Self::Other;
        };
        let Ok(mut value) = caps[3].parse::<f64>() else {
            return Self::Other;
        };
        if caps.get(4).is_some_and(|u| u.as_str() != "px") {
            value *= ROOT_FONT_PX;
        }
        let is_min = match (caps.get(1), caps.get(2)) {
            (Some(kind), _) => kind.as_str() == "min",
            (None, Some(op)) => op.as_str().starts_with('>'),
            (None, None) => return Self::Other,
        };
        if is_min {
            Self::Min(value)
        } else {
            Self::Max(value)
        }
    }

    fn cmp(self, other: Self) -> Ordering {
        match (self, other) {
            (Self::Min(a), Self::Min(b)) => a.total_cmp(&b),
            (Self::Max(a), Self::Max(b)) => b.total_cmp(&a),
            (Self::Min(_), _) | (Self::Max(_), Self::Other) => Ordering::Less,
            (Self::Other, Self::Other) => Ordering::Equal,
            _ => Ordering::Greater,
        }
    }
}

/// Group top-level media rules in place.
pub fn group<'i>(rules: &mut Vec<CssRule<'i>>) {
    let mut plain = Vec::with_capacity(rules.len());
    let mut groups: Vec<(String, MediaRule<'i>)> = Vec::new();

    for rule in rules.drain(..) {
        match rule {
            CssRule::Media(media) => {
                let key = media
                    .query
                    .to_css_string(PrinterOptions::default())
                    .unwrap_or_default();
                match groups.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, existing)) => existing.rules.0.extend(media.rules.0),
                    None => groups.push((key, media)),
                }
            }
            other => plain.push(other),
        }
    }

    // stable: equal keys keep first-seen order
    groups.sort_by(|(a, _), (b, _)| Breakpoint::parse(a).cmp(Breakpoint::parse(b)));

    plain.extend(groups.into_iter().map(|(_, media)| CssRule::Media(media)));
    *rules = plain;
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightningcss::stylesheet::{ParserOptions, StyleSheet};

    fn grouped(css: &str) -> String {
        let mut sheet = StyleSheet::parse(css, ParserOptions::default()).unwrap();
        group(&mut sheet.rules.0);
        sheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .unwrap()
            .code
    }

    #[test]
    fn test_merges_identical_queries() {
        let css = "@media (min-width: 768px) { .a { color: red } }\n\
                   .b { color: blue }\n\
                   @media (min-width: 768px) { .c { color: green } }";
        let out = grouped(css);
        assert_eq!(out.matches("@media").count(), 1);
        assert!(out.starts_with(".b{"));
        assert!(out.find(".a{").unwrap() < out.find(".c{").unwrap());
    }

    #[test]
    fn test_mobile_first_order() {
        let css = "@media print { .p { color: #000 } }\n\
                   @media (max-width: 600px) { .s { color: red } }\n\
                   @media (min-width: 1200px) { .x { color: red } }\n\
                   @media (max-width: 900px) { .m { color: red } }\n\
                   @media (min-width: 40em) { .e { color: red } }";
        let out = grouped(css);
        let pos = |needle: &str| out.find(needle).unwrap();

        // 40em = 640px < 1200px
        assert!(pos(".e{") < pos(".x{"));
        assert!(pos(".x{") < pos(".m{"));
        assert!(pos(".m{") < pos(".s{"));
        assert!(pos(".s{") < pos(".p{"));
    }

    #[test]
    fn test_breakpoint_parse() {
        assert_eq!(Breakpoint::parse("(min-width: 320px)"), Breakpoint::Min(320.0));
        assert_eq!(Breakpoint::parse("(max-width: 2rem)"), Breakpoint::Max(32.0));
        assert_eq!(Breakpoint::parse("(width >= 768px)"), Breakpoint::Min(768.0));
        assert_eq!(Breakpoint::parse("(width<=600px)"), Breakpoint::Max(600.0));
        assert_eq!(Breakpoint::parse("print"), Breakpoint::Other);
    }
}
