//! Stacked SVG sprite sheet.
//!
//! Every `#src/sprites/*.svg` becomes a nested `<svg id="<stem>">` inside one
//! sheet. Only the `:target` icon is displayed, so `icons.svg#arrow` renders
//! the arrow alone, both in `<img>` and in CSS `url()`.
//!
//! Root presentation attributes (`fill`, `stroke`, ...) move onto the nested
//! `<svg>`. Inner ids are prefixed with the icon id so gradients and clip
//! paths of different icons cannot collide.

use std::fs;
use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::{Reader, escape::escape, events::BytesStart, events::Event, name::QName};
use regex::{Captures, Regex};
use rustc_hash::FxHashSet;

use super::TaskContext;
use crate::{
    core::BuildMode,
    embed::sprite::{EXAMPLE_HTML, ExampleVars},
    log,
    paths::AssetClass,
    reload::ReloadMessage,
    utils::{fs::write, plural::plural_count},
};

const STACK_STYLE: &str = ":root>svg{display:none}:root>svg:target{display:block}";

/// Root attributes that describe the standalone file, not the icon.
const DROPPED_ROOT_ATTRS: &[&str] = &["id", "width", "height", "x", "y", "viewBox"];

/// `id="..."` on an inner element.
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\sid\s*=\s*)(["'])([^"']+)["']"#).expect("static regex"));

/// `url(#id)` reference.
static URL_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(["']?)#([^"')\s]+)(["']?)\s*\)"#).expect("static regex")
});

/// `href="#id"` and `xlink:href="#id"` reference.
static HREF_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(href\s*=\s*)(["'])#([^"']+)["']"#).expect("static regex"));

/// One icon extracted from its source file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Icon {
    id: String,
    view_box: Option<String>,
    /// Kept root attributes, rendered as ` key="value"` pairs.
    attrs: String,
    body: String,
}

pub fn run(ctx: &TaskContext, mode: BuildMode) -> Result<()> {
    let sources = ctx.paths.src(AssetClass::Sprites).files();

    let mut icons = sources
        .iter()
        .map(|source| {
            let text = fs::read_to_string(&source.path)
                .with_context(|| format!("Failed to read {}", source.path.display()))?;
            let id = source
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            parse_icon(id, &text).with_context(|| format!("in {}", source.path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    icons.sort_by(|a, b| a.id.cmp(&b.id));

    write(&ctx.paths.sprite_sheet(), render_sheet(&icons, mode.minify))?;

    if mode.is_dev() {
        write(&ctx.paths.sprite_example(), render_example(&icons))?;
    }

    log!("sprites"; "packed {}", plural_count(icons.len(), "icon"));
    ctx.notify(mode, ReloadMessage::reload_with_reason("sprites"));
    Ok(())
}

/// Pull the root `<svg>` viewBox and inner markup out of an icon file.
fn parse_icon(id: String, text: &str) -> Result<Icon> {
    let mut reader = Reader::from_str(text);

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name() == QName(b"svg") => {
                let (view_box, attrs) = root_attrs(&e)?;
                let span = reader.read_to_end(e.name())?;
                let body = text
                    .get(span.start as usize..span.end as usize)
                    .ok_or_else(|| anyhow!("invalid svg span"))?
                    .trim();
                let body = namespace_ids(&id, body);
                return Ok(Icon { id, view_box, attrs, body });
            }
            Event::Empty(e) if e.name() == QName(b"svg") => {
                let (view_box, attrs) = root_attrs(&e)?;
                return Ok(Icon {
                    id,
                    view_box,
                    attrs,
                    body: String::new(),
                });
            }
            Event::Start(e) | Event::Empty(e) => {
                bail!(
                    "expected <svg> root, found <{}>",
                    String::from_utf8_lossy(e.name().as_ref())
                );
            }
            Event::Eof => bail!("no <svg> element"),
            _ => {}
        }
    }
}

/// `viewBox` (falling back to `0 0 width height`) and the presentation
/// attributes that carry over to the nested `<svg>`.
fn root_attrs(e: &BytesStart<'_>) -> Result<(Option<String>, String)> {
    let mut view_box = None;
    let mut width = None;
    let mut height = None;
    let mut kept = String::new();

    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match key.as_str() {
            "viewBox" => view_box = Some(value),
            "width" => width = Some(value),
            "height" => height = Some(value),
            k if k.starts_with("xmlns") || DROPPED_ROOT_ATTRS.contains(&k) => {}
            _ => kept.push_str(&format!(r#" {key}="{}""#, value.replace('"', "&quot;"))),
        }
    }

    let view_box = view_box.or_else(|| {
        let w = width?.trim_end_matches("px").to_string();
        let h = height?.trim_end_matches("px").to_string();
        Some(format!("0 0 {w} {h}"))
    });
    Ok((view_box, kept))
}

/// Prefix ids defined inside an icon, and references to them, with the
/// icon id. References to ids the icon does not define are left alone.
fn namespace_ids(icon: &str, body: &str) -> String {
    let defined: FxHashSet<&str> = ID_RE
        .captures_iter(body)
        .filter_map(|c| c.get(3).map(|m| m.as_str()))
        .collect();
    if defined.is_empty() {
        return body.to_string();
    }
    let scoped = |id: &str| format!("{icon}__{id}");

    let body = ID_RE.replace_all(body, |c: &Captures<'_>| {
        format!("{}{q}{}{q}", &c[1], scoped(&c[3]), q = &c[2])
    });
    let body = URL_REF_RE.replace_all(&body, |c: &Captures<'_>| {
        if defined.contains(&c[2]) {
            format!("url({}#{}{})", &c[1], scoped(&c[2]), &c[3])
        } else {
            c[0].to_string()
        }
    });
    let body = HREF_REF_RE.replace_all(&body, |c: &Captures<'_>| {
        if defined.contains(&c[3]) {
            format!("{}{q}#{}{q}", &c[1], scoped(&c[3]), q = &c[2])
        } else {
            c[0].to_string()
        }
    });
    body.into_owned()
}

fn render_sheet(icons: &[Icon], minify: bool) -> String {
    let sep = if minify { "" } else { "\n" };
    let mut out = String::from(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
    );
    out.push_str(sep);
    out.push_str("<style>");
    out.push_str(STACK_STYLE);
    out.push_str("</style>");

    for icon in icons {
        out.push_str(sep);
        out.push_str(&format!(r#"<svg id="{}""#, escape(icon.id.as_str())));
        if let Some(view_box) = &icon.view_box {
            out.push_str(&format!(r#" viewBox="{view_box}""#));
        }
        out.push_str(&icon.attrs);
        out.push('>');
        out.push_str(&icon.body);
        out.push_str("</svg>");
    }

    out.push_str(sep);
    out.push_str("</svg>");
    out.push_str(sep);
    out
}

fn render_example(icons: &[Icon]) -> String {
    const SHEET: &str = "../icons/icons.svg";
    let items: Vec<String> = icons
        .iter()
        .map(|icon| {
            let id = escape(icon.id.as_str());
            format!(r#"<li><img src="{SHEET}#{id}" alt="{id}"><code>#{id}</code></li>"#)
        })
        .collect();

    EXAMPLE_HTML.render(&ExampleVars {
        sheet: SHEET,
        items: items.join("\n"),
        count: icons.len(),
    })
}
