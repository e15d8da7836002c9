//! Production optimization of original-format images.
//!
//! | Format | Optimizer                                      |
//! |--------|------------------------------------------------|
//! | PNG    | oxipng preset `optimization_level`             |
//! | SVG    | comments, metadata and blank text removed      |
//! | JPEG   | `jpegtran -progressive -optimize` if installed |
//! | GIF    | `gifsicle --interlace -O3` if installed        |
//!
//! The smaller of original and optimized bytes is kept.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::{Reader, Writer, events::Event};

use crate::{
    debug,
    utils::exec::{Cmd, SILENT_FILTER},
};

/// Optimize `data` read from `path`; unknown formats pass through.
pub fn optimize(path: &Path, data: Vec<u8>, level: u8) -> Result<Vec<u8>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let optimized = match ext.as_str() {
        "png" => Some(png(&data, level)?),
        "svg" => svg(&data)
            .map_err(|e| debug!("images"; "{}: svg kept as is: {:#}", path.display(), e))
            .ok(),
        "jpg" | "jpeg" => external(
            "jpegtran",
            &["-progressive", "-optimize", "-copy", "none"],
            path,
        )?,
        "gif" => external("gifsicle", &["--interlace", "-O3"], path)?,
        _ => None,
    };

    Ok(match optimized {
        Some(out) if out.len() < data.len() => out,
        _ => data,
    })
}

fn png(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let options = oxipng::Options::from_preset(level);
    oxipng::optimize_from_memory(data, &options).map_err(|e| anyhow!("oxipng: {e}"))
}

/// Event-level SVG minification.
///
/// Elements and attributes are written back verbatim. Only comments,
/// processing instructions, the XML declaration, `<metadata>` and
/// whitespace-only text outside `<text>` are dropped. A doctype with an
/// internal subset is kept, since it may declare entities.
fn svg(data: &[u8]) -> Result<Vec<u8>> {
    let source = std::str::from_utf8(data).context("SVG is not UTF-8")?;
    let mut reader = Reader::from_str(source);
    let mut writer = Writer::new(Vec::with_capacity(data.len()));
    let mut in_text = 0usize;
    let mut depth = 0usize;
    let mut seen_element = false;

    loop {
        let event = reader.read_event().context("Failed to parse SVG")?;
        match event {
            Event::Eof if depth == 0 && seen_element => break,
            Event::Eof => bail!("truncated SVG"),
            Event::Comment(_) | Event::PI(_) | Event::Decl(_) => continue,
            Event::DocType(ref d) if !d.contains(&b'[') => continue,
            Event::Start(ref e) if e.local_name().as_ref() == b"metadata" => {
                reader.read_to_end(e.name()).context("Failed to parse SVG")?;
                continue;
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"metadata" => continue,
            Event::Text(ref t) if in_text == 0 && t.iter().all(u8::is_ascii_whitespace) => {
                continue;
            }
            Event::Start(ref e) => {
                depth += 1;
                seen_element = true;
                if e.local_name().as_ref() == b"text" {
                    in_text += 1;
                }
            }
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                if e.local_name().as_ref() == b"text" {
                    in_text = in_text.saturating_sub(1);
                }
            }
            Event::Empty(_) => seen_element = true,
            _ => {}
        }
        writer.write_event(event).context("Failed to write SVG")?;
    }

    Ok(writer.into_inner())
}

/// Run an optional external optimizer on `path`, capturing stdout.
fn external(program: &str, args: &[&str], path: &Path) -> Result<Option<Vec<u8>>> {
    if which::which(program).is_err() {
        debug!("images"; "`{}` not installed, copying unchanged", program);
        return Ok(None);
    }
    let output = Cmd::new(program)
        .args(args)
        .arg(path)
        .filter(&SILENT_FILTER)
        .run()?;
    Ok(Some(output.stdout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn test_png_stays_valid() {
        let img = RgbaImage::from_pixel(32, 32, image::Rgba([10, 20, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        let original = buf.into_inner();

        let out = optimize(Path::new("a.png"), original.clone(), 3).unwrap();
        assert!(out.len() <= original.len());
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), 32);
    }

    fn optimize_svg(src: &str) -> String {
        let out = optimize(Path::new("icon.svg"), src.as_bytes().to_vec(), 3).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_svg_keeps_viewbox() {
        let text = optimize_svg(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24">
            <!-- comment -->
            <rect   x="2" y="2" width="20" height="20" fill="#000000"/>
        </svg>"##,
        );
        assert!(text.contains("viewBox=\"0 0 24 24\""));
        assert!(text.contains(r##"fill="#000000""##));
        assert!(!text.contains("comment"));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_svg_size_differs_from_viewbox() {
        let text = optimize_svg(
            r#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" width="200" height="40" viewBox="0 0 100 20">
  <rect width="100" height="20"/>
</svg>"#,
        );
        assert!(text.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="40" viewBox="0 0 100 20">"#
        ));
    }

    #[test]
    fn test_svg_text_content_kept() {
        let text = optimize_svg(
            r#"<svg viewBox="0 0 200 40">
  <!-- logo -->
  <metadata><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"/></metadata>
  <text x="0" y="30">ACME <tspan>Corp</tspan> &amp; Co</text>
</svg>"#,
        );
        assert!(text.contains(r#"<text x="0" y="30">ACME <tspan>Corp</tspan> &amp; Co</text>"#));
        assert!(!text.contains("metadata"));
        assert!(!text.contains("logo"));
    }

    #[test]
    fn test_broken_svg_passes_through() {
        let cases: [&[u8]; 3] = [b"<svg", b"<svg><g>", b"<!-- only a comment -->"];
        for src in cases {
            assert_eq!(optimize(Path::new("x.svg"), src.to_vec(), 3).unwrap(), src);
        }
    }

    #[test]
    fn test_unknown_format_passes_through() {
        let src = vec![0u8, 1, 2];
        assert_eq!(optimize(Path::new("favicon.ico"), src.clone(), 3).unwrap(), src);
    }
}
