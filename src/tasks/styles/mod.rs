//! Styles task: Sass → CSS with WebP backgrounds, grouped media queries
//! and vendor prefixes.
//!
//! ```text
//! style.scss ─grass─► expanded CSS ─webp─► ─group @media─► ─prefix─┬─► style.css (+ .map in dev)
//!                                                                  └─► style.min.css (prod)
//! ```

mod media;
mod webp;

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

use super::TaskContext;
use crate::{
    core::BuildMode, debug, log, paths::AssetClass, reload::ReloadMessage, utils::fs::write,
};

/// Result of one stylesheet build.
#[derive(Debug)]
pub struct Compiled {
    /// Expanded CSS.
    pub css: String,
    /// Minified CSS, production only.
    pub min: Option<String>,
    /// Source map JSON, development only.
    pub map: Option<String>,
}

/// Compile the entry stylesheet and write its outputs.
pub fn run(ctx: &TaskContext, mode: BuildMode) -> Result<()> {
    let entry = ctx.paths.styles_entry();
    let dest = ctx.paths.dest(AssetClass::Styles);
    let stem = entry
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("style");
    let map_source = entry
        .strip_prefix(ctx.paths.source_root())
        .unwrap_or(&entry)
        .to_string_lossy()
        .replace('\\', "/");

    let sass = compile_sass(&entry)?;
    let compiled = process(&sass, &map_source, ctx.config.browsers(), mode)?;

    let css_name = format!("{stem}.css");
    let mut written = vec![css_name.clone()];
    let mut css = compiled.css;

    if let Some(map) = &compiled.map {
        let map_name = format!("{css_name}.map");
        css.push_str(&format!("\n/*# sourceMappingURL={map_name} */\n"));
        write(&dest.join(&map_name), map)?;
        written.push(map_name);
    }
    write(&dest.join(&css_name), &css)?;

    if let Some(min) = &compiled.min {
        let min_name = format!("{stem}.min.css");
        write(&dest.join(&min_name), min)?;
        written.push(min_name);
    }

    log!("css"; "{}", written.join(", "));
    ctx.notify(mode, ReloadMessage::css(format!("/css/{css_name}")));
    Ok(())
}

/// Compile Sass with expanded output; imports resolve from the entry's directory.
pub fn compile_sass(entry: &Path) -> Result<String> {
    let mut options = grass::Options::default().style(grass::OutputStyle::Expanded);
    if let Some(dir) = entry.parent() {
        options = options.load_path(dir);
    }
    grass::from_path(entry, &options)
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("Failed to compile {}", entry.display()))
}

/// Post-process compiled CSS.
///
/// `source_name` names the compiled input inside the source map.
pub fn process(
    css: &str,
    source_name: &str,
    browsers: Option<Browsers>,
    mode: BuildMode,
) -> Result<Compiled> {
    // Before parsing, so the rewrite is covered by the source map
    let css = webp::rewrite(css);

    let mut sheet = StyleSheet::parse(
        &css,
        ParserOptions {
            filename: source_name.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("{e}"))
    .context("Failed to parse compiled CSS")?;

    media::group(&mut sheet.rules.0);

    let targets = browsers.map(Targets::from).unwrap_or_default();
    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))
        .context("Failed to prefix CSS")?;

    let mut source_map = mode.source_maps.then(|| SourceMap::new("/"));
    let expanded = sheet
        .to_css(PrinterOptions {
            minify: false,
            targets,
            source_map: source_map.as_mut(),
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    let map = match source_map.as_mut() {
        Some(sm) => {
            if let Err(e) = sm.set_source_content(0, &css) {
                debug!("css"; "source content not embedded: {}", e);
            }
            Some(sm.to_json(None).map_err(|e| anyhow!("{e}"))?)
        }
        None => None,
    };

    let min = if mode.minify {
        let out = sheet
            .to_css(PrinterOptions {
                minify: true,
                targets,
                ..PrinterOptions::default()
            })
            .map_err(|e| anyhow!("{e}"))?;
        Some(out.code)
    } else {
        None
    };

    Ok(Compiled {
        css: expanded.code,
        min,
        map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::test_context;
    use std::fs;
    use tempfile::TempDir;

    const SCSS: &str = r#"
$brand: #ff0000;

.hero {
  color: $brand;
  background: url("../img/hero.jpg") no-repeat;

  @media (min-width: 768px) {
    padding: 10px;
  }
}

.card {
  user-select: none;

  @media (min-width: 768px) {
    margin: 0 auto;
  }
}
"#;

    fn project(scss: &str) -> (TempDir, TaskContext, std::sync::Arc<crate::reload::RecordingSink>) {
        let dir = TempDir::new().unwrap();
        let (ctx, sink) = test_context(dir.path());
        write(&ctx.paths.styles_entry(), scss).unwrap();
        (dir, ctx, sink)
    }

    fn browsers() -> Option<Browsers> {
        Browsers::from_browserslist(["last 5 versions"]).unwrap()
    }

    #[test]
    fn test_dev_writes_css_and_map() {
        let (_dir, ctx, sink) = project(SCSS);
        run(&ctx, BuildMode::DEVELOPMENT).unwrap();

        let css_dir = ctx.paths.dest(AssetClass::Styles);
        let css = fs::read_to_string(css_dir.join("style.css")).unwrap();
        assert!(css.contains("sourceMappingURL=style.css.map"));
        assert!(css_dir.join("style.css.map").exists());
        assert!(!css_dir.join("style.min.css").exists());

        assert_eq!(sink.messages(), vec![ReloadMessage::css("/css/style.css")]);
    }

    #[test]
    fn test_prod_writes_two_files_min_smaller() {
        let (_dir, ctx, sink) = project(SCSS);
        run(&ctx, BuildMode::PRODUCTION).unwrap();

        let css_dir = ctx.paths.dest(AssetClass::Styles);
        let full = fs::read_to_string(css_dir.join("style.css")).unwrap();
        let min = fs::read_to_string(css_dir.join("style.min.css")).unwrap();

        assert!(!css_dir.join("style.css.map").exists());
        assert!(!full.contains("sourceMappingURL"));
        assert!(min.len() <= full.len());
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_pipeline_effects() {
        let sass = compile_sass_str(SCSS);
        let out = process(&sass, "scss/style.scss", browsers(), BuildMode::PRODUCTION).unwrap();

        // one merged media block, after the plain rules
        assert_eq!(out.css.matches("@media").count(), 1);
        assert!(out.css.find("@media").unwrap() > out.css.find(".card").unwrap());

        // webp variant
        assert!(out.css.contains(".webp .hero"));
        assert!(out.css.contains("hero.webp"));

        // vendor prefix for the configured baseline
        assert!(out.css.contains("-webkit-user-select"));
    }

    #[test]
    fn test_sass_error_is_reported() {
        let (_dir, ctx, _) = project(".a { color: $undefined; }");
        let err = run(&ctx, BuildMode::DEVELOPMENT).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to compile"));
    }

    #[test]
    fn test_missing_entry_is_error() {
        let dir = TempDir::new().unwrap();
        let (ctx, _) = test_context(dir.path());
        assert!(run(&ctx, BuildMode::DEVELOPMENT).is_err());
    }

    #[test]
    fn test_partials_resolve_from_entry_dir() {
        let (_dir, ctx, _) = project("@use 'base';\n.a { color: base.$c; }");
        write(
            &ctx.paths.source_root().join("scss/_base.scss"),
            "$c: #123456;",
        )
        .unwrap();

        run(&ctx, BuildMode::DEVELOPMENT).unwrap();
        let css = fs::read_to_string(ctx.paths.dest(AssetClass::Styles).join("style.css")).unwrap();
        assert!(css.contains("#123456"));
    }

    fn compile_sass_str(scss: &str) -> String {
        grass::from_string(
            scss.to_string(),
            &grass::Options::default().style(grass::OutputStyle::Expanded),
        )
        .unwrap()
    }
}
