//! Font tasks.
//!
//! - `fonts`: `#src/fonts/*.ttf` → `<build>/fonts/*.woff` + `*.woff2`
//! - `otf2ttf`: `#src/fonts/*.otf` → `#src/fonts/TTF/*.ttf`
//! - `fonts-style`: build fonts listing → `@include font(...)` manifest
//!
//! Conversions are external commands taken from `[fonts]` templates.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;

use super::TaskContext;
use crate::{
    config::FontsConfig,
    debug, log,
    paths::AssetClass,
    utils::{
        exec::Cmd,
        fs::write,
        glob::Source,
        plural::{plural_count, plural_s},
    },
};

/// Convert every TrueType source to WOFF and WOFF2.
///
/// The sources are scanned once; both formats are produced concurrently.
pub fn convert(ctx: &TaskContext) -> Result<()> {
    let fonts = &ctx.config.fonts;
    let sources = ctx.paths.src(AssetClass::Fonts).files();
    let dest = ctx.paths.dest(AssetClass::Fonts);

    sources.par_iter().try_for_each(|source| {
        let (woff, woff2) = rayon::join(
            || run_template(&fonts.woff, source, &dest, "woff"),
            || run_template(&fonts.woff2, source, &dest, "woff2"),
        );
        woff.and(woff2)
    })?;

    log!("fonts"; "converted {}", plural_count(sources.len(), "font"));
    Ok(())
}

/// Convert OpenType sources to TrueType inside the source tree.
pub fn otf2ttf(ctx: &TaskContext) -> Result<()> {
    let sources = ctx.paths.otf().files();
    let dest = ctx.paths.ttf_out();

    if !sources.is_empty() {
        fs::create_dir_all(&dest)
            .with_context(|| format!("Failed to create {}", dest.display()))?;
    }

    sources
        .par_iter()
        .try_for_each(|source| run_template(&ctx.config.fonts.otf2ttf, source, &dest, "ttf"))?;

    log!("otf2ttf"; "converted {}", plural_count(sources.len(), "font"));
    Ok(())
}

fn run_template(template: &[String], source: &Source, dest: &Path, ext: &str) -> Result<()> {
    let output = dest.join(&source.relative).with_extension(ext);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let args = FontsConfig::render(
        template,
        &source.path.to_string_lossy(),
        &output.to_string_lossy(),
    );
    debug!("fonts"; "{}", args.join(" "));

    Cmd::from_slice(&args)
        .run()
        .with_context(|| format!("Failed to convert {}", source.path.display()))?;
    Ok(())
}

// ============================================================================
// Manifest
// ============================================================================

/// Regenerate the font include manifest when it is empty.
///
/// A manifest with any content is treated as hand-edited and left alone.
pub fn manifest(ctx: &TaskContext) -> Result<()> {
    let path = ctx.paths.source_root().join(&ctx.config.fonts.manifest);

    let current = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    if !current.is_empty() {
        log!("fonts-style"; "{} has content, skipping", path.display());
        return Ok(());
    }

    let names = list_font_files(&ctx.paths.dest(AssetClass::Fonts))?;
    let lines = manifest_lines(names.iter().map(String::as_str));
    write(&path, lines.concat())?;

    log!("fonts-style"; "wrote {} include{}", lines.len(), plural_s(lines.len()));
    Ok(())
}

/// File names in the build fonts directory, sorted.
fn list_font_files(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("Failed to list {}", dir.display())),
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}

/// One include line per family token, suppressing adjacent repeats only.
fn manifest_lines<'a>(file_names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut previous: Option<&str> = None;

    for name in file_names {
        let family = family_token(name);
        if previous == Some(family) {
            continue;
        }
        lines.push(format!(
            "@include font(\"{family}\", \"{family}\", \"400\", \"normal\");\r\n"
        ));
        previous = Some(family);
    }
    lines
}

/// Text before the first `.` of a file name.
fn family_token(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}
