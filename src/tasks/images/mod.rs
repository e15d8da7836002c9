//! Images task: copy originals, add WebP siblings, optimize in production.

mod encode;
mod optimize;

use std::fs;

use anyhow::{Context, Result};
use rayon::prelude::*;

use super::TaskContext;
use crate::{
    core::BuildMode,
    log,
    paths::AssetClass,
    reload::ReloadMessage,
    utils::{
        fs::{copy, write},
        glob::Source,
        plural::plural_count,
    },
};

pub use encode::to_webp;

pub fn run(ctx: &TaskContext, mode: BuildMode) -> Result<()> {
    let sources = ctx.paths.src(AssetClass::Images).files();

    let converted = sources
        .par_iter()
        .map(|source| process(ctx, source, mode))
        .collect::<Result<Vec<bool>>>()?
        .into_iter()
        .filter(|webp| *webp)
        .count();

    log!(
        "images";
        "{} ({} webp){}",
        plural_count(sources.len(), "image"),
        converted,
        if mode.minify { ", optimized" } else { "" }
    );
    ctx.notify(mode, ReloadMessage::reload_with_reason("images"));
    Ok(())
}

/// Write one source and its WebP sibling. Returns whether a WebP was made.
fn process(ctx: &TaskContext, source: &Source, mode: BuildMode) -> Result<bool> {
    let images = &ctx.config.images;
    let out = ctx.paths.dest(AssetClass::Images).join(&source.relative);

    let ext = source
        .path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let raster = encode::is_raster(&ext);

    if !raster && !mode.minify {
        copy(&source.path, &out)?;
        return Ok(false);
    }

    let data =
        fs::read(&source.path).with_context(|| format!("Failed to read {}", source.path.display()))?;

    if raster {
        let encoded = to_webp(&data, images.quality)
            .with_context(|| format!("Failed to convert {}", source.path.display()))?;
        write(&out.with_extension("webp"), encoded)?;
    }

    if mode.minify {
        write(&out, optimize::optimize(&source.path, data, images.optimization_level)?)?;
    } else {
        copy(&source.path, &out)?;
    }

    Ok(raster)
}
