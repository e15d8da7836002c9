//! Markup task: expand includes, prefer WebP images.

mod include;
mod picture;

pub use include::{IncludeError, Includer};
pub use picture::webp_path;

use std::fs;

use anyhow::{Context, Result};
use rayon::prelude::*;

use super::TaskContext;
use crate::{
    core::BuildMode, log, paths::AssetClass, reload::ReloadMessage, utils::fs::write,
    utils::plural::plural_count,
};

/// Render every top-level page that is not a partial (`_*.html`).
pub fn run(ctx: &TaskContext, mode: BuildMode) -> Result<()> {
    let pages = ctx.paths.src(AssetClass::Markup).files();
    let dest = ctx.paths.dest(AssetClass::Markup);
    let includer = Includer::new(&ctx.config.markup.include_prefix);

    pages.par_iter().try_for_each(|page| -> Result<()> {
        let text = fs::read_to_string(&page.path)
            .with_context(|| format!("Failed to read {}", page.path.display()))?;
        let html = picture::rewrite(&includer.expand(&text, &page.path)?);
        write(&dest.join(&page.relative), html)
    })?;

    log!("html"; "{}", plural_count(pages.len(), "page"));
    ctx.notify(mode, ReloadMessage::reload_with_reason("html"));
    Ok(())
}
