//! Scripts task: bundle `js/main.js` with an external bundler.
//!
//! Development keeps the bundler resident in its own watch mode; the file
//! watcher sees the rewritten bundle and triggers the reload. Production
//! runs the bundler once with minification.

use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Result, bail};

use super::TaskContext;
use crate::{
    core::{BuildMode, is_resident_alive, register_resident_child},
    debug, log,
    paths::AssetClass,
    utils::exec::Cmd,
};

/// Process id of the resident development bundler, 0 when none.
static BUNDLER: AtomicU32 = AtomicU32::new(0);

pub fn run(ctx: &TaskContext, mode: BuildMode) -> Result<()> {
    let entry = ctx.paths.scripts_entry();
    if !entry.is_file() {
        bail!("Script entry {} not found", entry.display());
    }

    let bundler = &ctx.config.scripts.bundler;
    let cmd = Cmd::from_slice(bundler)
        .args(bundler_args(ctx, mode))
        .cwd(&ctx.config.root);

    if mode.is_dev() {
        let running = BUNDLER.load(Ordering::SeqCst);
        if running != 0 && is_resident_alive(running) {
            debug!("js"; "bundler already watching (pid {})", running);
            return Ok(());
        }
        let id = register_resident_child(cmd.spawn()?);
        BUNDLER.store(id, Ordering::SeqCst);
        log!("js"; "bundler watching {}", entry.display());
    } else {
        cmd.run()?;
        log!("js"; "{}", ctx.config.scripts.output);
    }
    Ok(())
}

/// Arguments appended to the configured bundler command.
///
/// `--target` lowers the whole bundle, `node_modules` included. The bundler
/// has no per-directory target, so third-party code is not exempt from
/// lowering.
pub fn bundler_args(ctx: &TaskContext, mode: BuildMode) -> Vec<String> {
    let scripts = &ctx.config.scripts;
    let outfile = ctx.paths.dest(AssetClass::Scripts).join(&scripts.output);

    let mut args = vec![
        ctx.paths.scripts_entry().to_string_lossy().into_owned(),
        "--bundle".to_string(),
        format!("--target={}", scripts.target),
        format!("--outfile={}", outfile.to_string_lossy()),
    ];
    if mode.source_maps {
        args.push("--sourcemap=inline".to_string());
    }
    if mode.is_dev() {
        args.push("--watch=forever".to_string());
    }
    if mode.minify {
        args.push("--minify".to_string());
    }
    args
}
