//! Source watcher.
//!
//! ```text
//! notify → Debouncer (300 ms quiet) → router (Watch table) → TaskId::run
//!                                                          └ build/js → reload
//! ```
//!
//! Fonts and sprites are not watched. Scripts are rebuilt by the resident
//! bundler; the watcher only forwards its output changes to the browser.

mod debouncer;
mod router;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use notify::{RecursiveMode, Watcher};

use crate::{
    core::{BuildMode, is_shutdown, register_resident_thread},
    log,
    logger::{status_error, status_success},
    paths::AssetClass,
    reload::ReloadMessage,
    tasks::TaskContext,
};
use debouncer::Debouncer;

/// Start watching on a resident thread.
pub fn start(ctx: TaskContext) -> Result<()> {
    let source = ctx.paths.source_root().to_path_buf();
    let bundle = ctx.paths.dest(AssetClass::Scripts);
    fs::create_dir_all(&bundle).with_context(|| format!("Failed to create {}", bundle.display()))?;

    let (tx, rx) = channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })?;
    for root in [&source, &bundle] {
        if root.exists() {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .with_context(|| format!("Failed to watch {}", root.display()))?;
        }
    }

    log!("watch"; "{}", source.display());
    std::thread::spawn(move || {
        let _watcher = watcher;
        event_loop(&ctx, &rx);
    });
    register_resident_thread();
    Ok(())
}

fn event_loop(ctx: &TaskContext, rx: &Receiver<notify::Result<notify::Event>>) {
    let mut debouncer = Debouncer::new();

    while !is_shutdown() {
        match rx.recv_timeout(debouncer.sleep_duration()) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(e)) => log!("watch"; "notify error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(batch) = debouncer.take_if_ready() {
            process_batch(ctx, &batch);
        }
    }
}

/// Re-run the routed tasks of one batch, reporting on the status line.
fn process_batch(ctx: &TaskContext, batch: &[PathBuf]) {
    let routes = router::route(batch, &ctx.paths);

    let mut done = Vec::new();
    for task in &routes.tasks {
        if let Err(e) = task.run(ctx) {
            status_error(&format!("{task} failed"), &format!("{e:#}"));
            return;
        }
        done.push(task.name());
    }

    if routes.bundle_changed {
        ctx.notify(BuildMode::DEVELOPMENT, ReloadMessage::reload_with_reason("js"));
        done.push("js bundle");
    }

    if !done.is_empty() {
        status_success(&format!("rebuilt: {}", done.join(", ")));
    }
}
