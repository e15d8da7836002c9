//! assetline - front-end asset pipeline with a live-reload preview server.

mod cli;
mod config;
mod core;
mod embed;
mod graph;
mod logger;
mod paths;
mod reload;
mod serve;
mod tasks;
mod utils;
mod watch;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::Config;
use tasks::{TaskContext, TaskId};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(Config::load(&cli)?);
    let graph = graph::pipeline(cli.target)?;

    let mut ctx = TaskContext::new(Arc::clone(&config));
    if graph.contains(TaskId::Serve) {
        let (hub, port) = reload::start_reload_server(config.serve.interface, config.serve.reload_port)?;
        debug!("reload"; "ws://{}:{}", config.serve.interface, port);
        ctx = ctx.with_reload(hub, port);
    }

    log!("task"; "running `{}`", cli.target.name());
    graph::run(&graph, &ctx)?;

    if cli.target.is_resident() && core::has_residents() {
        log!("task"; "ready, press Ctrl+C to stop");
        core::park_while_resident();
    }
    Ok(())
}
