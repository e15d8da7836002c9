//! Static preview server for the build root.
//!
//! Requests are answered from disk; HTML pages get the live-reload client
//! when a reload hub is attached to the task context.

mod path;
mod response;

pub use path::resolve_path;

use std::{
    net::{IpAddr, SocketAddr},
    path::Path,
    sync::Arc,
    thread,
};

use anyhow::{Context, Result, anyhow};
use tiny_http::{Method, Request, Server};

use crate::{
    core::{is_shutdown, register_resident_thread, register_server},
    debug, log,
    tasks::TaskContext,
    utils::exec::Cmd,
};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Request handler threads.
const WORKERS: usize = 4;

/// Bind the server and answer requests on a resident background thread.
pub fn start(ctx: &TaskContext) -> Result<()> {
    let serve = &ctx.config.serve;
    let (server, addr) = bind_with_retry(serve.interface, serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(WORKERS)
        .thread_name(|i| format!("serve-{i}"))
        .build()
        .context("Failed to create request pool")?;

    let root = ctx.paths.build_root().to_path_buf();
    let reload_port = ctx.reload_port;
    thread::spawn(move || {
        for request in server.incoming_requests() {
            let root = root.clone();
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &root, reload_port) {
                    log!("serve"; "request error: {e}");
                }
            });
        }
    });
    register_resident_thread();

    let url = format!("http://{addr}");
    log!("serve"; "{}", url);
    if serve.open {
        open_browser(&url);
    }
    Ok(())
}

fn handle_request(request: Request, root: &Path, reload_port: Option<u16>) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }
    if !matches!(request.method(), Method::Get | Method::Head) {
        return response::respond_method_not_allowed(request);
    }

    debug!("serve"; "{} {}", request.method(), request.url());
    match resolve_path(request.url(), root) {
        Some(path) => response::respond_file(request, &path, reload_port),
        None => response::respond_not_found(request),
    }
}

/// Bind to `interface:base_port`, trying the following ports if taken.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Hand the preview URL to the platform's default browser.
fn open_browser(url: &str) {
    let command: &[&str] = if cfg!(target_os = "macos") {
        &["open"]
    } else if cfg!(windows) {
        &["cmd", "/C", "start", ""]
    } else {
        &["xdg-open"]
    };

    if let Err(e) = Cmd::from_slice(command).arg(url).spawn() {
        debug!("serve"; "could not open browser: {:#}", e);
    }
}
