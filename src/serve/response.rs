//! HTTP responses.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::{
    embed::serve::{LIVERELOAD_JS, LivereloadVars},
    utils::mime::{self, types},
};

/// Respond with a file, injecting the live-reload client into HTML.
pub fn respond_file(request: Request, path: &Path, reload_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);

    if request.method() == &Method::Head {
        return send(request, 200, content_type, Vec::new());
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = match reload_port {
        Some(port) if mime::is_html(content_type) => inject_livereload(&body, port),
        _ => body,
    };
    send(request, 200, content_type, body)
}

pub fn respond_not_found(request: Request) -> Result<()> {
    send(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    send(request, 405, types::PLAIN, b"405 Method Not Allowed".to_vec())
}

pub fn respond_unavailable(request: Request) -> Result<()> {
    send(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

fn send(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", content_type))
        .with_header(header("Cache-Control", "no-store"));
    request.respond(response)?;
    Ok(())
}

fn header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).expect("static header")
}

/// Insert the client before the last `</body>`, or append when missing.
fn inject_livereload(content: &[u8], port: u16) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let script = format!(
        "<script>{}</script>",
        LIVERELOAD_JS.render(&LivereloadVars { ws_port: port })
    );
    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script.as_bytes());
    result.extend_from_slice(&content[pos..]);
    result
}
