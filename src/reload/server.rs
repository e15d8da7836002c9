//! WebSocket listener for live reload.

use std::net::{IpAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use super::ReloadHub;
use crate::core::{is_shutdown, register_resident_thread};

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Bind the live-reload listener and start its acceptor and reader threads.
///
/// Returns the hub and the port actually bound, which may be higher than
/// `base_port` if it was taken.
pub fn start_reload_server(interface: IpAddr, base_port: u16) -> Result<(Arc<ReloadHub>, u16)> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    let hub = ReloadHub::new();

    let acceptor = Arc::clone(&hub);
    std::thread::spawn(move || {
        while !is_shutdown() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);
                    let _ = stream.set_nonblocking(false);
                    acceptor.add_client(stream);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    let reader = Arc::clone(&hub);
    std::thread::spawn(move || reader.reader_loop());
    register_resident_thread();

    Ok((hub, actual_port))
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_bind_skips_taken_port() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let (taken, port) = try_bind_port(localhost, 0, 1).unwrap();
        let (_next, next_port) = try_bind_port(localhost, port, 3).unwrap();
        assert_ne!(port, next_port);
        drop(taken);
    }
}
