//! WebSocket client registry and broadcaster.

use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::{ReloadMessage, ReloadSink};
use crate::{core::is_shutdown, debug, log};

/// Connected browser clients.
#[derive(Default)]
pub struct ReloadHub {
    clients: Mutex<Vec<WebSocket<TcpStream>>>,
}

impl ReloadHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Complete the WebSocket handshake and register the client.
    pub fn add_client(&self, stream: TcpStream) {
        // Blocking during handshake, non-blocking afterwards for polling reads
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                let _ = ws.get_ref().set_nonblocking(true);

                let hello = ReloadMessage::connected().to_json();
                if let Err(e) = ws.send(Message::Text(hello.into())) {
                    log!("reload"; "failed to send connected message: {}", e);
                    return;
                }

                let mut clients = self.clients.lock();
                clients.push(ws);
                debug!("reload"; "client connected (total: {})", clients.len());
            }
            Err(e) => log!("reload"; "handshake failed: {}", e),
        }
    }

    /// Send a message to all connected clients, dropping dead ones.
    pub fn broadcast(&self, msg: &ReloadMessage) {
        let text = Message::Text(msg.to_json().into());
        let mut clients = self.clients.lock();

        if clients.is_empty() {
            debug!("reload"; "no clients connected");
            return;
        }

        clients.retain_mut(|ws| match ws.send(text.clone()) {
            Ok(()) => true,
            Err(e) => {
                debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        debug!("reload"; "broadcast to {} clients", clients.len());
    }

    /// Poll clients for close frames until shutdown.
    ///
    /// Also answers pings, which tungstenite queues during `read`.
    pub fn reader_loop(&self) {
        while !is_shutdown() {
            std::thread::sleep(Duration::from_millis(100));

            self.clients.lock().retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e))
                    if e.kind() == std::io::ErrorKind::WouldBlock =>
                {
                    true
                }
                Err(_) => false,
            });
        }

        for mut ws in self.clients.lock().drain(..) {
            let _ = ws.close(None);
        }
    }
}

impl ReloadSink for ReloadHub {
    fn send(&self, msg: ReloadMessage) {
        self.broadcast(&msg);
    }
}
