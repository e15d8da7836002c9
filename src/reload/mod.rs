//! Live reload.
//!
//! Tasks never talk to the WebSocket server directly. They receive a
//! [`ReloadSink`] and report what changed; the dev pipeline plugs in the
//! [`ReloadHub`], production and standalone runs plug in [`NoopSink`].
//!
//! ```text
//! task --send(ReloadMessage)--> ReloadSink
//!                                 ├── NoopSink       (prod, one-off tasks)
//!                                 ├── RecordingSink  (tests)
//!                                 └── ReloadHub ──► browser clients
//! ```

mod hub;
mod message;
mod server;

pub use hub::ReloadHub;
pub use message::ReloadMessage;
pub use server::start_reload_server;

/// Receiver of live-reload notifications.
pub trait ReloadSink: Send + Sync {
    fn send(&self, msg: ReloadMessage);
}

/// Sink that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ReloadSink for NoopSink {
    fn send(&self, _msg: ReloadMessage) {}
}

/// Sink that keeps every message for later inspection.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: parking_lot::Mutex<Vec<ReloadMessage>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn messages(&self) -> Vec<ReloadMessage> {
        self.messages.lock().clone()
    }
}

#[cfg(test)]
impl ReloadSink for RecordingSink {
    fn send(&self, msg: ReloadMessage) {
        self.messages.lock().push(msg);
    }
}
