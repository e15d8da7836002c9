//! Process-level state for long-running pipelines.
//!
//! Two concerns live here:
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)
//! - residents: child processes (bundler in watch mode) and threads (file
//!   watcher) that outlive the task that started them.

use std::process::Child;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::Mutex;
use tiny_http::Server;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Resident child processes, killed on shutdown
static CHILDREN: Mutex<Vec<Child>> = Mutex::new(Vec::new());

/// Number of resident threads that keep the process alive
static THREADS: AtomicUsize = AtomicUsize::new(0);

// =============================================================================
// SHUTDOWN state
// =============================================================================

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Resident children are killed in every case.
/// - With a registered server: unblock it so `main` can return normally.
/// - Otherwise: exit immediately.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);
        kill_residents();

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else if THREADS.load(Ordering::SeqCst) == 0 {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

// =============================================================================
// Residents
// =============================================================================

/// Keep a spawned child alive until shutdown. Returns its process id.
pub fn register_resident_child(child: Child) -> u32 {
    let id = child.id();
    CHILDREN.lock().push(child);
    id
}

/// Whether the resident child with `id` is still running.
pub fn is_resident_alive(id: u32) -> bool {
    let mut children = CHILDREN.lock();
    children.retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    children.iter().any(|child| child.id() == id)
}

/// Count a long-running thread as resident.
pub fn register_resident_thread() {
    THREADS.fetch_add(1, Ordering::SeqCst);
}

/// Whether any resident work is still attached to the process.
pub fn has_residents() -> bool {
    THREADS.load(Ordering::SeqCst) > 0 || !CHILDREN.lock().is_empty()
}

/// Kill and reap every resident child.
pub fn kill_residents() {
    let mut children = CHILDREN.lock();
    for mut child in children.drain(..) {
        let _ = child.kill();
        let _ = child.wait();
    }
}

/// Block the calling thread while resident work exists and no shutdown
/// has been requested. Reaps children that exit on their own.
pub fn park_while_resident() {
    while has_residents() && !is_shutdown() {
        CHILDREN
            .lock()
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
        std::thread::sleep(Duration::from_millis(200));
    }
    kill_residents();
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_shutdown_by_default() {
        assert!(!is_shutdown());
    }

    #[cfg(unix)]
    #[test]
    fn test_kill_residents_reaps_children() {
        let child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let id = register_resident_child(child);
        assert!(has_residents());
        assert!(is_resident_alive(id));

        kill_residents();
        assert!(CHILDREN.lock().is_empty());
        assert!(!is_resident_alive(id));
    }
}
