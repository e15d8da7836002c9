//! Core types shared across tasks, the runner and the dev server.

mod driver;
mod state;

pub use driver::BuildMode;
pub use state::{
    has_residents, is_resident_alive, is_shutdown, park_while_resident,
    register_resident_child, register_resident_thread, register_server, setup_shutdown_handler,
};
