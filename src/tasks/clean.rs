//! Remove the build root.

use std::{fs, io::ErrorKind};

use anyhow::{Context, Result};

use super::TaskContext;
use crate::debug;

/// Recursively delete the build root. A missing root is not an error.
pub fn run(ctx: &TaskContext) -> Result<()> {
    let target = ctx.paths.clean();
    match fs::remove_dir_all(target) {
        Ok(()) => {
            debug!("clean"; "removed {}", target.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", target.display())),
    }
}
