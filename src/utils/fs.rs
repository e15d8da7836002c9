//! Filesystem writes for task outputs.

use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Write `contents`, creating parent directories first.
pub fn write(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Copy `from` to `to`, creating parent directories first.
pub fn copy(from: &Path, to: &Path) -> Result<()> {
    ensure_parent(to)?;
    fs::copy(from, to)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}
