//! Source selectors: glob pattern lists with `!` negation.
//!
//! A [`Selector`] is anchored at a base directory. Patterns are written
//! relative to that base, and every matched file keeps its path relative to
//! it, so `img/**/*.png` maps `img/icons/a.png` to `icons/a.png`.
//!
//! ```ignore
//! let html = Selector::new(&src, ["*.html", "!_*.html"]);
//! for file in html.files() { /* file.path, file.relative */ }
//! ```

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use rustc_hash::FxHashSet;

use crate::debug;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A file picked by a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the selector's base.
    pub relative: PathBuf,
}

/// Ordered include/exclude pattern list anchored at a base directory.
#[derive(Debug, Clone)]
pub struct Selector {
    base: PathBuf,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl Selector {
    /// Build a selector. Malformed patterns are dropped and match nothing.
    pub fn new<I, S>(base: &Path, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefix = Pattern::escape(&base.to_string_lossy());
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for raw in patterns {
            let raw = raw.as_ref();
            let (negated, rel) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw),
            };
            let full = format!("{prefix}/{rel}");
            match Pattern::new(&full) {
                Ok(p) if negated => exclude.push(p),
                Ok(p) => include.push(p),
                Err(e) => debug!("glob"; "ignoring malformed pattern `{}`: {}", raw, e),
            }
        }

        Self {
            base: base.to_path_buf(),
            include,
            exclude,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Whether `path` is selected (matches an include and no exclude).
    pub fn matches(&self, path: &Path) -> bool {
        self.include
            .iter()
            .any(|p| p.matches_path_with(path, MATCH_OPTIONS))
            && !self.is_excluded(path)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude
            .iter()
            .any(|p| p.matches_path_with(path, MATCH_OPTIONS))
    }

    /// Expand to existing files, sorted by path, without duplicates.
    pub fn files(&self) -> Vec<Source> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();

        for pattern in &self.include {
            let Ok(paths) = glob::glob_with(pattern.as_str(), MATCH_OPTIONS) else {
                continue;
            };
            for path in paths.flatten() {
                if !path.is_file() || self.is_excluded(&path) || !seen.insert(path.clone()) {
                    continue;
                }
                let relative = path
                    .strip_prefix(&self.base)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| path.file_name().map(PathBuf::from).unwrap_or_default());
                out.push(Source { path, relative });
            }
        }

        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }
}
