//! Transform and auxiliary tasks.
//!
//! # Task Overview
//!
//! | Task               | Reads                      | Writes                        |
//! |--------------------|----------------------------|-------------------------------|
//! | `clean`            | -                          | removes `<build>/`            |
//! | `html`             | `*.html` (not `_*.html`)   | `<build>/*.html`              |
//! | `css` / `css-prod` | `scss/style.scss`          | `css/style.css` (+ map / min) |
//! | `js` / `js-prod`   | `js/main.js`               | `js/script.min.js`            |
//! | `images[-prod]`    | `img/**`                   | `img/**` + `.webp`            |
//! | `fonts`            | `fonts/*.ttf`              | `fonts/*.woff`, `*.woff2`     |
//! | `otf2ttf`          | `fonts/*.otf`              | `#src/fonts/TTF/*.ttf`        |
//! | `fonts-style`      | `<build>/fonts/`           | `#src/scss/fonts.scss`        |
//! | `svg-sprites[-prod]` | `sprites/*.svg`          | `img/icons/icons.svg`         |
//! | `watch`            | source tree events         | re-runs the tasks above       |
//! | `serve`            | `<build>/`                 | HTTP responses                |
//!
//! Every task receives a [`TaskContext`]; no task touches global state
//! except through it and `crate::core`.

pub mod clean;
pub mod fonts;
pub mod images;
pub mod markup;
pub mod scripts;
pub mod sprites;
pub mod styles;

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::{
    config::Config,
    core::BuildMode,
    paths::PathMap,
    reload::{NoopSink, ReloadMessage, ReloadSink},
};

/// Everything a task needs to run.
#[derive(Clone)]
pub struct TaskContext {
    pub config: Arc<Config>,
    pub paths: PathMap,
    /// Live-reload notifications; a no-op outside the dev pipeline.
    pub reload: Arc<dyn ReloadSink>,
    /// Port the live-reload client should connect to, when a hub is running.
    pub reload_port: Option<u16>,
}

impl TaskContext {
    pub fn new(config: Arc<Config>) -> Self {
        let paths = config.path_map();
        Self {
            config,
            paths,
            reload: Arc::new(NoopSink),
            reload_port: None,
        }
    }

    /// Attach a live-reload sink.
    pub fn with_reload(mut self, sink: Arc<dyn ReloadSink>, port: u16) -> Self {
        self.reload = sink;
        self.reload_port = Some(port);
        self
    }

    /// Notify clients if `mode` asks for live reload.
    pub fn notify(&self, mode: BuildMode, msg: ReloadMessage) {
        if mode.live_reload {
            self.reload.send(msg);
        }
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("paths", &self.paths)
            .field("reload_port", &self.reload_port)
            .finish_non_exhaustive()
    }
}

/// Identity of a runnable task (graph node).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskId {
    Clean,
    Html,
    Css,
    CssProd,
    Js,
    JsProd,
    Images,
    ImagesProd,
    Fonts,
    FontsStyle,
    Otf2ttf,
    SvgSprites,
    SvgSpritesProd,
    Watch,
    Serve,
}

impl TaskId {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Html => "html",
            Self::Css => "css",
            Self::CssProd => "css-prod",
            Self::Js => "js",
            Self::JsProd => "js-prod",
            Self::Images => "images",
            Self::ImagesProd => "images-prod",
            Self::Fonts => "fonts",
            Self::FontsStyle => "fonts-style",
            Self::Otf2ttf => "otf2ttf",
            Self::SvgSprites => "svg-sprites",
            Self::SvgSpritesProd => "svg-sprites-prod",
            Self::Watch => "watch",
            Self::Serve => "serve",
        }
    }

    /// Build mode a task variant runs in.
    pub const fn mode(self) -> BuildMode {
        match self {
            Self::CssProd | Self::JsProd | Self::ImagesProd | Self::SvgSpritesProd => {
                BuildMode::PRODUCTION
            }
            _ => BuildMode::DEVELOPMENT,
        }
    }

    /// Run the task to completion.
    ///
    /// `js` in development mode and `watch`/`serve` return as soon as their
    /// resident process or thread is started.
    pub fn run(self, ctx: &TaskContext) -> Result<()> {
        let mode = self.mode();
        match self {
            Self::Clean => clean::run(ctx),
            Self::Html => markup::run(ctx, mode),
            Self::Css | Self::CssProd => styles::run(ctx, mode),
            Self::Js | Self::JsProd => scripts::run(ctx, mode),
            Self::Images | Self::ImagesProd => images::run(ctx, mode),
            Self::Fonts => fonts::convert(ctx),
            Self::FontsStyle => fonts::manifest(ctx),
            Self::Otf2ttf => fonts::otf2ttf(ctx),
            Self::SvgSprites | Self::SvgSpritesProd => sprites::run(ctx, mode),
            Self::Watch => crate::watch::start(ctx.clone()),
            Self::Serve => crate::serve::start(ctx),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Context rooted in a temporary project, for task tests.
#[cfg(test)]
pub fn test_context(root: &std::path::Path) -> (TaskContext, Arc<crate::reload::RecordingSink>) {
    let mut config = Config::default();
    config.root = root.to_path_buf();
    config.paths.build = Some("dist".into());

    let sink = Arc::new(crate::reload::RecordingSink::default());
    let ctx = TaskContext::new(Arc::new(config)).with_reload(sink.clone(), 35729);
    (ctx, sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prod_variants() {
        assert!(TaskId::CssProd.mode().minify);
        assert!(!TaskId::Css.mode().minify);
        assert!(TaskId::Html.mode().live_reload);
        assert!(!TaskId::ImagesProd.mode().live_reload);
    }

    #[test]
    fn test_notify_respects_mode() {
        let dir = tempfile::TempDir::new().unwrap();
        let (ctx, sink) = test_context(dir.path());

        ctx.notify(BuildMode::PRODUCTION, ReloadMessage::reload());
        assert!(sink.messages().is_empty());

        ctx.notify(BuildMode::DEVELOPMENT, ReloadMessage::reload());
        assert_eq!(sink.messages().len(), 1);
    }

    #[test]
    fn test_task_names_are_unique() {
        use rustc_hash::FxHashSet;
        let all = [
            TaskId::Clean,
            TaskId::Html,
            TaskId::Css,
            TaskId::CssProd,
            TaskId::Js,
            TaskId::JsProd,
            TaskId::Images,
            TaskId::ImagesProd,
            TaskId::Fonts,
            TaskId::FontsStyle,
            TaskId::Otf2ttf,
            TaskId::SvgSprites,
            TaskId::SvgSpritesProd,
            TaskId::Watch,
            TaskId::Serve,
        ];
        let names: FxHashSet<_> = all.iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), all.len());
    }
}
