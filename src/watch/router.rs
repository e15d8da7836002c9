//! Changed path → task routing through the Watch table.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::{
    debug,
    paths::{AssetClass, PathMap},
    tasks::TaskId,
};

/// Work derived from one debounced batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct Routes {
    /// At most one task per asset class, in a stable order.
    pub(super) tasks: BTreeSet<TaskId>,
    /// The resident bundler rewrote its output.
    pub(super) bundle_changed: bool,
}

/// Task re-run when a watched file of `class` changes.
const fn task_for(class: AssetClass) -> Option<TaskId> {
    match class {
        AssetClass::Markup => Some(TaskId::Html),
        AssetClass::Styles => Some(TaskId::Css),
        AssetClass::Scripts => Some(TaskId::Js),
        AssetClass::Images => Some(TaskId::Images),
        AssetClass::Fonts | AssetClass::Sprites => None,
    }
}

pub(super) fn route(paths: &[PathBuf], map: &PathMap) -> Routes {
    let bundle_dir = map.dest(AssetClass::Scripts);
    let watch: Vec<_> = AssetClass::ALL
        .into_iter()
        .filter_map(|class| Some((class, map.watch(class)?, task_for(class)?)))
        .collect();

    let mut routes = Routes::default();
    for path in paths {
        if path.starts_with(&bundle_dir) {
            routes.bundle_changed = true;
            continue;
        }
        if path.starts_with(map.build_root()) {
            continue;
        }
        for (class, selector, task) in &watch {
            if selector.matches(path) {
                debug!("watch"; "{} ({}) → {}", path.display(), class.name(), task);
                routes.tasks.insert(*task);
            }
        }
    }
    routes
}
