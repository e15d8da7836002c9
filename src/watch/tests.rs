use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::debouncer::{DEBOUNCE_MS, Debouncer, is_temp_file};
use super::router::route;
use crate::paths::PathMap;
use crate::tasks::TaskId;

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn metadata_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn map() -> PathMap {
    PathMap::new(Path::new("/p/#src"), Path::new("/p/p"))
}

fn paths(list: &[&str]) -> Vec<PathBuf> {
    list.iter().map(PathBuf::from).collect()
}

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new();
    assert!(!debouncer.is_ready());
}

#[test]
fn test_events_deduplicate() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/p/#src/index.html"], create_kind()));
    debouncer.add_event(&make_event(vec!["/p/#src/index.html"], modify_kind()));
    assert_eq!(debouncer.changes.len(), 1);
}

#[test]
fn test_metadata_and_temp_files_ignored() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/p/#src/index.html"], metadata_kind()));
    debouncer.add_event(&make_event(vec!["/p/#src/.index.html.swp"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/p/#src/style.scss~"], modify_kind()));
    assert!(debouncer.changes.is_empty());
}

#[test]
fn test_not_ready_within_window() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/p/#src/a.html"], modify_kind()));
    assert!(!debouncer.is_ready());
    assert!(debouncer.take_if_ready().is_none());
    assert!(debouncer.sleep_duration() <= Duration::from_millis(DEBOUNCE_MS));
}

#[test]
fn test_ready_after_quiet_period() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/p/#src/b.html", "/p/#src/a.html"], modify_kind()));
    debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 50));

    let batch = debouncer.take_if_ready().unwrap();
    assert_eq!(batch, paths(&["/p/#src/a.html", "/p/#src/b.html"]));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.take_if_ready().is_none());
}

#[test]
fn test_temp_file_detection() {
    assert!(is_temp_file(Path::new("a.bak")));
    assert!(is_temp_file(Path::new(".#index.html")));
    assert!(!is_temp_file(Path::new("index.html")));
}

#[test]
fn test_route_one_task_per_class() {
    let routes = route(
        &paths(&[
            "/p/#src/index.html",
            "/p/#src/_header.html",
            "/p/#src/scss/style.scss",
            "/p/#src/scss/parts/_grid.scss",
        ]),
        &map(),
    );
    assert_eq!(routes.tasks.into_iter().collect::<Vec<_>>(), vec![TaskId::Html, TaskId::Css]);
    assert!(!routes.bundle_changed);
}

#[test]
fn test_route_scripts_and_images() {
    let routes = route(
        &paths(&["/p/#src/js/modules/menu.js", "/p/#src/img/icons/a.png"]),
        &map(),
    );
    assert!(routes.tasks.contains(&TaskId::Js));
    assert!(routes.tasks.contains(&TaskId::Images));
}

#[test]
fn test_fonts_and_sprites_not_routed() {
    let routes = route(
        &paths(&["/p/#src/fonts/Roboto.ttf", "/p/#src/sprites/arrow.svg"]),
        &map(),
    );
    assert!(routes.tasks.is_empty());
}

#[test]
fn test_bundle_output_triggers_reload_only() {
    let routes = route(&paths(&["/p/p/js/script.min.js", "/p/p/index.html"]), &map());
    assert!(routes.bundle_changed);
    assert!(routes.tasks.is_empty());
}
