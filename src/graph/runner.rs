//! Phase-by-phase execution of a [`TaskGraph`].
//!
//! A phase is one dependency level. Its tasks run on rayon and all of them
//! finish before the first failure (if any) stops the pipeline.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rayon::prelude::*;

use super::TaskGraph;
use crate::{
    log,
    tasks::{TaskContext, TaskId},
};

/// Run every phase of `graph` in order.
pub fn run(graph: &TaskGraph, ctx: &TaskContext) -> Result<()> {
    run_with(graph, |task| task.run(ctx))
}

/// Run with a custom task body.
pub(super) fn run_with<F>(graph: &TaskGraph, body: F) -> Result<()>
where
    F: Fn(TaskId) -> Result<()> + Sync,
{
    for phase in graph.levels()? {
        let results: Vec<(TaskId, Result<()>)> = phase
            .par_iter()
            .map(|&task| {
                log!("task"; "starting `{}` ({})", task.cyan(), task.mode().label());
                let start = Instant::now();
                let result = body(task);
                if result.is_ok() {
                    log!("task"; "finished `{}` after {}", task.cyan(), format_ms(start.elapsed()));
                }
                (task, result)
            })
            .collect();

        if let Some((task, Err(e))) = results.into_iter().find(|(_, r)| r.is_err()) {
            return Err(e).with_context(|| format!("task `{task}` failed"));
        }
    }
    Ok(())
}

fn format_ms(elapsed: Duration) -> String {
    format!("{} ms", elapsed.as_millis()).dimmed().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn graph() -> TaskGraph {
        TaskGraph::builder()
            .then(TaskId::Clean)
            .parallel([TaskId::Html, TaskId::Css, TaskId::Js])
            .then(TaskId::Serve)
            .build()
            .unwrap()
    }

    #[test]
    fn test_phase_order() {
        let seen = Mutex::new(Vec::new());
        run_with(&graph(), |task| {
            seen.lock().push(task);
            Ok(())
        })
        .unwrap();

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], TaskId::Clean);
        assert_eq!(seen[4], TaskId::Serve);
    }

    #[test]
    fn test_failure_lets_siblings_finish_and_stops_next_phase() {
        let seen = Mutex::new(Vec::new());
        let result = run_with(&graph(), |task| {
            seen.lock().push(task);
            if task == TaskId::Css {
                anyhow::bail!("boom");
            }
            Ok(())
        });

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("task `css` failed"));
        assert!(format!("{err:#}").contains("boom"));

        let seen = seen.into_inner();
        assert!(seen.contains(&TaskId::Html));
        assert!(seen.contains(&TaskId::Js));
        assert!(!seen.contains(&TaskId::Serve));
    }
}
