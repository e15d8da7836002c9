//! Named targets as task graphs.

use super::{GraphError, TaskGraph};
use crate::{cli::Target, tasks::TaskId};

/// Graph for a command-line target.
pub fn pipeline(target: Target) -> Result<TaskGraph, GraphError> {
    let builder = TaskGraph::builder();
    let builder = match target {
        Target::Dev => builder
            .then(TaskId::Clean)
            .then(TaskId::Fonts)
            .parallel([
                TaskId::Html,
                TaskId::Css,
                TaskId::Js,
                TaskId::Images,
                TaskId::SvgSprites,
                TaskId::Watch,
            ])
            .then(TaskId::Serve),
        Target::Prod => builder.then(TaskId::Clean).parallel([
            TaskId::Html,
            TaskId::CssProd,
            TaskId::JsProd,
            TaskId::ImagesProd,
            TaskId::Fonts,
            TaskId::SvgSpritesProd,
        ]),
        Target::Start => builder.then(TaskId::Otf2ttf).then(TaskId::FontsStyle),
        single => builder.parallel(single_task(single)),
    };
    builder.build()
}

/// Task behind a single-task target; `None` for composite pipelines.
fn single_task(target: Target) -> Option<TaskId> {
    Some(match target {
        Target::Clean => TaskId::Clean,
        Target::Html => TaskId::Html,
        Target::Css => TaskId::Css,
        Target::CssProd => TaskId::CssProd,
        Target::Js => TaskId::Js,
        Target::JsProd => TaskId::JsProd,
        Target::Images => TaskId::Images,
        Target::ImagesProd => TaskId::ImagesProd,
        Target::Fonts => TaskId::Fonts,
        Target::FontsStyle => TaskId::FontsStyle,
        Target::Otf2ttf => TaskId::Otf2ttf,
        Target::SvgSprites => TaskId::SvgSprites,
        Target::SvgSpritesProd => TaskId::SvgSpritesProd,
        Target::Watch => TaskId::Watch,
        Target::Serve => TaskId::Serve,
        Target::Dev | Target::Prod | Target::Start => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn test_dev_pipeline() {
        let levels = pipeline(Target::Dev).unwrap().levels().unwrap();
        assert_eq!(levels.len(), 4);
        assert_eq!(levels[0], vec![TaskId::Clean]);
        assert_eq!(levels[1], vec![TaskId::Fonts]);
        assert_eq!(levels[2].len(), 6);
        assert!(levels[2].contains(&TaskId::Watch));
        assert_eq!(levels[3], vec![TaskId::Serve]);
    }

    #[test]
    fn test_prod_pipeline() {
        let graph = pipeline(Target::Prod).unwrap();
        let levels = graph.levels().unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1].len(), 6);
        assert!(!graph.contains(TaskId::Watch));
        assert!(!graph.contains(TaskId::Serve));
    }

    #[test]
    fn test_start_pipeline() {
        let levels = pipeline(Target::Start).unwrap().levels().unwrap();
        assert_eq!(levels, vec![vec![TaskId::Otf2ttf], vec![TaskId::FontsStyle]]);
    }

    #[test]
    fn test_every_target_builds() {
        for target in Target::value_variants() {
            let graph = pipeline(*target).unwrap();
            assert!(!graph.is_empty(), "{target:?}");
        }
    }

    #[test]
    fn test_single_targets_share_names() {
        for target in Target::value_variants() {
            if let Some(task) = single_task(*target) {
                assert_eq!(task.name(), target.name());
            }
        }
    }
}
