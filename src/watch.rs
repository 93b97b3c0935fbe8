//! File system watcher for incremental rebuilds and live reload.
//!
//! Watches the source tree, batches rapid events with debouncing, routes
//! each changed path to the pipeline tasks that consume it and notifies
//! connected browsers once the batch has rebuilt.
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌───────────────┐    ┌──────────┐
//! │ notify   │───▶│ Debouncer│───▶│ route → tasks │───▶│ reload   │
//! │ events   │    │ (300ms)  │    │ (glob table)  │    │ broadcast│
//! └──────────┘    └──────────┘    └───────────────┘    └──────────┘
//! ```

use crate::{
    config::ProjectConfig,
    log,
    pipeline::Task,
    reload::ReloadHub,
};
use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

const DEBOUNCE_MS: u64 = 300;

/// One row of the dispatch table: source globs and the tasks rerun when
/// a matching file changes.
struct WatchRoute {
    patterns: &'static [&'static str],
    tasks: &'static [Task],
}

/// Globs are matched against paths relative to the source directory.
/// A change can match at most one route; the first wins.
const WATCH_ROUTES: &[WatchRoute] = &[
    WatchRoute {
        patterns: &["scss/**/*.scss"],
        tasks: &[Task::Styles],
    },
    WatchRoute {
        patterns: &["*.html"],
        tasks: &[Task::Markup],
    },
    WatchRoute {
        patterns: &["js/*.js"],
        tasks: &[Task::Scripts],
    },
    WatchRoute {
        patterns: &[
            "img/**/*.png",
            "img/**/*.jpg",
            "img/**/*.jpeg",
            "img/**/*.svg",
        ],
        tasks: &[Task::Images, Task::Webp, Task::Sprite],
    },
];

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Batches rapid file events with debouncing.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
        }
    }

    fn add(&mut self, event: Event) {
        for path in event.paths {
            if !is_temp_file(&path) {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        self.pending.drain().collect()
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

/// Tasks to rerun for one changed path, or none if no route matches.
fn route_tasks(relative: &Path) -> &'static [Task] {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    for route in WATCH_ROUTES {
        for raw in route.patterns {
            // Table patterns are literals, so compilation cannot fail.
            if let Ok(pattern) = Pattern::new(raw)
                && pattern.matches_path_with(relative, options)
            {
                return route.tasks;
            }
        }
    }
    &[]
}

/// Collapse a batch of changed paths into an ordered, deduplicated task
/// list. Order follows the dispatch table, so `Images` always precedes
/// `Webp` and `Sprite` when both are triggered.
fn tasks_for_changes(paths: &[PathBuf], source: &Path) -> Vec<Task> {
    let mut tasks = Vec::new();
    for path in paths {
        let Ok(relative) = path.strip_prefix(source) else {
            continue;
        };
        for task in route_tasks(relative) {
            if !tasks.contains(task) {
                tasks.push(*task);
            }
        }
    }
    tasks.sort_by_key(|task| {
        WATCH_ROUTES
            .iter()
            .flat_map(|route| route.tasks)
            .position(|t| t == task)
    });
    tasks
}

/// Rerun the routed tasks for one change batch. Failures are logged and
/// leave the watcher running; the browser is only told to reload after
/// every task in the batch succeeded.
fn handle_changes(paths: &[PathBuf], config: &ProjectConfig, hub: &ReloadHub) {
    let source = &config.build.source;
    let tasks = tasks_for_changes(paths, source);
    if tasks.is_empty() {
        return;
    }

    let changed: Vec<_> = paths
        .iter()
        .filter_map(|p| p.strip_prefix(source).ok())
        .map(|p| p.display().to_string())
        .collect();
    log!("watch"; "{} changed", changed.join(", "));

    for task in &tasks {
        if let Err(err) = task.run(config) {
            log!("watch"; "{} failed", task.name());
            log!("error"; "{err:#}");
            return;
        }
    }

    hub.broadcast();
}

/// Start blocking file watcher with debouncing and live rebuild.
pub fn watch_for_changes_blocking(config: &'static ProjectConfig, hub: Arc<ReloadHub>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;

    let source = &config.build.source;
    watcher
        .watch(source, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", source.display()))?;

    log!("watch"; "watching {}", source.display());

    let mut debouncer = Debouncer::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => {
                debouncer.add(event);
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) if debouncer.ready() => {
                handle_changes(&debouncer.take(), config, &hub);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            // Irrelevant events, timeout without a ready batch
            _ => {}
        }
    }

    Ok(())
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_styles() {
        assert_eq!(route_tasks(Path::new("scss/main.scss")), &[Task::Styles]);
        assert_eq!(
            route_tasks(Path::new("scss/blocks/_header.scss")),
            &[Task::Styles]
        );
    }

    #[test]
    fn test_route_markup_is_root_only() {
        assert_eq!(route_tasks(Path::new("index.html")), &[Task::Markup]);
        assert!(route_tasks(Path::new("partials/nav.html")).is_empty());
    }

    #[test]
    fn test_route_scripts_is_flat() {
        assert_eq!(route_tasks(Path::new("js/app.js")), &[Task::Scripts]);
        assert!(route_tasks(Path::new("js/bootstrap/bundle.min.js")).is_empty());
    }

    #[test]
    fn test_route_images_fans_out() {
        assert_eq!(
            route_tasks(Path::new("img/icons-sprite/arrow.svg")),
            &[Task::Images, Task::Webp, Task::Sprite]
        );
        assert_eq!(
            route_tasks(Path::new("img/photo.jpeg")),
            &[Task::Images, Task::Webp, Task::Sprite]
        );
    }

    #[test]
    fn test_unrouted_paths_are_ignored() {
        assert!(route_tasks(Path::new("fonts/body.ttf")).is_empty());
        assert!(route_tasks(Path::new("notes.txt")).is_empty());
    }

    #[test]
    fn test_batch_dedupes_and_orders_tasks() {
        let source = Path::new("/proj/source");
        let paths = vec![
            source.join("img/a.png"),
            source.join("scss/main.scss"),
            source.join("img/b.svg"),
            Path::new("/elsewhere/x.scss").to_path_buf(),
        ];

        let tasks = tasks_for_changes(&paths, source);
        assert_eq!(
            tasks,
            vec![Task::Styles, Task::Images, Task::Webp, Task::Sprite]
        );
    }

    #[test]
    fn test_removals_count_as_changes() {
        use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

        assert!(is_relevant(&Event::new(EventKind::Remove(RemoveKind::File))));
        assert!(is_relevant(&Event::new(EventKind::Create(CreateKind::File))));
        assert!(is_relevant(&Event::new(EventKind::Modify(ModifyKind::Any))));
        assert!(!is_relevant(&Event::new(EventKind::Access(AccessKind::Read))));
    }

    #[test]
    fn test_temp_files_are_filtered() {
        assert!(is_temp_file(Path::new("scss/main.scss.swp")));
        assert!(is_temp_file(Path::new("scss/main.scss~")));
        assert!(is_temp_file(Path::new("scss/.main.scss.tmp")));
        assert!(!is_temp_file(Path::new("scss/main.scss")));
    }
}
