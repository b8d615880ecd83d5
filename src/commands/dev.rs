//! `dev`: rebuild, zip and force-deploy on every change.
//!
//! Bundled apps subscribe to webpack in watch mode and run zip and deploy
//! after each successful compilation. Legacy apps watch `src/` and `static/`
//! and re-run `build force-deploy` on change. In both modes a failing step
//! stops the loop; a failed compilation only waits for the next one.

use super::Context;
use super::build::{bundle_targets, prepare_bundle_dir};
use crate::bundler::{BuildEvent, BuildWatch, Webpack, WatchPoll, relocate_chunks};
use crate::config::{DevProperties, SiteTarget, load_manifest};
use crate::error::{Result, ScriptsError};
use crate::pipeline::{ChildProcessRunner, DeployMode, Step, StepRunner};
use crate::ui as output;
use crate::utils::fs::remove_dir_if_exists;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Quiet period that collapses a burst of events into one cycle
pub const DEBOUNCE: Duration = Duration::from_millis(300);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevState {
    Idle,
    Building,
    Zipping,
    Deploying,
    Watching,
    Stopped,
}

/// Collects events until none has arrived for the debounce window.
#[derive(Debug)]
pub struct Debouncer<T: Ord> {
    pending: BTreeSet<T>,
    last_event: Option<Instant>,
    window: Duration,
}

impl<T: Ord> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            pending: BTreeSet::new(),
            last_event: None,
            window,
        }
    }

    pub fn add(&mut self, item: T) {
        self.add_at(item, Instant::now());
    }

    pub fn add_at(&mut self, item: T, now: Instant) {
        self.pending.insert(item);
        self.last_event = Some(now);
    }

    pub fn ready(&self) -> bool {
        self.ready_at(Instant::now())
    }

    pub fn ready_at(&self, now: Instant) -> bool {
        match self.last_event {
            Some(last) => !self.pending.is_empty() && now.duration_since(last) >= self.window,
            None => false,
        }
    }

    pub fn take(&mut self) -> Vec<T> {
        self.last_event = None;
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.last_event = None;
    }
}

/// One zip + deploy round and the state it leaves the loop in.
pub struct DevCycle<'a> {
    runner: &'a mut dyn StepRunner,
    build_dir: PathBuf,
    state: DevState,
}

impl<'a> DevCycle<'a> {
    pub fn new(runner: &'a mut dyn StepRunner, build_dir: PathBuf) -> Self {
        Self {
            runner,
            build_dir,
            state: DevState::Idle,
        }
    }

    pub fn state(&self) -> DevState {
        self.state
    }

    pub fn start_watching(&mut self) {
        self.state = DevState::Watching;
    }

    pub fn stop(&mut self) {
        self.state = DevState::Stopped;
    }

    /// Bundled apps: webpack finished a compilation.
    pub fn on_compiled(&mut self) -> Result<()> {
        self.state = DevState::Building;
        if let Err(e) = relocate_chunks(&self.build_dir) {
            self.stop();
            return Err(e);
        }
        self.step(DevState::Zipping, &Step::Zip)?;
        self.step(DevState::Deploying, &Step::Deploy(DeployMode::Force))?;
        self.state = DevState::Watching;
        Ok(())
    }

    /// Legacy apps: something below `src/` or `static/` changed.
    pub fn on_source_changed(&mut self) -> Result<()> {
        self.step(DevState::Building, &Step::Build(Some(DeployMode::Force)))?;
        self.state = DevState::Watching;
        Ok(())
    }

    fn step(&mut self, state: DevState, step: &Step) -> Result<()> {
        self.state = state;
        if let Err(e) = self.runner.run(step) {
            self.stop();
            return Err(e);
        }
        Ok(())
    }
}

/// Drive `cycle` from webpack compilations until a step fails, the bundler
/// goes away or `interrupted` turns true.
pub fn bundled_loop(
    watch: &BuildWatch,
    cycle: &mut DevCycle<'_>,
    interrupted: impl Fn() -> bool,
) -> Result<()> {
    let mut compiled = Debouncer::new(DEBOUNCE);
    cycle.start_watching();

    loop {
        if interrupted() {
            cycle.stop();
            return Err(ScriptsError::Interrupted);
        }

        match watch.poll(POLL_INTERVAL) {
            WatchPoll::Event(BuildEvent::Succeeded) => compiled.add(()),
            WatchPoll::Event(BuildEvent::Failed { summary }) => {
                compiled.clear();
                output::warning(&format!("{}, waiting for the next change", summary));
            }
            WatchPoll::Event(BuildEvent::Exited) | WatchPoll::Closed => {
                cycle.stop();
                if interrupted() {
                    return Err(ScriptsError::Interrupted);
                }
                return Err(ScriptsError::Other("webpack stopped watching".to_string()));
            }
            WatchPoll::Idle => {}
        }

        if compiled.ready() {
            compiled.take();
            output::stamp("Compiled, deploying");
            cycle.on_compiled()?;
            output::stamp("Deployed, watching for changes");
        }
    }
}

/// Drive `cycle` from file change notifications.
pub fn legacy_loop(
    changes: &Receiver<PathBuf>,
    cycle: &mut DevCycle<'_>,
    interrupted: impl Fn() -> bool,
) -> Result<()> {
    let mut changed = Debouncer::new(DEBOUNCE);
    cycle.start_watching();

    loop {
        if interrupted() {
            cycle.stop();
            return Err(ScriptsError::Interrupted);
        }

        match changes.recv_timeout(POLL_INTERVAL) {
            Ok(path) => changed.add(path),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                cycle.stop();
                return Err(ScriptsError::Other("file watcher stopped".to_string()));
            }
        }

        if changed.ready() {
            let paths = changed.take();
            if let Some(first) = paths.first() {
                output::stamp(&format!("Changed: {}", first.display()));
                if paths.len() > 1 {
                    output::indent(&format!("and {} more", paths.len() - 1), 1);
                }
            }
            cycle.on_source_changed()?;
            output::stamp("Deployed, watching for changes");
        }
    }
}

fn watch_sources(ctx: &Context) -> Result<(RecommendedWatcher, Receiver<PathBuf>)> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: std::result::Result<Event, notify::Error>| {
            if let Ok(event) = res {
                if matches!(event.kind, EventKind::Access(_)) {
                    return;
                }
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        },
        Config::default(),
    )
    .map_err(|e| ScriptsError::Other(format!("Failed to start file watcher: {}", e)))?;

    for dir in [ctx.src_dir(), ctx.static_dir()] {
        if dir.is_dir() {
            watcher
                .watch(&dir, RecursiveMode::Recursive)
                .map_err(|e| ScriptsError::Other(format!("Failed to watch {}: {}", dir.display(), e)))?;
            output::verbose(&format!("Watching {}", dir.display()));
        }
    }
    Ok((watcher, rx))
}

fn run_bundled(ctx: &Context, runner: &mut dyn StepRunner) -> Result<()> {
    let (loaded, targets) = bundle_targets(ctx)?;
    prepare_bundle_dir(ctx, &loaded)?;

    let mut watch = Webpack::new(&ctx.root).watch(&targets)?;
    let mut cycle = DevCycle::new(runner, ctx.build_dir());
    let result = bundled_loop(&watch, &mut cycle, output::is_interrupted);
    watch.close();
    result
}

fn run_legacy(ctx: &Context, runner: &mut dyn StepRunner) -> Result<()> {
    let (_watcher, changes) = watch_sources(ctx)?;
    let mut cycle = DevCycle::new(runner, ctx.build_dir());

    output::stamp("Initial build");
    cycle.on_source_changed()?;
    legacy_loop(&changes, &mut cycle, output::is_interrupted)
}

pub fn run(ctx: &Context) -> Result<()> {
    let loaded = load_manifest(&ctx.root)?;
    let props = DevProperties::load_required(&ctx.root)?;
    let target = SiteTarget::dev(&props)?;

    ctrlc::set_handler(output::mark_interrupted)
        .map_err(|e| ScriptsError::Other(format!("Failed to set Ctrl+C handler: {}", e)))?;

    output::header(&format!(
        "Developing {} against {}://{}",
        loaded.manifest.id,
        target.scheme.as_str(),
        target.domain
    ));
    output::keyval(
        "Mode",
        if loaded.manifest.bundled {
            "webpack watch"
        } else {
            "file watch, build force-deploy"
        },
    );
    output::keyval("Site", &target.site_name);
    output::keyval("Addon", &target.addon_name);
    output::info("Press Ctrl+C to stop");

    let mut runner = ChildProcessRunner::current(&ctx.root, ctx.forwarded.clone())?;
    let result = if loaded.manifest.bundled {
        run_bundled(ctx, &mut runner)
    } else {
        run_legacy(ctx, &mut runner)
    };

    // Children see the same Ctrl+C and may report it as their own failure
    if output::is_interrupted() {
        remove_dir_if_exists(&ctx.build_dir())?;
        output::info("Stopped watching, removed build/");
        return Err(ScriptsError::Interrupted);
    }
    result
}

#[cfg(test)]
mod tests;
