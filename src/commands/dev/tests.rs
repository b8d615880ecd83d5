use super::*;
use crate::pipeline::classify_exit;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

/// Shares its call log so the loop's `interrupted` check can read it.
#[derive(Default)]
struct FakeRunner {
    calls: Rc<RefCell<Vec<Step>>>,
    exit_codes: HashMap<&'static str, i32>,
}

impl StepRunner for FakeRunner {
    fn run(&mut self, step: &Step) -> Result<()> {
        self.calls.borrow_mut().push(step.clone());
        let code = self.exit_codes.get(step.name()).copied().unwrap_or(0);
        classify_exit(step.name(), Some(code), None)
    }
}

fn build_dir(dir: &TempDir) -> PathBuf {
    let build = dir.path().join("build");
    fs::create_dir_all(&build).unwrap();
    build
}

fn after(window: Duration) -> impl Fn() -> bool {
    let deadline = Instant::now() + window;
    move || Instant::now() >= deadline
}

#[test]
fn debouncer_waits_for_quiet_window() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(DEBOUNCE);
    assert!(!debouncer.ready_at(start));

    debouncer.add_at("a", start);
    debouncer.add_at("b", start + Duration::from_millis(200));
    debouncer.add_at("a", start + Duration::from_millis(250));

    assert!(!debouncer.ready_at(start + Duration::from_millis(400)));
    assert!(debouncer.ready_at(start + Duration::from_millis(550)));
    assert_eq!(debouncer.take(), vec!["a", "b"]);
    assert!(!debouncer.ready_at(start + Duration::from_secs(5)));
}

#[test]
fn burst_of_compilations_triggers_one_zip_and_force_deploy() {
    let dir = TempDir::new().unwrap();
    let (tx, rx) = mpsc::channel();
    for _ in 0..3 {
        tx.send(BuildEvent::Succeeded).unwrap();
    }
    let watch = BuildWatch::from_channel(rx);
    let mut runner = FakeRunner::default();
    let calls = Rc::clone(&runner.calls);
    let mut cycle = DevCycle::new(&mut runner, build_dir(&dir));

    let seen = Rc::clone(&calls);
    let stop_after_deploy = move || seen.borrow().len() >= 2;
    let err = bundled_loop(&watch, &mut cycle, stop_after_deploy).unwrap_err();

    assert!(matches!(err, ScriptsError::Interrupted));
    assert_eq!(cycle.state(), DevState::Stopped);
    assert_eq!(
        *calls.borrow(),
        vec![Step::Zip, Step::Deploy(DeployMode::Force)]
    );
    drop(tx);
}

#[test]
fn failing_deploy_stops_the_loop() {
    let dir = TempDir::new().unwrap();
    let (tx, rx) = mpsc::channel();
    tx.send(BuildEvent::Succeeded).unwrap();
    let watch = BuildWatch::from_channel(rx);
    let mut runner = FakeRunner::default();
    runner.exit_codes.insert("force-deploy", 1);
    let calls = Rc::clone(&runner.calls);
    let mut cycle = DevCycle::new(&mut runner, build_dir(&dir));

    let err = bundled_loop(&watch, &mut cycle, after(Duration::from_secs(10))).unwrap_err();

    assert!(matches!(err, ScriptsError::StepFailed { code: 1, .. }));
    assert_eq!(cycle.state(), DevState::Stopped);
    assert_eq!(
        *calls.borrow(),
        vec![Step::Zip, Step::Deploy(DeployMode::Force)]
    );
    drop(tx);
}

#[test]
fn failed_compilation_keeps_watching_without_deploying() {
    let dir = TempDir::new().unwrap();
    let (tx, rx) = mpsc::channel();
    tx.send(BuildEvent::Succeeded).unwrap();
    tx.send(BuildEvent::Failed {
        summary: "webpack compiled with 1 error".to_string(),
    })
    .unwrap();
    let watch = BuildWatch::from_channel(rx);
    let mut runner = FakeRunner::default();
    let calls = Rc::clone(&runner.calls);
    let mut cycle = DevCycle::new(&mut runner, build_dir(&dir));

    let err = bundled_loop(&watch, &mut cycle, after(DEBOUNCE * 3)).unwrap_err();

    assert!(matches!(err, ScriptsError::Interrupted));
    assert!(calls.borrow().is_empty());
    drop(tx);
}

#[test]
fn bundler_exit_ends_the_loop() {
    let dir = TempDir::new().unwrap();
    let (tx, rx) = mpsc::channel();
    tx.send(BuildEvent::Exited).unwrap();
    let watch = BuildWatch::from_channel(rx);
    let mut runner = FakeRunner::default();
    let mut cycle = DevCycle::new(&mut runner, build_dir(&dir));

    let err = bundled_loop(&watch, &mut cycle, || false).unwrap_err();

    assert!(matches!(err, ScriptsError::Other(_)));
    assert_eq!(cycle.state(), DevState::Stopped);
    drop(tx);
}

#[test]
fn compiled_cycle_relocates_chunks_first() {
    let dir = TempDir::new().unwrap();
    let build = dir.path().join("build");
    fs::create_dir_all(&build).unwrap();
    fs::write(build.join("chunk-vendor.js"), "chunk").unwrap();
    fs::write(build.join("index.js"), "main").unwrap();
    let mut runner = FakeRunner::default();
    let mut cycle = DevCycle::new(&mut runner, build.clone());

    cycle.on_compiled().unwrap();

    assert_eq!(cycle.state(), DevState::Watching);
    assert!(build.join("resource/chunk-vendor.js").exists());
    assert!(build.join("index.js").exists());
}

#[test]
fn legacy_changes_rerun_build_force_deploy_once_per_burst() {
    let dir = TempDir::new().unwrap();
    let (tx, rx) = mpsc::channel();
    tx.send(dir.path().join("src/index.js")).unwrap();
    tx.send(dir.path().join("src/index.js")).unwrap();
    tx.send(dir.path().join("static/manifest.json")).unwrap();
    let mut runner = FakeRunner::default();
    let calls = Rc::clone(&runner.calls);
    let mut cycle = DevCycle::new(&mut runner, build_dir(&dir));

    let seen = Rc::clone(&calls);
    let err = legacy_loop(&rx, &mut cycle, move || !seen.borrow().is_empty()).unwrap_err();

    assert!(matches!(err, ScriptsError::Interrupted));
    assert_eq!(
        *calls.borrow(),
        vec![Step::Build(Some(DeployMode::Force))]
    );
    drop(tx);
}

#[test]
fn legacy_build_failure_stops_the_loop() {
    let dir = TempDir::new().unwrap();
    let (tx, rx) = mpsc::channel();
    tx.send(dir.path().join("src/index.js")).unwrap();
    let mut runner = FakeRunner::default();
    runner.exit_codes.insert("build", 3);
    let mut cycle = DevCycle::new(&mut runner, build_dir(&dir));

    let err = legacy_loop(&rx, &mut cycle, after(Duration::from_secs(10))).unwrap_err();

    assert_eq!(err.exit_code(), 3);
    assert_eq!(cycle.state(), DevState::Stopped);
    drop(tx);
}
