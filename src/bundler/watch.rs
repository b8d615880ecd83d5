//! Watch-mode bundler subscription.
//!
//! A [`BuildWatch`] yields [`BuildEvent`]s over a channel. The webpack
//! implementation feeds it from the compiler's console output, tests feed it
//! directly through [`BuildWatch::from_channel`].

use crate::error::{Result, ScriptsError};
use crate::utils::platform::display_command;
use regex::Regex;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::LazyLock;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

static COMPILED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcompiled (successfully|with (.+?)) in\b").expect("Valid regex pattern")
});

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("Valid regex pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// A compilation finished without errors (warnings allowed)
    Succeeded,
    /// A compilation finished with errors
    Failed { summary: String },
    /// The bundler process went away
    Exited,
}

/// Recognize webpack's per-compilation summary line.
pub fn parse_build_line(line: &str) -> Option<BuildEvent> {
    let clean = ANSI_ESCAPE.replace_all(line, "");
    let caps = COMPILED_LINE.captures(&clean)?;
    match caps.get(2) {
        Some(detail) if detail.as_str().contains("error") => Some(BuildEvent::Failed {
            summary: clean.trim().to_string(),
        }),
        _ => Some(BuildEvent::Succeeded),
    }
}

pub enum WatchPoll {
    Event(BuildEvent),
    Idle,
    Closed,
}

pub struct BuildWatch {
    child: Option<Child>,
    events: Receiver<BuildEvent>,
    reader: Option<JoinHandle<()>>,
}

impl BuildWatch {
    /// Spawn `cmd` and subscribe to the compilations it reports on stdout.
    ///
    /// Compiler output is echoed as it arrives. On unix the process leads
    /// its own group so that [`close`](Self::close) reaches the processes
    /// it starts.
    pub fn spawn(mut cmd: Command) -> Result<Self> {
        let rendered = display_command(&cmd);
        cmd.stdout(Stdio::piped()).stderr(Stdio::inherit());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let mut child = cmd.spawn().map_err(|e| ScriptsError::SystemCommandFailed {
            command: rendered.clone(),
            reason: e.to_string(),
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ScriptsError::SystemCommandFailed {
                command: rendered,
                reason: "stdout was not captured".to_string(),
            })?;

        let (tx, rx) = mpsc::channel();
        let reader = std::thread::spawn(move || {
            for line in BufReader::new(stdout).lines().map_while(|l| l.ok()) {
                println!("{}", line);
                if let Some(event) = parse_build_line(&line)
                    && tx.send(event).is_err()
                {
                    return;
                }
            }
            let _ = tx.send(BuildEvent::Exited);
        });

        Ok(Self {
            child: Some(child),
            events: rx,
            reader: Some(reader),
        })
    }

    pub fn from_channel(events: Receiver<BuildEvent>) -> Self {
        Self {
            child: None,
            events,
            reader: None,
        }
    }

    pub fn poll(&self, timeout: Duration) -> WatchPoll {
        match self.events.recv_timeout(timeout) {
            Ok(event) => WatchPoll::Event(event),
            Err(RecvTimeoutError::Timeout) => WatchPoll::Idle,
            Err(RecvTimeoutError::Disconnected) => WatchPoll::Closed,
        }
    }

    /// Stop the bundler and everything it started. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(mut child) = self.child.take() {
            terminate_tree(&mut child);
            let _ = child.wait();
        }
        // Detached: the reader ends on EOF once the last pipe holder is gone
        drop(self.reader.take());
    }
}

/// `npx` runs webpack as a grandchild that shares the stdout pipe.
#[cfg(unix)]
fn terminate_tree(child: &mut Child) {
    let group = format!("-{}", child.id());
    let _ = Command::new("kill")
        .args(["-TERM", "--", &group])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    let _ = child.kill();
}

#[cfg(windows)]
fn terminate_tree(child: &mut Child) {
    let _ = Command::new("taskkill")
        .args(["/T", "/F", "/PID", &child.id().to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    let _ = child.kill();
}

#[cfg(not(any(unix, windows)))]
fn terminate_tree(child: &mut Child) {
    let _ = child.kill();
}

impl Drop for BuildWatch {
    fn drop(&mut self) {
        self.close();
    }
}
