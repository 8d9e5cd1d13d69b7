//! Two-pass rename execution
//!
//! Renaming a file straight to its target can hit a name that another file in
//! the same set still holds (two files swapping names, or a rotation). Every
//! file is therefore first moved to a temporary name derived from its target,
//! and only then to the target itself. Proposed names are validated
//! duplicate-free before a plan gets here, so temporary names are unique too.

use crate::entry::FileEntry;
use crate::error::{FailureKind, RenameFailure};
use crate::planner::CommitPlan;
use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Prefix of the temporary names used between the two passes
pub const TEMP_PREFIX: &str = ".batchname-tmp-";

/// Progress is announced every this many files, plus the first and last of each pass
pub const BATCH_UPDATE_SIZE: usize = 50;

/// Filesystem operations the executor needs
pub trait RenameFs: Send + Sync {
    /// Whether anything (file, directory or dangling link) occupies `path`
    fn exists(&self, path: &Path) -> bool;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl RenameFs for StdFs {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionState {
    Idle,
    RenamingTempPass,
    RenamingFinalPass,
    Completed,
    Failed,
}

/// Exact position within a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// 1 = temporary names, 2 = final names
    pub pass: u8,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Every file carries its final name; `entries` mirror the disk
    Completed { count: usize, entries: Vec<FileEntry> },
    /// Stopped at the first error; `entries` mirror the disk as far as it got
    Failed {
        failure: RenameFailure,
        entries: Vec<FileEntry>,
    },
}

impl ExecutionOutcome {
    pub fn entries(&self) -> &[FileEntry] {
        match self {
            ExecutionOutcome::Completed { entries, .. } => entries,
            ExecutionOutcome::Failed { entries, .. } => entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    PassStarted { pass: u8, total: usize },
    Progress(Progress),
    Finished(ExecutionOutcome),
}

/// Performs the renames of a validated plan
pub struct Executor {
    fs: Arc<dyn RenameFs>,
    batch_size: usize,
}

impl Executor {
    pub fn new(fs: Arc<dyn RenameFs>) -> Self {
        Self {
            fs,
            batch_size: BATCH_UPDATE_SIZE,
        }
    }

    /// Announce progress every `batch_size` files instead of the default
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Runs both passes on the calling thread, sending progress to `events`.
    ///
    /// The terminal outcome is returned, not sent.
    pub fn execute(&self, plan: CommitPlan, events: &Sender<ExecutionEvent>) -> ExecutionOutcome {
        let mut entries = plan.into_entries();
        let total = entries.len();

        info!("Pass 1/2: moving {} files to temporary names", total);
        events.send(ExecutionEvent::PassStarted { pass: 1, total }).ok();
        if let Err(failure) = self.run_pass(&mut entries, 1, events) {
            return ExecutionOutcome::Failed { failure, entries };
        }

        info!("Pass 2/2: moving {} files to their final names", total);
        events.send(ExecutionEvent::PassStarted { pass: 2, total }).ok();
        if let Err(failure) = self.run_pass(&mut entries, 2, events) {
            return ExecutionOutcome::Failed { failure, entries };
        }

        info!("Successfully renamed {} files", total);
        ExecutionOutcome::Completed {
            count: total,
            entries,
        }
    }

    /// Runs the plan on a background thread
    pub fn spawn(self, plan: CommitPlan) -> RenameJob {
        let (sender, receiver) = mpsc::channel();
        let total = plan.len();

        let handle = std::thread::spawn(move || {
            let outcome = self.execute(plan, &sender);
            sender.send(ExecutionEvent::Finished(outcome)).ok();
        });

        RenameJob {
            receiver,
            handle: Some(handle),
            state: ExecutionState::Idle,
            total,
            finished: false,
        }
    }

    fn run_pass(
        &self,
        entries: &mut [FileEntry],
        pass: u8,
        events: &Sender<ExecutionEvent>,
    ) -> Result<(), RenameFailure> {
        let total = entries.len();

        for (i, entry) in entries.iter_mut().enumerate() {
            let target_name = if pass == 1 {
                format!("{}{}", TEMP_PREFIX, entry.proposed_full_name())
            } else {
                entry.proposed_full_name()
            };

            let target = match entry.path.parent() {
                Some(parent) => parent.join(&target_name),
                None => {
                    return Err(RenameFailure {
                        kind: FailureKind::OtherIo,
                        message: format!("{} has no parent directory", entry.path.display()),
                        pass,
                        completed: i,
                    })
                }
            };

            if let Err(e) = self.rename_one(&entry.path, &target) {
                warn!(
                    "Pass {}/2 stopped after {} of {} files: {}",
                    pass, i, total, e
                );
                return Err(RenameFailure {
                    kind: FailureKind::from_io(&e),
                    message: e.to_string(),
                    pass,
                    completed: i,
                });
            }

            debug!("Renamed: {} -> {}", entry.path.display(), target_name);
            entry.moved_to(target);

            if i % self.batch_size == 0 || i + 1 == total {
                events
                    .send(ExecutionEvent::Progress(Progress {
                        pass,
                        completed: i + 1,
                        total,
                    }))
                    .ok();
            }
        }

        Ok(())
    }

    /// Renames within the same directory, refusing to replace an existing file
    fn rename_one(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.fs.exists(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "{} -> {}: destination already exists",
                    from.display(),
                    to.display()
                ),
            ));
        }

        self.fs.rename(from, to).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("{} -> {}: {}", from.display(), to.display(), e),
            )
        })
    }
}

/// Handle to a running rename job
pub struct RenameJob {
    receiver: Receiver<ExecutionEvent>,
    handle: Option<JoinHandle<()>>,
    state: ExecutionState,
    total: usize,
    finished: bool,
}

impl RenameJob {
    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Next event if one is ready, without blocking
    pub fn try_next(&mut self) -> Option<ExecutionEvent> {
        if self.finished {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(event) => Some(self.track(event)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                let lost = self.lost();
                Some(self.track(lost))
            }
        }
    }

    /// Next event, blocking until one arrives; `None` once finished
    pub fn next_blocking(&mut self) -> Option<ExecutionEvent> {
        if self.finished {
            return None;
        }
        let event = self.receiver.recv().unwrap_or_else(|_| self.lost());
        Some(self.track(event))
    }

    /// Blocks until the job ends, handing every progress update to `on_progress`
    pub fn wait(mut self, mut on_progress: impl FnMut(Progress)) -> ExecutionOutcome {
        while let Some(event) = self.next_blocking() {
            match event {
                ExecutionEvent::Progress(progress) => on_progress(progress),
                ExecutionEvent::PassStarted { .. } => {}
                ExecutionEvent::Finished(outcome) => return outcome,
            }
        }
        self.lost_outcome()
    }

    fn track(&mut self, event: ExecutionEvent) -> ExecutionEvent {
        match &event {
            ExecutionEvent::PassStarted { pass: 1, .. } => {
                self.state = ExecutionState::RenamingTempPass
            }
            ExecutionEvent::PassStarted { .. } => self.state = ExecutionState::RenamingFinalPass,
            ExecutionEvent::Progress(_) => {}
            ExecutionEvent::Finished(outcome) => {
                self.finished = true;
                self.state = match outcome {
                    ExecutionOutcome::Completed { .. } => ExecutionState::Completed,
                    ExecutionOutcome::Failed { .. } => ExecutionState::Failed,
                };
                if let Some(handle) = self.handle.take() {
                    handle.join().ok();
                }
            }
        }
        event
    }

    /// The worker went away without a terminal event
    fn lost(&self) -> ExecutionEvent {
        ExecutionEvent::Finished(self.lost_outcome())
    }

    fn lost_outcome(&self) -> ExecutionOutcome {
        let pass = match self.state {
            ExecutionState::RenamingFinalPass => 2,
            _ => 1,
        };
        ExecutionOutcome::Failed {
            failure: RenameFailure {
                kind: FailureKind::OtherIo,
                message: "Rename thread panicked".to_string(),
                pass,
                completed: 0,
            },
            entries: Vec::new(),
        }
    }
}
