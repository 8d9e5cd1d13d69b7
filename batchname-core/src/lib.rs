use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

// Internal modules
mod composer;
mod duplicates;
mod entry;
mod error;
mod executor;
mod loader;
mod order;
mod planner;
mod settings;
mod status;

// Re-export public types
pub use composer::{compose, zero_pad};
pub use duplicates::{detect, DuplicateReport, DuplicateSummary};
pub use entry::{join_name, split_name, FileEntry, PreviewRow};
pub use error::{FailureKind, PlanError, RenameFailure};
pub use executor::{
    ExecutionEvent, ExecutionOutcome, ExecutionState, Executor, Progress, RenameFs, RenameJob,
    StdFs, BATCH_UPDATE_SIZE, TEMP_PREFIX,
};
pub use loader::{load_paths, LoadedFiles};
pub use order::{SortColumn, SortDirection, WorkingOrder};
pub use planner::{
    apply_edit, build_preview, refresh_preview, validate_for_commit, CommitPlan, EntryEdit,
    RenamePlan,
};
pub use settings::{
    suggested_zero_fill, Counter, CounterForm, CounterPart, RenameSettings, SettingsForm,
    MAX_ZERO_FILL,
};
pub use status::{Status, StatusLevel};

/// Outcome of loading a new file set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
    /// Zero fill that numbers every loaded file with equal width
    pub suggested_zero_fill: usize,
}

/// Everything the presentation layer shows for the current preview
#[derive(Debug, Clone, Serialize)]
pub struct PreviewReport {
    pub rows: Vec<PreviewRow>,
    pub duplicates: DuplicateSummary,
    pub status: Status,
}

/// Owns the live file set, the settings and at most one running rename job.
///
/// Planning runs synchronously on the caller's thread. A commit hands a deep
/// copy of the entries to a background executor; the live set only takes the
/// executor's result back once the job has finished.
pub struct RenameSession {
    plan: RenamePlan,
    settings: RenameSettings,
    order: WorkingOrder,
    sort: Option<(SortColumn, SortDirection)>,
    fs: Arc<dyn RenameFs>,
    job: Option<RenameJob>,
    status: Status,
}

impl Default for RenameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RenameSession {
    /// Create a session that renames on the real filesystem
    pub fn new() -> Self {
        Self::with_fs(Arc::new(StdFs))
    }

    /// Create a session with a custom filesystem backend
    pub fn with_fs(fs: Arc<dyn RenameFs>) -> Self {
        Self {
            plan: RenamePlan::default(),
            settings: RenameSettings::default(),
            order: WorkingOrder::identity(0),
            sort: None,
            fs,
            job: None,
            status: Status::default(),
        }
    }

    /// Replace the file set with the valid paths among `paths`
    pub fn load<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<LoadSummary, PlanError> {
        self.ensure_idle()?;

        let loaded = load_paths(paths);
        let summary = LoadSummary {
            loaded: loaded.entries.len(),
            skipped: loaded.skipped.len(),
            suggested_zero_fill: suggested_zero_fill(loaded.entries.len()),
        };

        if loaded.entries.is_empty() {
            log::warn!("No valid files among {} paths", paths.len());
            self.status = Status::warning("No valid files were found");
            return Ok(summary);
        }

        self.plan = RenamePlan::new(loaded.entries);
        self.order = match self.sort {
            Some((column, direction)) => {
                WorkingOrder::sorted(self.plan.entries(), column, direction)
            }
            None => WorkingOrder::identity(self.plan.len()),
        };
        self.recompute();

        log::info!("Loaded {} files ({} skipped)", summary.loaded, summary.skipped);
        let message = if summary.skipped > 0 {
            format!(
                "Loaded {} files (skipped {} invalid path(s))",
                summary.loaded, summary.skipped
            )
        } else {
            format!("Loaded {} files", summary.loaded)
        };
        self.status = if self.plan.duplicates().has_duplicates {
            self.duplicates_status()
        } else {
            Status::success(message)
        };

        Ok(summary)
    }

    pub fn settings(&self) -> &RenameSettings {
        &self.settings
    }

    /// Use new settings and recompute every preview
    pub fn set_settings(&mut self, settings: RenameSettings) -> Result<DuplicateReport, PlanError> {
        self.ensure_idle()?;
        self.settings = settings;
        Ok(self.recompute())
    }

    /// Parse raw control values; on invalid numbers the previous previews stay
    pub fn apply_form(&mut self, form: &SettingsForm) -> Result<DuplicateReport, PlanError> {
        self.ensure_idle()?;
        match form.parse() {
            Ok(settings) => self.set_settings(settings),
            Err(e) => {
                log::warn!("{}", e);
                self.status = Status::warning("Invalid number input");
                Err(e)
            }
        }
    }

    /// Type a stem or extension directly into one entry
    pub fn edit(&mut self, index: usize, edit: EntryEdit) -> Result<DuplicateReport, PlanError> {
        self.ensure_idle()?;
        let report = apply_edit(&mut self.plan, index, edit)?;
        self.status = self.preview_status();
        Ok(report)
    }

    /// Reorder the view by a column and renumber the counters along it
    pub fn sort_by(
        &mut self,
        column: SortColumn,
        direction: SortDirection,
    ) -> Result<DuplicateReport, PlanError> {
        self.ensure_idle()?;
        self.sort = Some((column, direction));
        self.order = WorkingOrder::sorted(self.plan.entries(), column, direction);
        let report = self.recompute();

        if !report.summary.has_duplicates {
            self.status = Status::info(format!(
                "Files sorted {} by {}",
                direction.label(),
                column.label()
            ));
        }
        Ok(report)
    }

    /// Sort by `column`, flipping the direction when it is already the sort column
    pub fn toggle_sort(&mut self, column: SortColumn) -> Result<DuplicateReport, PlanError> {
        let direction = match self.sort {
            Some((current, direction)) if current == column => direction.reversed(),
            _ => SortDirection::Ascending,
        };
        self.sort_by(column, direction)
    }

    /// Use an order supplied by the presentation layer (storage indices in display order)
    pub fn set_order(&mut self, indices: Vec<usize>) -> Result<DuplicateReport, PlanError> {
        self.ensure_idle()?;
        let len = self.plan.len();
        self.order = WorkingOrder::from_indices(indices, len).ok_or(PlanError::InvalidOrder(len))?;
        self.sort = None;
        Ok(self.recompute())
    }

    pub fn plan(&self) -> &RenamePlan {
        &self.plan
    }

    pub fn order(&self) -> &WorkingOrder {
        &self.order
    }

    pub fn duplicates(&self) -> DuplicateSummary {
        self.plan.duplicates()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Rows in working order
    pub fn rows(&self) -> Vec<PreviewRow> {
        let entries = self.plan.entries();
        self.order
            .iter()
            .filter_map(|i| entries.get(i).map(|e| PreviewRow::new(i, e)))
            .collect()
    }

    pub fn preview_report(&self) -> PreviewReport {
        PreviewReport {
            rows: self.rows(),
            duplicates: self.duplicates(),
            status: self.status.clone(),
        }
    }

    pub fn preview_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.preview_report())
            .context("Failed to serialize preview")
    }

    pub fn is_renaming(&self) -> bool {
        self.job.as_ref().map(|j| !j.is_finished()).unwrap_or(false)
    }

    /// Validate the plan and start renaming in the background.
    ///
    /// Returns the number of files the job will rename.
    pub fn commit(&mut self) -> Result<usize, PlanError> {
        self.ensure_idle()?;

        let commit = match validate_for_commit(&self.plan) {
            Ok(commit) => commit,
            Err(e) => {
                log::warn!("Rename blocked: {}", e);
                self.status = Status::error(e.to_string());
                return Err(e);
            }
        };

        let total = commit.len();
        log::info!("Renaming {} files", total);
        self.status = Status::info(format!(
            "Renaming in progress (phase 1/2): 0/{} files",
            total
        ));
        self.job = Some(Executor::new(Arc::clone(&self.fs)).spawn(commit));
        Ok(total)
    }

    /// Fold any events the running job has produced, without blocking.
    ///
    /// Returns the result once the job has finished.
    pub fn poll(&mut self) -> Option<Result<usize, RenameFailure>> {
        let mut events = Vec::new();
        if let Some(job) = self.job.as_mut() {
            while let Some(event) = job.try_next() {
                events.push(event);
            }
        }

        let mut result = None;
        for event in events {
            if let Some(done) = self.handle_event(event) {
                result = Some(done);
            }
        }
        result
    }

    /// Block until the running job ends; `None` when nothing is running
    pub fn wait(&mut self, mut on_progress: impl FnMut(Progress)) -> Option<Result<usize, RenameFailure>> {
        loop {
            let event = self.job.as_mut()?.next_blocking()?;
            if let ExecutionEvent::Progress(progress) = &event {
                on_progress(*progress);
            }
            if let Some(done) = self.handle_event(event) {
                return Some(done);
            }
        }
    }

    fn handle_event(&mut self, event: ExecutionEvent) -> Option<Result<usize, RenameFailure>> {
        match event {
            ExecutionEvent::PassStarted { .. } => None,
            ExecutionEvent::Progress(progress) => {
                self.status = Status::info(format!(
                    "Renaming in progress (phase {}/2): {}/{} files",
                    progress.pass, progress.completed, progress.total
                ));
                None
            }
            ExecutionEvent::Finished(outcome) => {
                self.job = None;
                Some(self.finish(outcome))
            }
        }
    }

    fn finish(&mut self, outcome: ExecutionOutcome) -> Result<usize, RenameFailure> {
        match outcome {
            ExecutionOutcome::Completed { count, entries } => {
                self.plan.replace_entries(entries);
                self.status = Status::success(format!("Successfully renamed {} files!", count));
                Ok(count)
            }
            ExecutionOutcome::Failed { failure, entries } => {
                log::error!("Rename failed: {}", failure);
                // Keep the proposals, but point every entry at what is really on disk
                if entries.len() == self.plan.len() {
                    for (live, done) in self.plan.entries_mut().iter_mut().zip(entries) {
                        live.path = done.path;
                        live.current_stem = done.current_stem;
                        live.current_extension = done.current_extension;
                    }
                    self.status = Status::error(failure.to_string());
                } else {
                    // The worker died without reporting where the files are
                    self.status = Status::error(format!(
                        "{}. Some files may already be renamed; reload them before retrying",
                        failure
                    ));
                }
                Err(failure)
            }
        }
    }

    fn ensure_idle(&mut self) -> Result<(), PlanError> {
        self.poll();
        if self.is_renaming() {
            self.status = Status::warning("Renaming already in progress");
            return Err(PlanError::RenameInProgress);
        }
        Ok(())
    }

    fn recompute(&mut self) -> DuplicateReport {
        let report = refresh_preview(&mut self.plan, &self.settings, &self.order);
        self.status = self.preview_status();
        report
    }

    fn preview_status(&self) -> Status {
        if self.plan.duplicates().has_duplicates {
            self.duplicates_status()
        } else {
            Status::info("Previews updated")
        }
    }

    fn duplicates_status(&self) -> Status {
        let summary = self.plan.duplicates();
        Status::error(
            PlanError::DuplicateNames {
                distinct: summary.distinct_names,
                affected: summary.affected_files,
            }
            .to_string(),
        )
    }
}
