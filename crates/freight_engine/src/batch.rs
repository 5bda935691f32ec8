use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use freight_core::{
    assemble_rows, update, Artifact, Msg, OutputShape, ProgressSnapshot, ProgressState,
    QuoteOutcome, Record, ShipmentDefaults, ShipmentRow, DEFAULT_MAX_CALLS, DEFAULT_WINDOW,
};
use freight_logging::{freight_error, freight_info, freight_warn};

use crate::filename::result_filename;
use crate::table::{read_table, write_workbook, InputTable};
use crate::throttle::Throttle;
use crate::{BatchError, Quoter};

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub defaults: ShipmentDefaults,
    pub max_calls: u32,
    pub window: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            defaults: ShipmentDefaults::default(),
            max_calls: DEFAULT_MAX_CALLS,
            window: DEFAULT_WINDOW,
        }
    }
}

/// An uploaded table to quote. `source_name` picks the decoder and names the result.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub source_name: String,
    pub bytes: Vec<u8>,
    pub shape: OutputShape,
}

/// The progress record shared by the background task and every reader.
#[derive(Debug, Clone, Default)]
pub struct SharedProgress {
    state: Arc<Mutex<ProgressState>>,
}

impl SharedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, msg: Msg) {
        let mut guard = self.lock();
        let state = std::mem::take(&mut *guard);
        *guard = update(state, msg);
    }

    pub fn read(&self) -> ProgressState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct JobContext {
    quoter: Arc<dyn Quoter>,
    throttle: Throttle,
    defaults: ShipmentDefaults,
    progress: SharedProgress,
}

struct RunningJob {
    token: CancellationToken,
    /// Cancelled when the task's future is dropped, however it ends.
    done: CancellationToken,
    handle: JoinHandle<()>,
}

/// Runs at most one batch job at a time on a background task.
pub struct BatchOrchestrator {
    context: Arc<JobContext>,
    current: Mutex<Option<RunningJob>>,
    start_lock: tokio::sync::Mutex<()>,
}

impl BatchOrchestrator {
    pub fn new(quoter: Arc<dyn Quoter>, settings: BatchSettings) -> Self {
        Self::with_progress(quoter, settings, SharedProgress::new())
    }

    pub fn with_progress(
        quoter: Arc<dyn Quoter>,
        settings: BatchSettings,
        progress: SharedProgress,
    ) -> Self {
        Self {
            context: Arc::new(JobContext {
                quoter,
                throttle: Throttle::new(settings.max_calls, settings.window),
                defaults: settings.defaults,
                progress,
            }),
            current: Mutex::new(None),
            start_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn progress_handle(&self) -> SharedProgress {
        self.context.progress.clone()
    }

    /// Starts a job and returns once it is running in the background.
    ///
    /// A job still in flight is cancelled and awaited first; its final writes
    /// to the progress record land before the new job resets it. The table is
    /// parsed up front, so progress reports the row count as soon as this
    /// returns. An unreadable table still counts as a started job that failed.
    pub async fn start_job(&self, request: JobRequest) -> Result<(), BatchError> {
        if request.bytes.is_empty() {
            return Err(BatchError::EmptyInput);
        }
        let _serialized = self.start_lock.lock().await;

        let previous = self.lock_current().as_ref().map(|job| {
            (job.token.clone(), job.done.clone(), !job.handle.is_finished())
        });
        if let Some((token, done, alive)) = previous {
            if alive {
                freight_info!("Cancelling running batch job before starting a new one");
                self.context.progress.dispatch(Msg::CancelRequested);
            }
            token.cancel();
            done.cancelled().await;
        }

        let table = read_table(&request.source_name, &request.bytes);

        // Readers take `current` before the progress record, so holding it
        // here makes the reset and the new handle appear together.
        let mut current = self.lock_current();
        if let Some(finished) = current.take() {
            if let Some(Err(err)) = finished.handle.now_or_never() {
                freight_error!("Previous batch task ended abnormally: {}", err);
            }
        }
        self.context.throttle.reset();
        self.context.progress.dispatch(Msg::JobStarted {
            shape: request.shape,
        });
        let table = match table {
            Ok(table) => table,
            Err(err) => {
                freight_error!("Cannot read batch input {}: {}", request.source_name, err);
                self.context.progress.dispatch(Msg::JobFailed {
                    message: format!("failed to read input table: {err}"),
                });
                return Ok(());
            }
        };
        self.context
            .progress
            .dispatch(Msg::TableLoaded { total: table.len() });

        let token = CancellationToken::new();
        let done = CancellationToken::new();
        let done_guard = done.clone().drop_guard();
        let context = self.context.clone();
        let job_token = token.clone();
        let handle = tokio::spawn(async move {
            let _done_guard = done_guard;
            run_job(context, request, table, job_token).await;
        });
        *current = Some(RunningJob {
            token,
            done,
            handle,
        });
        Ok(())
    }

    /// Asks the running job to stop at its next row; never blocks.
    pub fn cancel(&self) {
        let current = self.lock_current();
        if let Some(job) = current.as_ref() {
            job.token.cancel();
        }
        self.context.progress.dispatch(Msg::CancelRequested);
    }

    pub fn progress(&self) -> ProgressSnapshot {
        let current = self.lock_current();
        let alive = current
            .as_ref()
            .is_some_and(|job| !job.handle.is_finished());
        self.context.progress.read().snapshot(alive)
    }

    pub fn result_artifact(&self) -> Result<Artifact, BatchError> {
        self.context
            .progress
            .read()
            .artifact()
            .cloned()
            .ok_or(BatchError::NoArtifact)
    }

    /// Waits for the current job, if any, to finish on its own.
    pub async fn join(&self) {
        let done = self.lock_current().as_ref().map(|job| job.done.clone());
        if let Some(done) = done {
            done.cancelled().await;
        }
    }

    /// Cancels and awaits the current job.
    pub async fn shutdown(&self) {
        self.cancel();
        self.join().await;
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<RunningJob>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn run_job(
    context: Arc<JobContext>,
    request: JobRequest,
    table: InputTable,
    token: CancellationToken,
) {
    let progress = &context.progress;
    freight_info!(
        "Batch job started: {} rows from {} (shape={})",
        table.len(),
        request.source_name,
        request.shape
    );

    let mut rows = Vec::new();
    for (index, record) in table.records().iter().enumerate() {
        if token.is_cancelled() {
            freight_warn!("Batch job cancelled after {} rows", index);
            progress.dispatch(Msg::JobCancelled);
            return;
        }
        let outcome = quote_record(&context, index, record).await;
        if !outcome.is_success() {
            freight_warn!(
                "Row {}: {} ({})",
                index,
                outcome.status_label(),
                outcome.message().unwrap_or_default()
            );
        }
        rows.extend(assemble_rows(record, &outcome, request.shape));
        progress.dispatch(Msg::RowFinished);
    }

    if token.is_cancelled() {
        freight_warn!("Batch job cancelled after its last row; discarding output");
        progress.dispatch(Msg::JobCancelled);
        return;
    }

    match write_workbook(&rows) {
        Ok(bytes) => {
            let artifact = Artifact::new(result_filename(&request.source_name), bytes);
            freight_info!(
                "Batch job completed: {} output rows in {}",
                rows.len(),
                artifact.filename
            );
            progress.dispatch(Msg::JobCompleted { artifact });
        }
        Err(err) => {
            freight_error!("Cannot write batch result: {}", err);
            progress.dispatch(Msg::JobFailed {
                message: format!("failed to write result table: {err}"),
            });
        }
    }
}

async fn quote_record(context: &JobContext, index: usize, record: &Record) -> QuoteOutcome {
    let shipment = match ShipmentRow::from_record(record, &context.defaults) {
        Ok(shipment) => shipment,
        Err(err) => return QuoteOutcome::error(err.to_string()),
    };

    let attempt = AssertUnwindSafe(context.quoter.quote(index, &shipment, &context.throttle))
        .catch_unwind()
        .await;
    match attempt {
        Ok(outcome) => outcome,
        Err(_) => {
            freight_error!("Row {}: internal error while quoting", index);
            QuoteOutcome::error("internal error while quoting (see logs)")
        }
    }
}
