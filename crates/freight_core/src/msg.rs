use crate::{Artifact, OutputShape};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A new job took over the progress record.
    JobStarted { shape: OutputShape },
    /// The input table was read; `total` rows will be quoted.
    TableLoaded { total: usize },
    /// One input row was quoted (whatever the outcome).
    RowFinished,
    /// Someone asked the running job to stop.
    CancelRequested,
    /// The job finished every row and produced its artifact.
    JobCompleted { artifact: Artifact },
    /// The job observed the cancellation request and stopped.
    JobCancelled,
    /// The job could not run at all.
    JobFailed { message: String },
}
