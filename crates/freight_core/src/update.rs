use crate::{JobPhase, Msg, ProgressState};

/// Pure update function: applies a message to the progress record.
///
/// Messages that only make sense for a running job are ignored otherwise, so a
/// late message from a superseded job cannot rewrite a finished record.
pub fn update(mut state: ProgressState, msg: Msg) -> ProgressState {
    if let Msg::JobStarted { shape } = msg {
        state.restart(shape);
        return state;
    }
    if state.phase() != JobPhase::Running {
        return state;
    }

    match msg {
        Msg::JobStarted { .. } => {}
        Msg::TableLoaded { total } => state.set_total(total),
        Msg::RowFinished => state.advance(),
        Msg::CancelRequested => state.request_cancel(),
        Msg::JobCompleted { artifact } => state.finish(JobPhase::Completed, Some(artifact), None),
        Msg::JobCancelled => state.finish(JobPhase::Cancelled, None, None),
        Msg::JobFailed { message } => state.finish(JobPhase::Failed, None, Some(message)),
    }
    state
}
