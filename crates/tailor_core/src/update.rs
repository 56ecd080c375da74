use crate::{
    order_by_urls, BatchId, BatchOutcome, BatchState, Effect, JobResult, Msg, OrchestrationError,
    PollerState, RemoteState, StatusReport,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not fit the current batch state (a late poll answer after
/// a terminal transition, a second `Start`, anything after the outcome is
/// settled) are ignored and produce no effects.
pub fn update(mut state: PollerState, msg: Msg) -> (PollerState, Vec<Effect>) {
    if state.is_finished() {
        return (state, Vec::new());
    }

    let batch_state = state.job.state();
    let effects = match msg {
        Msg::Start if batch_state == BatchState::Submitted => start(&mut state),
        Msg::StatusReceived(report) if batch_state == BatchState::Polling => {
            on_status(&mut state, report)
        }
        Msg::StatusRejected(message) if batch_state == BatchState::Polling => {
            fail_batch(&mut state, message)
        }
        Msg::TransportError(_) if batch_state == BatchState::Polling => {
            on_transport_error(&mut state)
        }
        Msg::RecoveryAdopted(id) if awaiting_recovery(&state) => adopt(&mut state, id),
        Msg::RecoveryFailed(reason) if awaiting_recovery(&state) => {
            report(&mut state, OrchestrationError::RecoveryFailed(reason))
        }
        Msg::ResultsLoaded(results) if awaiting_results(&state) => deliver(&mut state, results),
        Msg::ResultsFailed(message) if awaiting_results(&state) => {
            report(&mut state, OrchestrationError::ResultLoad(message))
        }
        Msg::Cancelled => {
            state.finish(BatchOutcome::Cancelled);
            Vec::new()
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn awaiting_recovery(state: &PollerState) -> bool {
    state.job.state() == BatchState::TimedOut && state.recovery_attempted
}

fn awaiting_results(state: &PollerState) -> bool {
    state.job.state() == BatchState::Completed && state.results_requested
}

fn enter(state: &mut PollerState, to: BatchState) -> bool {
    let entered = state.job.transition(to).is_ok();
    if entered {
        state.mark_dirty();
    }
    entered
}

fn start(state: &mut PollerState) -> Vec<Effect> {
    if !enter(state, BatchState::Polling) {
        return Vec::new();
    }
    state.restart_schedule();
    vec![Effect::Progress(state.view()), schedule_poll(state)]
}

fn schedule_poll(state: &PollerState) -> Effect {
    Effect::SchedulePoll {
        id: state.job.id().clone(),
        delay: state.interval,
    }
}

fn on_status(state: &mut PollerState, report: StatusReport) -> Vec<Effect> {
    state.job.apply_report(&report);
    state.mark_dirty();
    state.error_attempts = 0;
    if !matches!(report.state, RemoteState::Other(_)) {
        state.unknown_answers = 0;
    }

    match report.state {
        RemoteState::Completed => {
            if !enter(state, BatchState::Completed) {
                return Vec::new();
            }
            state.results_requested = true;
            vec![
                Effect::Progress(state.view()),
                Effect::LoadResults {
                    id: state.job.id().clone(),
                },
            ]
        }
        RemoteState::Failed => {
            let message = report
                .message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "the service reported the batch as failed".to_string());
            fail_batch(state, message)
        }
        RemoteState::Other(raw) => {
            state.unknown_answers = state.unknown_answers.saturating_add(1);
            if state.unknown_answers > state.settings.max_error_attempts {
                return fail_batch(
                    state,
                    format!("the service kept reporting an unrecognized state '{raw}'"),
                );
            }
            state.successes = state.successes.saturating_add(1);
            state.interval = state.settings.interval_for(state.successes);
            vec![Effect::Progress(state.view()), schedule_poll(state)]
        }
        RemoteState::Pending | RemoteState::Processing => {
            state.successes = state.successes.saturating_add(1);
            state.interval = state.settings.interval_for(state.successes);
            vec![Effect::Progress(state.view()), schedule_poll(state)]
        }
    }
}

fn fail_batch(state: &mut PollerState, message: String) -> Vec<Effect> {
    if !enter(state, BatchState::Failed) {
        return Vec::new();
    }
    let mut effects = vec![Effect::Progress(state.view())];
    effects.extend(report(state, OrchestrationError::BatchFailed(message)));
    effects
}

fn on_transport_error(state: &mut PollerState) -> Vec<Effect> {
    state.error_attempts = state.error_attempts.saturating_add(1);
    if state.error_attempts > state.settings.max_error_attempts {
        return time_out(state);
    }
    state.interval = state.settings.backoff(state.interval);
    vec![schedule_poll(state)]
}

fn time_out(state: &mut PollerState) -> Vec<Effect> {
    if !enter(state, BatchState::TimedOut) {
        return Vec::new();
    }
    let mut effects = vec![Effect::Progress(state.view())];
    if state.recovery_attempted {
        let attempts = state.error_attempts;
        effects.extend(report(
            state,
            OrchestrationError::PollingTimedOut { attempts },
        ));
    } else {
        state.recovery_attempted = true;
        effects.push(Effect::StartRecovery {
            grace: state.settings.recovery_grace,
        });
    }
    effects
}

fn adopt(state: &mut PollerState, id: BatchId) -> Vec<Effect> {
    if state.job.adopt(id).is_err() {
        return Vec::new();
    }
    state.mark_dirty();
    state.restart_schedule();
    vec![Effect::Progress(state.view()), schedule_poll(state)]
}

fn deliver(state: &mut PollerState, results: Vec<JobResult>) -> Vec<Effect> {
    let ordered = order_by_urls(results, state.urls.as_slice());
    let mut effects = Vec::with_capacity(2);
    if !state.accounted {
        state.accounted = true;
        effects.push(Effect::MarkAccounted {
            id: state.job.id().clone(),
        });
    }
    effects.push(Effect::Deliver(ordered.clone()));
    state.finish(BatchOutcome::Completed(ordered));
    effects
}

fn report(state: &mut PollerState, error: OrchestrationError) -> Vec<Effect> {
    state.finish(BatchOutcome::Failed(error.clone()));
    vec![Effect::Report(error)]
}
