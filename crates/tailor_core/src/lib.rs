//! Tailor core: request validation, batch model and the pure polling state machine.
mod batch;
mod effect;
mod error;
mod msg;
mod request;
mod result;
mod schedule;
mod state;
mod update;
mod view_model;

pub use batch::{BatchId, BatchJob, BatchState, InvalidTransition, RemoteState, StatusReport};
pub use effect::Effect;
pub use error::OrchestrationError;
pub use msg::Msg;
pub use request::{
    parse_job_urls, validate_request, JobUrlList, ResumeFile, ResumeSource, ValidatedRequest,
    ValidationError, MAX_JOB_URLS,
};
pub use result::{order_by_urls, JobResult, JobStatus};
pub use schedule::PollSettings;
pub use state::{BatchOutcome, PollerState};
pub use update::update;
pub use view_model::BatchView;
