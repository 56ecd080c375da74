//! Tailor engine: HTTP collaborators and effect execution for batch orchestration.
mod accounting;
mod aggregate;
mod api;
mod engine;
mod export;
mod filename;
mod persist;
mod poller;
mod recovery;
mod resolve;
mod settings;
mod sink;
mod submit;
mod types;
mod wire;

pub use accounting::{LogUsageRecorder, UsageLedger, UsageRecorder};
pub use aggregate::fetch_results;
pub use api::{BatchApi, ReqwestBatchApi, ResumeUploader};
pub use engine::{BatchHandle, BatchRequest, Orchestrator};
pub use export::{ExportClient, ExportError, ExportKind};
pub use filename::{export_filename, UniqueNames};
pub use persist::{
    ensure_output_dir, write_results, AtomicFileWriter, PersistError, SavedResults,
    MANIFEST_FILENAME,
};
pub use poller::PollLoop;
pub use recovery::{select_candidate, RecoveryScope};
pub use resolve::resolve_resume;
pub use settings::ServiceSettings;
pub use sink::{BatchEvent, BatchSink, CallbackSink, ChannelBatchSink};
pub use submit::submit_batch;
pub use types::{ApiError, BatchOptions, JobSummary};
