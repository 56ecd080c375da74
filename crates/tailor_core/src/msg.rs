#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The batch was submitted; begin polling.
    Start,
    /// A status poll returned an application-level answer.
    StatusReceived(crate::StatusReport),
    /// The service rejected the status query (not a transport failure).
    StatusRejected(String),
    /// A status poll failed at the network level.
    TransportError(String),
    /// Recovery found a finished job on the server.
    RecoveryAdopted(crate::BatchId),
    /// Recovery found nothing to adopt, or the listing call failed.
    RecoveryFailed(String),
    /// The result set was fetched and normalized.
    ResultsLoaded(Vec<crate::JobResult>),
    /// Fetching the result set failed.
    ResultsFailed(String),
    /// The owner cancelled the batch; pending responses are discarded.
    Cancelled,
}
