use async_trait::async_trait;

/// Outcome of querying one identifier against the queue service.
///
/// `Failure` is a value, not an error: the dispatcher treats a misbehaving
/// service as one of three expected outcomes and never inspects error chains
/// to tell "not in the queue" apart from "the request blew up".
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    Found { position: u64, total: u64 },
    NotFound,
    Failure(String),
}

/// Port for the external queue-position service, one identifier per call.
///
/// Retry and timeout policy belong to implementations, not to callers.
#[async_trait]
pub trait LookupClient: Send + Sync {
    async fn lookup(&self, identifier: &str) -> Lookup;
}
