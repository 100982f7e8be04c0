use crate::domain::model::{
    RequestConfig, RequestOutcome, RunSummary, TargetDate, TransportFailure,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::io::Write;
use url::Url;

/// Sends the update request for one date.
///
/// The response body is streamed into `body`; the returned value is the HTTP
/// status code. Anything that stops a complete response from arriving is a
/// [`TransportFailure`], never an error that ends the run.
#[async_trait]
pub trait UpdateClient: Send + Sync {
    async fn post_update(
        &self,
        url: &Url,
        body: &mut (dyn Write + Send),
    ) -> std::result::Result<u16, TransportFailure>;
}

/// Operator-facing output of a run.
pub trait Reporter: Send {
    fn run_started(&mut self, config: &RequestConfig, dates: &[TargetDate]) -> Result<()>;

    fn request_started(&mut self, position: usize, total: usize, url: &Url) -> Result<()>;

    fn outcome(&mut self, outcome: &RequestOutcome) -> Result<()>;

    /// Called for every outcome that is not 200 or 202.
    fn warning(&mut self, outcome: &RequestOutcome) -> Result<()>;

    fn run_finished(&mut self, summary: &RunSummary) -> Result<()>;
}
