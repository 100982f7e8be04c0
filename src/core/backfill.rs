use crate::core::scratch::ScratchBuffer;
use crate::domain::model::{OutcomeStatus, RequestConfig, RequestOutcome, RunSummary, TargetDate};
use crate::domain::ports::{Reporter, UpdateClient};
use crate::utils::error::{BackfillError, Result};
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;
use url::Url;

/// Posts one update request per date, strictly in order, one at a time.
pub struct BackfillDriver<C: UpdateClient> {
    client: C,
    config: RequestConfig,
    scratch_dir: Option<PathBuf>,
}

impl<C: UpdateClient> BackfillDriver<C> {
    pub fn new(client: C, config: RequestConfig) -> Self {
        Self {
            client,
            config,
            scratch_dir: None,
        }
    }

    /// Put the scratch file somewhere other than the system temp dir.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// URLs a run over `dates` would post to, in order.
    pub fn plan(&self, dates: &[TargetDate]) -> Vec<Url> {
        dates.iter().map(|d| self.config.update_url(d)).collect()
    }

    pub async fn run<R: Reporter>(
        &self,
        dates: &[TargetDate],
        reporter: &mut R,
    ) -> Result<RunSummary> {
        self.run_until(dates, reporter, std::future::pending()).await
    }

    /// Runs until every date has an outcome or `shutdown` resolves.
    ///
    /// Per-date problems (non-2xx/202 statuses, transport failures) are
    /// reported and skipped over. Only a scratch buffer failure, a reporter
    /// failure or `shutdown` end the run early, and the scratch file is gone
    /// by the time this returns in every case.
    pub async fn run_until<R, F>(
        &self,
        dates: &[TargetDate],
        reporter: &mut R,
        shutdown: F,
    ) -> Result<RunSummary>
    where
        R: Reporter,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let total = dates.len();
        tracing::info!(
            "🚀 Starting backfill of {} dates against {}",
            total,
            self.config.base_url
        );
        reporter.run_started(&self.config, dates)?;

        let mut scratch = match &self.scratch_dir {
            Some(dir) => ScratchBuffer::create_in(dir)?,
            None => ScratchBuffer::create()?,
        };

        let mut summary = RunSummary::default();

        for (index, date) in dates.iter().enumerate() {
            let url = self.config.update_url(date);
            reporter.request_started(index + 1, total, &url)?;

            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::warn!("🛑 Interrupted while waiting on target_date={}", date);
                    return Err(BackfillError::Interrupted { completed: summary.total(), total });
                }
                outcome = self.dispatch(*date, url, &mut scratch) => outcome?,
            };

            tracing::debug!(
                target_date = %outcome.date,
                status = ?outcome.status.code(),
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "Request finished"
            );

            reporter.outcome(&outcome)?;
            if !outcome.is_accepted() {
                reporter.warning(&outcome)?;
            }
            summary.outcomes.push(outcome);

            // 最後一筆之後不用等
            if index + 1 < total && !self.config.delay.is_zero() {
                tracing::debug!("Sleeping {:?} before next date", self.config.delay);
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        tracing::warn!("🛑 Interrupted during inter-request delay");
                        return Err(BackfillError::Interrupted { completed: summary.total(), total });
                    }
                    _ = tokio::time::sleep(self.config.delay) => {}
                }
            }
        }

        scratch.close()?;

        tracing::info!(
            "✅ Backfill finished: {} accepted, {} warnings",
            summary.accepted(),
            summary.warnings()
        );
        reporter.run_finished(&summary)?;

        Ok(summary)
    }

    async fn dispatch(
        &self,
        date: TargetDate,
        url: Url,
        scratch: &mut ScratchBuffer,
    ) -> Result<RequestOutcome> {
        scratch.reset()?;

        let started = Instant::now();
        let status = match self.client.post_update(&url, &mut *scratch).await {
            Ok(code) => OutcomeStatus::Http { code },
            Err(failure) => OutcomeStatus::TransportFailure(failure),
        };
        let elapsed = started.elapsed();

        // 傳輸失敗時也把已收到的部分 body 帶出
        let body = scratch.contents()?;

        Ok(RequestOutcome {
            date,
            url: url.to_string(),
            status,
            body,
            elapsed,
        })
    }
}
