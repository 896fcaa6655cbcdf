//! Runs judge calls for many columns with bounded concurrency.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::plan::{JudgePlan, JudgeVerdict, parse_batched_reply, parse_reply};
use super::provider::{ColumnBrief, Judge, JudgeRequest};
use crate::error::{JudgeError, Result, StewardError};

/// Sends column briefs to a [`Judge`] and validates the replies.
///
/// Each column is judged independently: a failure, timeout or invalid reply
/// becomes [`JudgeVerdict::NoPlan`] for that column only. Cancellation
/// aborts everything in flight and discards partial results.
#[derive(Clone)]
pub struct JudgeAdapter {
    judge: Arc<dyn Judge>,
}

impl JudgeAdapter {
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self { judge }
    }

    pub fn judge(&self) -> &Arc<dyn Judge> {
        &self.judge
    }

    /// Verdicts for every brief with at least one candidate, in brief order.
    pub async fn judge_columns(
        &self,
        briefs: Vec<ColumnBrief>,
        cancel: &CancellationToken,
    ) -> Result<IndexMap<String, JudgeVerdict>> {
        let briefs: Vec<ColumnBrief> = briefs
            .into_iter()
            .filter(|b| !b.candidates.is_empty())
            .collect();
        if briefs.is_empty() {
            return Ok(IndexMap::new());
        }
        if cancel.is_cancelled() {
            return Err(StewardError::Cancelled);
        }

        let config = self.judge.config();
        tracing::debug!(
            judge = self.judge.name(),
            columns = briefs.len(),
            batch = config.batch,
            max_in_flight = config.max_in_flight,
            "requesting judge verdicts"
        );

        let verdicts = if config.batch {
            self.judge_batch(briefs, cancel).await?
        } else {
            self.judge_each(briefs, cancel).await?
        };

        let accepted = verdicts
            .values()
            .filter(|v| matches!(v, JudgeVerdict::Accepted { .. }))
            .count();
        tracing::debug!(accepted, no_plan = verdicts.len() - accepted, "judge verdicts ready");
        Ok(verdicts)
    }

    async fn judge_each(
        &self,
        briefs: Vec<ColumnBrief>,
        cancel: &CancellationToken,
    ) -> Result<IndexMap<String, JudgeVerdict>> {
        let config = self.judge.config();
        let timeout = config.timeout();
        let semaphore = Arc::new(Semaphore::new(config.max_in_flight.max(1)));

        let mut verdicts: IndexMap<String, JudgeVerdict> = briefs
            .iter()
            .map(|b| {
                let pending = JudgeVerdict::NoPlan {
                    reason: "judge task did not complete".to_string(),
                };
                (b.column.clone(), pending)
            })
            .collect();

        let mut tasks = JoinSet::new();
        for brief in briefs {
            let judge = Arc::clone(&self.judge);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let verdict = request_verdict(judge.as_ref(), &brief, timeout).await;
                (brief.column, verdict)
            });
        }

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    tracing::debug!("judge calls cancelled");
                    return Err(StewardError::Cancelled);
                }
                next = tasks.join_next() => match next {
                    Some(Ok((column, verdict))) => {
                        verdicts.insert(column, verdict);
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "judge task failed");
                    }
                    None => break,
                },
            }
        }
        Ok(verdicts)
    }

    async fn judge_batch(
        &self,
        briefs: Vec<ColumnBrief>,
        cancel: &CancellationToken,
    ) -> Result<IndexMap<String, JudgeVerdict>> {
        let timeout = self.judge.config().timeout();
        let request = JudgeRequest::batch(briefs);

        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StewardError::Cancelled),
            reply = tokio::time::timeout(timeout, self.judge.propose(&request)) => reply,
        };
        let reply = flatten_timeout(reply, timeout);

        let results: IndexMap<String, std::result::Result<JudgePlan, JudgeError>> = match reply {
            Ok(text) => parse_batched_reply(&text, &request.columns),
            Err(e) => request
                .columns
                .iter()
                .map(|b| (b.column.clone(), Err(e.clone())))
                .collect(),
        };

        Ok(results
            .into_iter()
            .map(|(column, result)| {
                let verdict = into_verdict(&column, self.judge.name(), result);
                (column, verdict)
            })
            .collect())
    }
}

async fn request_verdict(judge: &dyn Judge, brief: &ColumnBrief, timeout: Duration) -> JudgeVerdict {
    let request = JudgeRequest::single(brief.clone());
    let reply = flatten_timeout(
        tokio::time::timeout(timeout, judge.propose(&request)).await,
        timeout,
    );
    let plan = reply.and_then(|text| parse_reply(&text, &brief.proposed_actions()));
    into_verdict(&brief.column, judge.name(), plan)
}

fn flatten_timeout(
    reply: std::result::Result<std::result::Result<String, JudgeError>, tokio::time::error::Elapsed>,
    timeout: Duration,
) -> std::result::Result<String, JudgeError> {
    reply.unwrap_or(Err(JudgeError::Timeout(timeout)))
}

fn into_verdict(
    column: &str,
    judge: &str,
    plan: std::result::Result<JudgePlan, JudgeError>,
) -> JudgeVerdict {
    match plan.and_then(JudgeVerdict::from_plan) {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::warn!(column, judge, error = %e, "no usable judge plan");
            JudgeVerdict::no_plan(&e)
        }
    }
}
