use std::time::Duration;

use fetcher_logging::{fetcher_debug, fetcher_info};
use serde::Serialize;

use crate::fetch::ImageFetcher;
use crate::{FetchOutcome, FetchRequest};

/// Progress notifications from a running batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Started {
        index: usize,
        total: usize,
        url: String,
    },
    Finished {
        index: usize,
        outcome: FetchOutcome,
    },
    Pausing {
        delay: Duration,
    },
}

pub trait BatchSink {
    fn emit(&mut self, event: BatchEvent);
}

/// Sink that drops every event.
pub struct NullSink;

impl BatchSink for NullSink {
    fn emit(&mut self, _event: BatchEvent) {}
}

impl<F: FnMut(BatchEvent)> BatchSink for F {
    fn emit(&mut self, event: BatchEvent) {
        self(event)
    }
}

/// Feeds requests through an `ImageFetcher` one at a time, pausing between
/// consecutive requests.
pub struct BatchRunner<'a> {
    fetcher: &'a mut ImageFetcher,
    delay: Duration,
}

impl<'a> BatchRunner<'a> {
    pub fn new(fetcher: &'a mut ImageFetcher, delay: Duration) -> Self {
        Self { fetcher, delay }
    }

    /// One outcome per request, in request order.
    pub async fn run(&mut self, requests: &[FetchRequest]) -> Vec<FetchOutcome> {
        self.run_with_sink(requests, &mut NullSink).await
    }

    pub async fn run_with_sink(
        &mut self,
        requests: &[FetchRequest],
        sink: &mut dyn BatchSink,
    ) -> Vec<FetchOutcome> {
        let total = requests.len();
        fetcher_info!("Starting batch of {} urls", total);

        let mut outcomes = Vec::with_capacity(total);
        for (index, request) in requests.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                fetcher_debug!("Pausing {:?} before next request", self.delay);
                sink.emit(BatchEvent::Pausing { delay: self.delay });
                tokio::time::sleep(self.delay).await;
            }

            sink.emit(BatchEvent::Started {
                index,
                total,
                url: request.url.clone(),
            });
            let outcome = self.fetcher.fetch(request).await;
            sink.emit(BatchEvent::Finished {
                index,
                outcome: outcome.clone(),
            });
            outcomes.push(outcome);
        }

        let summary = BatchSummary::from_outcomes(&outcomes);
        fetcher_info!(
            "Batch finished: {} saved, {} duplicates, {} failed",
            summary.saved,
            summary.duplicates,
            summary.failed
        );
        outcomes
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub saved: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[FetchOutcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut summary, outcome| {
                summary.total += 1;
                match outcome {
                    FetchOutcome::Success(_) => summary.saved += 1,
                    FetchOutcome::Skipped(_) => summary.duplicates += 1,
                    FetchOutcome::Failure(_) => summary.failed += 1,
                }
                summary
            })
    }

    /// Requests that left the image on disk, whether new or already held.
    pub fn successful(&self) -> usize {
        self.saved + self.duplicates
    }
}
