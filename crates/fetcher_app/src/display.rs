//! Console and JSON rendering of batch outcomes.

use anyhow::Result;
use fetcher_engine::{BatchEvent, BatchSink, BatchSummary, FetchOutcome, SkipReason};

/// Prints per-request progress as the batch runs.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl BatchSink for ConsoleSink {
    fn emit(&mut self, event: BatchEvent) {
        match event {
            BatchEvent::Started { index, total, url } => {
                println!("--- Processing {}/{} ---", index + 1, total);
                println!("Connecting to: {url}");
            }
            BatchEvent::Finished { outcome, .. } => println!("{}", describe(&outcome)),
            BatchEvent::Pausing { delay } => println!("Pausing {:.1}s...", delay.as_secs_f64()),
        }
    }
}

/// One-line, human-readable description of an outcome.
pub fn describe(outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Success(saved) => format!(
            "Saved {} to {} ({:.2} MB)",
            saved.filename,
            saved.path.display(),
            saved.size_bytes as f64 / (1024.0 * 1024.0)
        ),
        FetchOutcome::Skipped(SkipReason::Duplicate { content_hash }) => {
            format!("Skipped: image already saved (hash {content_hash})")
        }
        FetchOutcome::Failure(err) => format!("Failed: {err}"),
    }
}

pub fn print_report(outcomes: &[FetchOutcome], json: bool) -> Result<()> {
    let summary = BatchSummary::from_outcomes(outcomes);
    if json {
        for outcome in outcomes {
            println!("{}", serde_json::to_string(outcome)?);
        }
        println!("{}", serde_json::json!({ "summary": summary }));
        return Ok(());
    }

    println!();
    println!("Session summary:");
    println!("  Saved:      {}", summary.saved);
    println!("  Duplicates: {}", summary.duplicates);
    println!("  Failed:     {}", summary.failed);
    println!("  Total:      {}", summary.total);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetcher_engine::{FailureKind, FetchError, RejectReason, SavedImage};
    use std::path::PathBuf;

    #[test]
    fn describes_each_outcome() {
        let saved = FetchOutcome::Success(SavedImage {
            filename: "cat.png".to_string(),
            path: PathBuf::from("Fetched_Images/cat.png"),
            size_bytes: 2 * 1024 * 1024,
            content_hash: "0".repeat(32),
        });
        assert_eq!(
            describe(&saved),
            "Saved cat.png to Fetched_Images/cat.png (2.00 MB)"
        );

        let failed = FetchOutcome::Failure(FetchError::new(
            FailureKind::Validation {
                reason: RejectReason::HttpStatus { status: 404 },
            },
            "http status 404",
        ));
        assert_eq!(
            describe(&failed),
            "Failed: validation error (http status 404): http status 404"
        );
    }

    #[test]
    fn outcome_json_is_tagged() {
        let skipped = FetchOutcome::Skipped(SkipReason::Duplicate {
            content_hash: "abc".to_string(),
        });
        let value = serde_json::to_value(&skipped).unwrap();
        assert_eq!(value["outcome"], "skipped");
        assert_eq!(value["reason"], "duplicate");
        assert_eq!(value["content_hash"], "abc");

        let failed = FetchOutcome::Failure(FetchError::new(
            FailureKind::SizeLimitExceeded {
                max_bytes: 10,
                actual: Some(11),
            },
            "too big",
        ));
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["outcome"], "failure");
        assert_eq!(value["kind"]["kind"], "size_limit_exceeded");
        assert_eq!(value["message"], "too big");
    }
}
