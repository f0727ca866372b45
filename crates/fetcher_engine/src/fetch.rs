use std::path::Path;

use futures_util::StreamExt;

use fetcher_logging::{fetcher_debug, fetcher_info, fetcher_warn};

use crate::filename::FilenameResolver;
use crate::ledger::HashLedger;
use crate::persist::{ensure_storage_dir, AtomicFileWriter, PersistError};
use crate::transport::Transport;
use crate::validate::validate_response;
use crate::{
    FailureKind, FetchError, FetchOutcome, FetchRequest, FetchSettings, RejectReason, SavedImage,
    SkipReason,
};

/// Drives single URLs through fetch, validation, dedupe and persistence.
///
/// Owns the hash ledger for the storage directory; `fetch` takes `&mut self`
/// so ledger checks and appends are never interleaved.
pub struct ImageFetcher {
    transport: Box<dyn Transport>,
    ledger: HashLedger,
    resolver: FilenameResolver,
    writer: AtomicFileWriter,
    max_bytes: u64,
}

impl ImageFetcher {
    /// Creates the storage directory if needed and loads its ledger.
    pub fn open(
        settings: &FetchSettings,
        transport: Box<dyn Transport>,
    ) -> Result<Self, PersistError> {
        let dir = settings.storage_dir.clone();
        ensure_storage_dir(&dir)?;
        Ok(Self {
            transport,
            ledger: HashLedger::load_in(&dir),
            resolver: FilenameResolver::new(dir.clone()),
            writer: AtomicFileWriter::new(dir),
            max_bytes: settings.max_bytes,
        })
    }

    pub fn with_resolver(mut self, resolver: FilenameResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn ledger(&self) -> &HashLedger {
        &self.ledger
    }

    pub fn storage_dir(&self) -> &Path {
        self.writer.dir()
    }

    /// Runs one request to completion. Never fails past this boundary: every
    /// error becomes a `FetchOutcome::Failure`.
    pub async fn fetch(&mut self, request: &FetchRequest) -> FetchOutcome {
        let url = request.url.trim();
        match self.run_pipeline(url).await {
            Ok(outcome) => outcome,
            Err(err) => {
                fetcher_warn!("Fetch of {} failed: {}", url, err);
                FetchOutcome::Failure(err)
            }
        }
    }

    async fn run_pipeline(&mut self, url: &str) -> Result<FetchOutcome, FetchError> {
        if url.is_empty() {
            return Err(FetchError::new(FailureKind::InvalidUrl, "empty url"));
        }
        url::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        fetcher_debug!("Connecting to {}", url);
        let response = self.transport.get(url).await?;
        let metadata = response.metadata;

        validate_response(&metadata, self.max_bytes).map_err(rejection_error)?;
        fetcher_debug!(
            "Headers accepted for {} (type {:?}, declared {:?})",
            metadata.final_url,
            metadata.content_type,
            metadata.declared_length
        );

        let mut body = response.body;
        let mut bytes = Vec::with_capacity(initial_capacity(metadata.declared_length));
        let mut digest = md5::Context::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            let received = bytes.len() as u64 + chunk.len() as u64;
            if received > self.max_bytes {
                return Err(FetchError::new(
                    FailureKind::SizeLimitExceeded {
                        max_bytes: self.max_bytes,
                        actual: Some(received),
                    },
                    "response body exceeded the size limit",
                ));
            }
            digest.consume(&chunk);
            bytes.extend_from_slice(&chunk);
        }
        let content_hash = format!("{:x}", digest.compute());

        if self.ledger.contains(&content_hash) {
            fetcher_info!("Duplicate image from {} ({})", url, content_hash);
            return Ok(FetchOutcome::Skipped(SkipReason::Duplicate { content_hash }));
        }

        let (filename, _) = self
            .resolver
            .resolve(url, metadata.content_type.as_deref())
            .map_err(|err| FetchError::new(FailureKind::Io, err.to_string()))?;
        let path = self
            .writer
            .write_new(&filename, &bytes)
            .map_err(|err| FetchError::new(FailureKind::Io, err.to_string()))?;

        // Only record the hash once the file is fully in place.
        self.ledger.append(&content_hash).map_err(|err| {
            FetchError::new(
                FailureKind::Io,
                format!("saved {} but {}", path.display(), err),
            )
        })?;

        let size_bytes = bytes.len() as u64;
        fetcher_info!("Saved {} ({} bytes) to {:?}", filename, size_bytes, path);
        Ok(FetchOutcome::Success(SavedImage {
            filename,
            path,
            size_bytes,
            content_hash,
        }))
    }
}

fn rejection_error(reason: RejectReason) -> FetchError {
    let message = reason.to_string();
    let kind = match reason {
        RejectReason::DeclaredTooLarge {
            declared,
            max_bytes,
        } => FailureKind::SizeLimitExceeded {
            max_bytes,
            actual: Some(declared),
        },
        reason => FailureKind::Validation { reason },
    };
    FetchError::new(kind, message)
}

/// Declared length is untrusted; never reserve more than 1 MiB up front.
fn initial_capacity(declared_length: Option<u64>) -> usize {
    const MAX_PREALLOC: u64 = 1024 * 1024;
    declared_length.unwrap_or(0).min(MAX_PREALLOC) as usize
}
