//! Image fetch engine: fetch, validate, dedupe and persist, one URL at a time.
mod batch;
mod fetch;
mod filename;
mod ledger;
mod persist;
mod settings;
mod transport;
mod types;
mod validate;

pub use batch::{BatchEvent, BatchRunner, BatchSink, BatchSummary, NullSink};
pub use fetch::ImageFetcher;
pub use filename::{
    extension_for_content_type, filename_from_url, sanitize_filename, Clock, FilenameResolver,
};
pub use ledger::{HashLedger, LedgerError, LEDGER_FILENAME};
pub use persist::{ensure_storage_dir, AtomicFileWriter, PersistError};
pub use settings::{FetchSettings, DEFAULT_STORAGE_DIR, DEFAULT_USER_AGENT};
pub use transport::{BodyStream, ReqwestTransport, Transport, TransportResponse};
pub use types::{
    FailureKind, FetchError, FetchOutcome, FetchRequest, RejectReason, ResponseMetadata,
    SavedImage, SkipReason,
};
pub use validate::{validate_response, MAX_IMAGE_BYTES};
