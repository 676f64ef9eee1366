use crate::builder::EventBuilder;
use crate::compression::{compress, CompressionConfig, CompressionError};
use crate::geometry::DetectorGeometry;
use crate::kinematics::Medium;
use crate::record::{ReadError, RecordReader};
use crate::store::EventStore;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot open {}: {source}", path.display())]
    FileUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed input: {0}")]
    Malformed(#[source] ReadError),
    #[error(transparent)]
    Io(ReadError),
    #[error(transparent)]
    Compression(#[from] CompressionError),
}

/// Everything the ingestion pass needs to know
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IngestConfig {
    pub geometry: DetectorGeometry,
    pub medium: Medium,
    pub compression: CompressionConfig,
    /// Treat malformed records as a hard error instead of end of input
    pub strict: bool,
}

/// Why reading stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    /// Lenient mode only: malformed input ended the pass early
    Malformed { line: usize, message: String },
}

/// Summary of one ingestion pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub events_read: usize,
    pub stop: StopReason,
    /// Records of a trailing event that never saw `NEXTEVENT`
    pub discarded_records: usize,
    pub skipped_tokens: usize,
    /// Event count after time compression, when it ran
    pub compressed_buckets: Option<usize>,
}

/// Ingest a whole stream into an [`EventStore`]
pub fn load_events<R: BufRead>(
    input: R,
    config: &IngestConfig,
) -> Result<(EventStore, IngestReport), IngestError> {
    let mut reader = RecordReader::new(input);
    let mut builder = EventBuilder::new(config.geometry, config.medium);
    let mut store = EventStore::new();

    let no_more = loop {
        match builder.next_event(&mut reader) {
            Ok(event) => store.append(event),
            Err(no_more) => break no_more,
        }
    };

    let stop = match no_more.cause {
        ReadError::EndOfStream => StopReason::EndOfStream,
        err @ ReadError::Io(_) => return Err(IngestError::Io(err)),
        err if config.strict => return Err(IngestError::Malformed(err)),
        err => {
            log::warn!("stopping at malformed input after {} events: {err}", store.count());
            StopReason::Malformed {
                line: err.line().unwrap_or(0),
                message: err.to_string(),
            }
        }
    };

    let events_read = store.count();
    let mut compressed_buckets = None;
    if config.compression.enabled {
        let buckets = compress(store.events(), config.compression.bucket_width)?;
        compressed_buckets = Some(buckets.len());
        store.replace(buckets);
    }
    store.apply_default_display();

    log::info!("loaded {events_read} events");
    Ok((
        store,
        IngestReport {
            events_read,
            stop,
            discarded_records: no_more.discarded_records,
            skipped_tokens: reader.skipped_tokens(),
            compressed_buckets,
        },
    ))
}

/// Ingest from an in-memory string
pub fn load_from_source(
    source: &str,
    config: &IngestConfig,
) -> Result<(EventStore, IngestReport), IngestError> {
    load_events(source.as_bytes(), config)
}

/// Open and ingest a file
pub fn load_file(
    path: impl AsRef<Path>,
    config: &IngestConfig,
) -> Result<(EventStore, IngestReport), IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::FileUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    load_events(BufReader::new(file), config)
}
