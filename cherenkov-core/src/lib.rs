pub mod builder;
pub mod compression;
pub mod diagnostics;
pub mod event;
pub mod geometry;
pub mod ingest;
pub mod kinematics;
pub mod record;
pub mod store;

pub use builder::{BuilderState, EventBuilder, NoMoreEvents};
pub use compression::{compress, CompressionConfig, CompressionError, DEFAULT_BUCKET_WIDTH};
pub use diagnostics::{format_ingest_error, format_read_error};
pub use event::{Event, Hit, Particle};
pub use geometry::{DetectorGeometry, DetectorLayer, GeometryPreset};
pub use ingest::{
    load_events, load_file, load_from_source, IngestConfig, IngestError, IngestReport, StopReason,
};
pub use kinematics::{Kinematics, KinematicsError, Medium, ParticleKind};
pub use record::{ReadError, Record, RecordReader};
pub use store::{EventStore, StoreError};

// Test helpers module (public for integration tests)
// Always compiled - integration tests are separate crates and need access
pub mod tests;
