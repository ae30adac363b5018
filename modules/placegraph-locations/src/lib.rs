pub mod binder;
pub mod error;
pub mod ingest;
pub mod normalize;
pub mod selector;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod upsert;

pub use binder::UserLocationBinder;
pub use error::{IngestError, IngestStage};
pub use ingest::{IngestOutcome, LocationIngestor, ResolvedLocation};
pub use normalize::ResolvedCandidate;
pub use traits::{Geocoder, LocationStore};
pub use upsert::LocationUpsertService;
