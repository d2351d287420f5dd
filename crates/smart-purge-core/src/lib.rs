pub mod config;
pub mod document;
pub mod error;
pub mod executor;
pub mod model;
pub mod naming;
pub mod oracle;
pub mod preview;
pub mod progress;
pub mod protection;
pub mod registry;
pub mod scan;
pub mod storage;

pub use config::PurgeConfig;
pub use document::memory::MemoryDocument;
pub use document::{Document, DocumentError, DocumentStore, Element};
pub use error::Error;
pub use executor::{PurgeExecutor, PurgeReport, Selection};
pub use model::{ElementId, EntityHandle, EntityKind, EntityMetadata, PurgeOutcome, ScanItem};
pub use progress::{ProgressReporter, SilentReporter};
pub use protection::ProtectionPolicy;
pub use registry::{Category, Group};
pub use scan::{ScanCoordinator, ScanSummary};
pub use storage::SqliteDocument;
