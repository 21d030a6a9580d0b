//! Curator engine: HTTP client, job pollers and effect execution.
mod api;
mod engine;
mod kv;
mod persist;
mod poller;
mod tasks;
mod ticker;
mod types;

pub use api::{fetch_report, ClientSettings, LibraryApi, ReqwestLibraryApi};
pub use engine::{EngineCommand, EngineHandle, EngineSettings};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use poller::{PollHandle, PollObserver, PollSettings, Poller};
pub use ticker::Tickers;
pub use types::{ApiError, EngineError, EngineEvent, FailureKind};
