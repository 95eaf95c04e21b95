pub mod config;
pub mod engine;
pub mod graph;
pub mod query;

pub use config::{BackendKind, Config, ConfigError};
pub use engine::{DiagnosticResult, Engine, EngineError, FailureKind, Payload};
pub use graph::{BackendError, GraphBackend, GraphStats, MemoryBackend, SurrealBackend};
pub use query::{Intent, IntentKind, QueryInput, StructuredQuery};
