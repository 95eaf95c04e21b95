//! Graph backend adapter for the equipment knowledge graph.
//!
//! The engine never talks to a database directly. It hands a
//! [`PatternQuery`] and its [`Params`] to a [`GraphBackend`] and receives an
//! ordered sequence of [`Record`]s back.
//!
//! # Components
//!
//! - [`GraphBackend`] - the narrow adapter contract
//! - [`SurrealBackend`] - SurrealDB (embedded RocksDB, in-memory or remote)
//! - [`MemoryBackend`] - evaluates patterns against a loaded [`GraphSnapshot`]
//! - [`BackendPool`] - bounded, scoped session acquisition shared by queries
//!
//! # Schema
//!
//! - **Nodes**: Product, ErrorCode, CableSpec, Installer
//! - **Edges**: COMPATIBLE_WITH, HAS_ERROR, CERTIFIED_FOR
//!
//! The graph is read-only from this crate's point of view.

mod error;
mod memory;
pub mod models;
mod pattern;
mod pool;
mod record;
mod surreal;

pub use error::BackendError;
pub use memory::{GraphSnapshot, MemoryBackend};
pub use pattern::{fold, param, slug, PatternQuery, QueryKind};
pub use pool::{BackendPool, Session};
pub use record::{Params, Record};
pub use surreal::SurrealBackend;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

/// Whether a backend returns rows in the order the pattern asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOrder {
    /// Row order is authoritative.
    Preserved,
    /// Row order is unspecified; callers must sort.
    Unspecified,
}

/// Node and relationship counts per label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: BTreeMap<String, usize>,
    pub relationships: BTreeMap<String, usize>,
}

impl GraphStats {
    pub fn total_nodes(&self) -> usize {
        self.nodes.values().sum()
    }

    pub fn total_relationships(&self) -> usize {
        self.relationships.values().sum()
    }
}

/// Read-only access to a property graph.
///
/// Implementations must be safe to call from many in-flight queries at once.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Execute a pattern query with bound parameters.
    async fn execute(
        &self,
        query: &PatternQuery,
        params: &Params,
    ) -> Result<Vec<Record>, BackendError>;

    /// Round-trip a trivial query to verify connectivity.
    async fn ping(&self) -> Result<(), BackendError>;

    /// Count nodes and relationships per label.
    async fn stats(&self) -> Result<GraphStats, BackendError>;

    /// Ordering guarantee of [`GraphBackend::execute`].
    fn result_order(&self) -> ResultOrder {
        ResultOrder::Preserved
    }
}
