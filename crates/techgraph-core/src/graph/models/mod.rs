//! Entity schema for the equipment graph.

mod entity;
mod relation;

pub use entity::{CableSpec, ErrorCode, Installer, Product, ProductCategory, Severity};
pub use relation::{CertificationEdge, CompatibilityEdge, ErrorAffinityEdge, Label, Relation};
