//! In-memory graph backend over a YAML snapshot.
//!
//! Evaluates each [`QueryKind`] directly against the snapshot, producing the
//! same record shapes (and the same ordering) as the SurrealQL templates.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::BackendError;
use super::models::{
    CableSpec, CertificationEdge, CompatibilityEdge, ErrorAffinityEdge, ErrorCode, Installer,
    Label, Product, Relation,
};
use super::pattern::{param, slug, PatternQuery, QueryKind};
use super::record::{Params, Record};
use super::{GraphBackend, GraphStats};

/// A read-only copy of the graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSnapshot {
    pub products: Vec<Product>,
    pub error_codes: Vec<ErrorCode>,
    pub cable_specs: Vec<CableSpec>,
    pub installers: Vec<Installer>,
    pub compatibility: Vec<CompatibilityEdge>,
    pub error_affinity: Vec<ErrorAffinityEdge>,
    pub certifications: Vec<CertificationEdge>,
}

impl GraphSnapshot {
    /// Parse a snapshot from YAML and validate it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, String> {
        let snapshot: GraphSnapshot = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Load a snapshot file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, BackendError> {
        let snapshot_error = |message: String| BackendError::Snapshot {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| snapshot_error(e.to_string()))?;
        Self::from_yaml_str(&content).map_err(snapshot_error)
    }

    /// Product SKUs, error codes and installer ids must be unique, and every
    /// edge must connect nodes present in the snapshot.
    pub fn validate(&self) -> Result<(), String> {
        let mut skus = HashSet::new();
        for product in &self.products {
            if !skus.insert(product.sku.as_str()) {
                return Err(format!("duplicate product SKU {}", product.sku));
            }
        }
        let mut codes = HashSet::new();
        for error in &self.error_codes {
            if !codes.insert(error.code.as_str()) {
                return Err(format!("duplicate error code {}", error.code));
            }
        }
        let mut installers = HashSet::new();
        for installer in &self.installers {
            if !installers.insert(installer.id.as_str()) {
                return Err(format!("duplicate installer {}", installer.id));
            }
        }

        let missing = |relation: Relation, kind: &str, id: &str| {
            Err(format!("{relation} edge references unknown {kind} {id}"))
        };
        for edge in &self.compatibility {
            for sku in [&edge.from, &edge.to] {
                if !skus.contains(sku.as_str()) {
                    return missing(Relation::CompatibleWith, "product", sku);
                }
            }
        }
        for edge in &self.error_affinity {
            if !skus.contains(edge.product.as_str()) {
                return missing(Relation::HasError, "product", &edge.product);
            }
            if !codes.contains(edge.error_code.as_str()) {
                return missing(Relation::HasError, "error code", &edge.error_code);
            }
        }
        for edge in &self.certifications {
            if !installers.contains(edge.installer.as_str()) {
                return missing(Relation::CertifiedFor, "installer", &edge.installer);
            }
            if !skus.contains(edge.product.as_str()) {
                return missing(Relation::CertifiedFor, "product", &edge.product);
            }
        }
        Ok(())
    }

    fn product(&self, sku: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.sku == sku)
    }

    fn error_code(&self, code: &str) -> Option<&ErrorCode> {
        self.error_codes.iter().find(|e| e.code == code)
    }
}

/// Graph backend that serves a [`GraphSnapshot`] from memory.
#[derive(Debug)]
pub struct MemoryBackend {
    snapshot: GraphSnapshot,
}

impl MemoryBackend {
    pub fn new(snapshot: GraphSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, BackendError> {
        Ok(Self::new(GraphSnapshot::from_yaml_file(path)?))
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    fn error_details(&self, params: &Params) -> Result<Vec<Record>, BackendError> {
        let code = required_str(params, param::ERROR_CODE)?;
        self.snapshot
            .error_code(code)
            .map(to_record)
            .into_iter()
            .collect()
    }

    fn product_affinity(&self, params: &Params) -> Result<Vec<Record>, BackendError> {
        let code = required_str(params, param::ERROR_CODE)?;
        let sku = required_str(params, param::PRODUCT_SKU)?;

        let Some(product) = self.snapshot.product(sku) else {
            return Ok(Vec::new());
        };

        let affinity: Vec<Value> = self
            .snapshot
            .error_affinity
            .iter()
            .filter(|edge| edge.product == sku && edge.error_code == code)
            .map(|edge| {
                serde_json::json!({
                    "frecuencia": edge.frequency,
                    "condiciones": edge.conditions,
                })
            })
            .collect();

        Ok(vec![Record::new()
            .with("codigoProducto", product.sku.clone())
            .with("nombre", product.name.clone())
            .with("afinidad", affinity)])
    }

    fn compatible_products(&self, params: &Params) -> Result<Vec<Record>, BackendError> {
        let sku = required_str(params, param::PRODUCT_SKU)?;

        let mut products: Vec<&Product> = self
            .snapshot
            .compatibility
            .iter()
            .filter(|edge| edge.from == sku)
            .filter_map(|edge| self.snapshot.product(&edge.to))
            .collect();
        products.sort_by(|a, b| {
            a.capacity_kw
                .partial_cmp(&b.capacity_kw)
                .unwrap_or(Ordering::Equal)
        });

        products.into_iter().map(to_record).collect()
    }

    fn cable_specs(&self, params: &Params) -> Result<Vec<Record>, BackendError> {
        let term = params.str_param(param::TERM).map(slug);

        let mut specs: Vec<&CableSpec> = self
            .snapshot
            .cable_specs
            .iter()
            .filter(|spec| match &term {
                Some(term) => {
                    slug(&spec.cable_type).contains(term.as_str())
                        || slug(&spec.application).contains(term.as_str())
                }
                None => true,
            })
            .collect();
        specs.sort_by(|a, b| a.cable_type.cmp(&b.cable_type));

        specs.into_iter().map(to_record).collect()
    }

    fn frequency_ranking(&self, params: &Params) -> Result<Vec<Record>, BackendError> {
        let limit = params
            .get(param::LIMIT)
            .and_then(Value::as_u64)
            .ok_or_else(|| BackendError::InvalidQuery(format!("missing parameter ${}", param::LIMIT)))?;

        let mut edges: Vec<&ErrorAffinityEdge> = self
            .snapshot
            .error_affinity
            .iter()
            .filter(|edge| edge.is_observed())
            .collect();
        edges.sort_by(|a, b| b.frequency.cmp(&a.frequency));

        Ok(edges
            .into_iter()
            .take(limit as usize)
            .map(|edge| {
                let description = self
                    .snapshot
                    .error_code(&edge.error_code)
                    .map(|e| Value::from(e.description.clone()))
                    .unwrap_or(Value::Null);
                Record::new()
                    .with("codigoProducto", edge.product.clone())
                    .with("codigoError", edge.error_code.clone())
                    .with("descripcion", description)
                    .with("frecuencia", edge.frequency)
            })
            .collect())
    }

    fn certified_installers(&self, params: &Params) -> Result<Vec<Record>, BackendError> {
        let region = params.str_param(param::REGION).map(slug);

        let mut certified_for: HashMap<&str, Vec<String>> = HashMap::new();
        for edge in &self.snapshot.certifications {
            certified_for
                .entry(edge.installer.as_str())
                .or_default()
                .push(edge.product.clone());
        }

        let mut installers: Vec<&Installer> = self
            .snapshot
            .installers
            .iter()
            .filter(|i| i.certified)
            .filter(|i| region.as_ref().map_or(true, |r| slug(&i.region) == *r))
            .collect();
        installers.sort_by(|a, b| a.region.cmp(&b.region));

        installers
            .into_iter()
            .map(|installer| {
                let products = certified_for
                    .get(installer.id.as_str())
                    .cloned()
                    .unwrap_or_default();
                Ok(to_record(installer)?.with("certificadoPara", products))
            })
            .collect()
    }
}

#[async_trait]
impl GraphBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn execute(
        &self,
        query: &PatternQuery,
        params: &Params,
    ) -> Result<Vec<Record>, BackendError> {
        match query.kind() {
            QueryKind::ErrorDetails => self.error_details(params),
            QueryKind::ProductAffinity => self.product_affinity(params),
            QueryKind::CompatibleProducts => self.compatible_products(params),
            QueryKind::CableSpecs => self.cable_specs(params),
            QueryKind::FrequencyRanking => self.frequency_ranking(params),
            QueryKind::CertifiedInstallers => self.certified_installers(params),
        }
    }

    async fn ping(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn stats(&self) -> Result<GraphStats, BackendError> {
        let s = &self.snapshot;
        let mut stats = GraphStats::default();
        for (label, count) in [
            (Label::Product, s.products.len()),
            (Label::ErrorCode, s.error_codes.len()),
            (Label::CableSpec, s.cable_specs.len()),
            (Label::Installer, s.installers.len()),
        ] {
            stats.nodes.insert(label.to_string(), count);
        }
        for (relation, count) in [
            (Relation::CompatibleWith, s.compatibility.len()),
            (Relation::HasError, s.error_affinity.len()),
            (Relation::CertifiedFor, s.certifications.len()),
        ] {
            stats.relationships.insert(relation.to_string(), count);
        }
        Ok(stats)
    }
}

fn required_str<'a>(params: &'a Params, name: &str) -> Result<&'a str, BackendError> {
    params
        .str_param(name)
        .ok_or_else(|| BackendError::InvalidQuery(format!("missing parameter ${name}")))
}

fn to_record<T: Serialize>(entity: &T) -> Result<Record, BackendError> {
    Record::try_from(serde_json::to_value(entity)?)
}
