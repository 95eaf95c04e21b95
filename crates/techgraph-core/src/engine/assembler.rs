//! Turns executed plans into [`DiagnosticResult`]s.

use std::time::Duration;

use tracing::error;

use super::error::EngineError;
use super::result::{
    CableSpecs, CertifiedInstaller, Compatibility, DiagnosticResult, ErrorDiagnosis, FailureKind,
    FrequencyEntry, FrequencyRanking, Installers, Payload, ProductContext,
};
use crate::graph::models::{CableSpec, ErrorCode, Installer, Product};
use crate::graph::{QueryKind, Record};
use crate::query::{Intent, PlanResult, QueryPlan};

/// Reason attached to every unrecognized query.
pub const UNRECOGNIZED_REASON: &str = "unrecognized query";

/// Why a payload could not be built.
enum Rejection {
    NoMatch(String),
    Internal(EngineError),
}

impl From<EngineError> for Rejection {
    fn from(err: EngineError) -> Self {
        Rejection::Internal(err)
    }
}

/// Stateless builder of results.
#[derive(Debug, Clone, Default)]
pub struct ResponseAssembler;

impl ResponseAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn unrecognized(&self, elapsed: Duration) -> DiagnosticResult {
        DiagnosticResult::failed(
            Intent::Unrecognized.kind(),
            FailureKind::UnrecognizedQuery,
            UNRECOGNIZED_REASON,
            elapsed,
        )
    }

    /// Result for a plan that failed to execute.
    pub fn failure(&self, intent: &Intent, err: &EngineError, elapsed: Duration) -> DiagnosticResult {
        DiagnosticResult::failed(intent.kind(), err.failure_kind(), err.to_string(), elapsed)
    }

    /// Result for a plan that executed.
    pub fn assemble(
        &self,
        intent: &Intent,
        plan: &QueryPlan,
        rows: &PlanResult,
        elapsed: Duration,
    ) -> DiagnosticResult {
        match build_payload(intent, plan, rows) {
            Ok(payload) => DiagnosticResult::succeeded(intent.kind(), payload, elapsed),
            Err(Rejection::NoMatch(reason)) => {
                DiagnosticResult::failed(intent.kind(), FailureKind::NoMatch, reason, elapsed)
            }
            Err(Rejection::Internal(err)) => {
                error!(intent = %intent.kind(), error = %err, "Failed to assemble result");
                self.failure(intent, &err, elapsed)
            }
        }
    }
}

fn build_payload(intent: &Intent, plan: &QueryPlan, rows: &PlanResult) -> Result<Payload, Rejection> {
    match intent {
        Intent::ErrorDiagnosis {
            error_code,
            product_sku,
        } => error_diagnosis(error_code, product_sku.as_deref(), rows),
        Intent::CompatibilityLookup { product_sku } => {
            let records = fetched(rows, QueryKind::CompatibleProducts)?;
            if records.is_empty() {
                return Err(Rejection::NoMatch(format!(
                    "no compatible products found for {product_sku}"
                )));
            }
            Ok(Payload::Compatibility(Compatibility {
                product_sku: product_sku.clone(),
                compatible_products: decode_all::<Product>(records, QueryKind::CompatibleProducts)?,
            }))
        }
        Intent::SpecLookup { term } => {
            let records = fetched(rows, QueryKind::CableSpecs)?;
            if records.is_empty() {
                let reason = match term {
                    Some(term) => format!("no cable specification matches '{term}'"),
                    None => "no cable specifications in the knowledge graph".to_string(),
                };
                return Err(Rejection::NoMatch(reason));
            }
            Ok(Payload::CableSpecs(CableSpecs {
                term: term.clone(),
                cable_specs: decode_all::<CableSpec>(records, QueryKind::CableSpecs)?,
            }))
        }
        Intent::FrequencyRanking { .. } => {
            let records = fetched(rows, QueryKind::FrequencyRanking)?;
            if records.is_empty() {
                return Err(Rejection::NoMatch(
                    "no error frequencies have been recorded".to_string(),
                ));
            }
            let ranking = records
                .iter()
                .map(frequency_entry)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Payload::FrequencyRanking(FrequencyRanking {
                limit: plan.limit().unwrap_or(ranking.len()),
                ranking,
            }))
        }
        Intent::InstallerLookup { region } => {
            let records = fetched(rows, QueryKind::CertifiedInstallers)?;
            if records.is_empty() {
                let reason = match region {
                    Some(region) => format!("no certified installers in region {region}"),
                    None => "no certified installers in the knowledge graph".to_string(),
                };
                return Err(Rejection::NoMatch(reason));
            }
            let installers = records
                .iter()
                .map(|record| {
                    Ok(CertifiedInstaller {
                        installer: decode::<Installer>(record, QueryKind::CertifiedInstallers)?,
                        certified_for: record.str_list("certificadoPara"),
                    })
                })
                .collect::<Result<Vec<_>, EngineError>>()?;
            Ok(Payload::Installers(Installers {
                region: region.clone(),
                installers,
            }))
        }
        Intent::Unrecognized => Err(Rejection::Internal(EngineError::internal(
            QueryKind::ErrorDetails,
            "unrecognized intent reached the assembler",
        ))),
    }
}

fn error_diagnosis(
    error_code: &str,
    product_sku: Option<&str>,
    rows: &PlanResult,
) -> Result<Payload, Rejection> {
    let Some(record) = fetched(rows, QueryKind::ErrorDetails)?.first() else {
        return Err(Rejection::NoMatch(format!(
            "error code {error_code} not found in the knowledge graph"
        )));
    };
    let error = decode::<ErrorCode>(record, QueryKind::ErrorDetails)?;

    let product = match product_sku {
        Some(sku) => Some(product_context(
            sku,
            error_code,
            fetched(rows, QueryKind::ProductAffinity)?,
        )),
        None => None,
    };

    Ok(Payload::ErrorDiagnosis(ErrorDiagnosis { error, product }))
}

/// A missing product still returns the error details, with a note.
fn product_context(sku: &str, error_code: &str, records: &[Record]) -> ProductContext {
    let Some(record) = records.first() else {
        return ProductContext {
            sku: sku.to_string(),
            name: None,
            found: false,
            affected: false,
            frequency: None,
            conditions: Vec::new(),
            note: Some(format!("product {sku} not found in the knowledge graph")),
        };
    };

    let affinity = record.records("afinidad");
    let edge = affinity.first();
    let affected = edge.is_some();

    ProductContext {
        sku: record.str_field("codigoProducto").unwrap_or(sku).to_string(),
        name: record.str_field("nombre").map(str::to_string),
        found: true,
        affected,
        frequency: edge
            .and_then(|e| e.u64_field("frecuencia"))
            .and_then(|f| u32::try_from(f).ok()),
        conditions: edge.map(|e| e.str_list("condiciones")).unwrap_or_default(),
        note: (!affected).then(|| format!("{error_code} is not recorded for product {sku}")),
    }
}

fn frequency_entry(record: &Record) -> Result<FrequencyEntry, EngineError> {
    let kind = QueryKind::FrequencyRanking;
    let field = |name: &str| {
        record
            .str_field(name)
            .map(str::to_string)
            .ok_or_else(|| EngineError::internal(kind, format!("row is missing {name}")))
    };

    let frequency = record
        .u64_field("frecuencia")
        .and_then(|f| u32::try_from(f).ok())
        .ok_or_else(|| EngineError::internal(kind, "row is missing frecuencia"))?;

    Ok(FrequencyEntry {
        product_sku: field("codigoProducto")?,
        error_code: field("codigoError")?,
        description: record.str_field("descripcion").map(str::to_string),
        frequency,
    })
}

fn fetched(rows: &PlanResult, kind: QueryKind) -> Result<&[Record], EngineError> {
    rows.records(kind)
        .ok_or_else(|| EngineError::internal(kind, "plan did not include this fetch"))
}

fn decode<T: serde::de::DeserializeOwned>(record: &Record, kind: QueryKind) -> Result<T, EngineError> {
    record
        .decode()
        .map_err(|e| EngineError::internal(kind, e.to_string()))
}

fn decode_all<T: serde::de::DeserializeOwned>(
    records: &[Record],
    kind: QueryKind,
) -> Result<Vec<T>, EngineError> {
    records.iter().map(|r| decode(r, kind)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryPlanner;
    use serde_json::json;

    fn plan_for(intent: &Intent) -> QueryPlan {
        QueryPlanner::new(10).plan(intent)
    }

    fn rows(results: Vec<(QueryKind, Vec<Record>)>) -> PlanResult {
        PlanResult::from_results(results)
    }

    fn e458() -> Record {
        Record::new()
            .with("codigoError", "E458")
            .with("descripcion", "Outdoor fan error")
            .with("severidad", "critical")
            .with("categoria", "ventilacion")
            .with("tiempoResolucion", 60)
            .with("solucionDetallada", json!(["Check fan motor", "Replace PCB"]))
    }

    #[test]
    fn test_unrecognized_reason() {
        let result = ResponseAssembler::new().unrecognized(Duration::ZERO);
        assert!(!result.success);
        assert_eq!(result.failure_reason.as_deref(), Some("unrecognized query"));
        assert_eq!(result.failure_kind, Some(FailureKind::UnrecognizedQuery));
    }

    #[test]
    fn test_missing_error_code_is_no_match() {
        let intent = Intent::ErrorDiagnosis {
            error_code: "E999".into(),
            product_sku: None,
        };
        let result = ResponseAssembler::new().assemble(
            &intent,
            &plan_for(&intent),
            &rows(vec![(QueryKind::ErrorDetails, vec![])]),
            Duration::ZERO,
        );
        assert!(!result.success);
        assert_eq!(result.failure_kind, Some(FailureKind::NoMatch));
    }

    #[test]
    fn test_missing_product_keeps_error_details() {
        let intent = Intent::ErrorDiagnosis {
            error_code: "E458".into(),
            product_sku: Some("AM999XXXXX".into()),
        };
        let result = ResponseAssembler::new().assemble(
            &intent,
            &plan_for(&intent),
            &rows(vec![
                (QueryKind::ErrorDetails, vec![e458()]),
                (QueryKind::ProductAffinity, vec![]),
            ]),
            Duration::ZERO,
        );

        assert!(result.success);
        let Some(Payload::ErrorDiagnosis(diagnosis)) = result.payload else {
            panic!("expected an error diagnosis");
        };
        let product = diagnosis.product.unwrap();
        assert!(!product.found);
        assert!(!product.affected);
        assert!(product.note.is_some());
    }

    #[test]
    fn test_affinity_edge_marks_product_affected() {
        let intent = Intent::ErrorDiagnosis {
            error_code: "E458".into(),
            product_sku: Some("AM080MXVAF".into()),
        };
        let affinity = Record::new()
            .with("codigoProducto", "AM080MXVAF")
            .with("nombre", "DVM S 8HP")
            .with(
                "afinidad",
                json!([{ "frecuencia": 12, "condiciones": ["high ambient"] }]),
            );
        let result = ResponseAssembler::new().assemble(
            &intent,
            &plan_for(&intent),
            &rows(vec![
                (QueryKind::ErrorDetails, vec![e458()]),
                (QueryKind::ProductAffinity, vec![affinity]),
            ]),
            Duration::ZERO,
        );

        let Some(Payload::ErrorDiagnosis(diagnosis)) = result.payload else {
            panic!("expected an error diagnosis");
        };
        let product = diagnosis.product.unwrap();
        assert!(product.affected);
        assert_eq!(product.frequency, Some(12));
        assert_eq!(product.conditions, vec!["high ambient".to_string()]);
    }

    #[test]
    fn test_malformed_row_is_internal_error() {
        let intent = Intent::ErrorDiagnosis {
            error_code: "E458".into(),
            product_sku: None,
        };
        let broken = Record::new().with("codigoError", "E458").with("severidad", "apocalyptic");
        let result = ResponseAssembler::new().assemble(
            &intent,
            &plan_for(&intent),
            &rows(vec![(QueryKind::ErrorDetails, vec![broken])]),
            Duration::ZERO,
        );
        assert_eq!(result.failure_kind, Some(FailureKind::InternalQueryError));
    }

    #[test]
    fn test_backend_failure_is_distinct_from_no_match() {
        let intent = Intent::SpecLookup { term: None };
        let err = EngineError::Timeout(Duration::from_millis(2000));
        let result = ResponseAssembler::new().failure(&intent, &err, Duration::ZERO);
        assert_eq!(result.failure_kind, Some(FailureKind::BackendUnavailable));
        assert!(result.is_retryable());
    }
}
