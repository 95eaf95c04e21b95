mod common;

use std::io::Write;

use common::{memory_backend, SAMPLE_GRAPH};
use serde_json::Value;
use techgraph_core::graph::{
    param, BackendError, GraphBackend, GraphSnapshot, MemoryBackend, Params, QueryKind,
};
use techgraph_core::query::QueryTemplates;

async fn run(kind: QueryKind, params: Params) -> Result<Vec<techgraph_core::graph::Record>, BackendError> {
    let templates = QueryTemplates::standard().unwrap();
    memory_backend()
        .execute(templates.get(kind).unwrap(), &params)
        .await
}

#[test]
fn test_snapshot_loads_fixture() {
    let snapshot = GraphSnapshot::from_yaml_str(SAMPLE_GRAPH).unwrap();
    assert_eq!(snapshot.products.len(), 6);
    assert_eq!(snapshot.error_codes.len(), 5);
    assert_eq!(snapshot.error_affinity.len(), 6);
}

#[test]
fn test_duplicate_identifiers_rejected() {
    let yaml = r#"
products:
  - { codigoProducto: AM080MXVAF, nombre: a, categoria: outdoor, capacidadKw: 22.4 }
  - { codigoProducto: AM080MXVAF, nombre: b, categoria: outdoor, capacidadKw: 22.4 }
"#;
    let err = GraphSnapshot::from_yaml_str(yaml).unwrap_err();
    assert!(err.contains("AM080MXVAF"));
}

#[test]
fn test_dangling_edges_rejected() {
    let products = r#"
products:
  - { codigoProducto: AM080MXVAF, nombre: a, categoria: outdoor, capacidadKw: 22.4 }
error_codes:
  - { codigoError: E458, descripcion: d, severidad: high, tiempoResolucion: 10, solucionDetallada: [s] }
installers:
  - { instaladorId: INS-001, nombre: n, empresa: e, region: Santiago, certificacionSamsung: true }
"#;
    let cases = [
        ("error_affinity: [{ codigoProducto: NOPE, codigoError: E458 }]", "NOPE"),
        ("error_affinity: [{ codigoProducto: AM080MXVAF, codigoError: E999 }]", "E999"),
        ("compatibility: [{ from: AM080MXVAF, to: AM999XXXXX }]", "AM999XXXXX"),
        ("certifications: [{ instaladorId: INS-404, codigoProducto: AM080MXVAF }]", "INS-404"),
        ("certifications: [{ instaladorId: INS-001, codigoProducto: NOPE }]", "NOPE"),
    ];

    assert!(GraphSnapshot::from_yaml_str(products).is_ok());
    for (edges, unknown) in cases {
        let err = GraphSnapshot::from_yaml_str(&format!("{products}{edges}\n")).unwrap_err();
        assert!(err.contains(unknown), "{edges}: {err}");
    }
}

#[test]
fn test_snapshot_file_errors_name_the_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "products: [not, a, product]").unwrap();

    let err = MemoryBackend::from_yaml_file(file.path()).unwrap_err();
    assert!(matches!(err, BackendError::Snapshot { .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_error_details_by_code() {
    let rows = run(
        QueryKind::ErrorDetails,
        Params::new().bind(param::ERROR_CODE, "E101"),
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].str_field("severidad"), Some("high"));
    assert_eq!(rows[0].str_list("solucionDetallada").len(), 3);
}

#[tokio::test]
async fn test_product_affinity_shape() {
    let rows = run(
        QueryKind::ProductAffinity,
        Params::new()
            .bind(param::ERROR_CODE, "E458")
            .bind(param::PRODUCT_SKU, "AM160MXVAF"),
    )
    .await
    .unwrap();

    let affinity = rows[0].records("afinidad");
    assert_eq!(affinity.len(), 1);
    assert_eq!(affinity[0].u64_field("frecuencia"), Some(5));

    let rows = run(
        QueryKind::ProductAffinity,
        Params::new()
            .bind(param::ERROR_CODE, "E458")
            .bind(param::PRODUCT_SKU, "NOPE"),
    )
    .await
    .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_null_frequency_is_kept_on_affinity() {
    let rows = run(
        QueryKind::ProductAffinity,
        Params::new()
            .bind(param::ERROR_CODE, "E201")
            .bind(param::PRODUCT_SKU, "AM071MNMDKH"),
    )
    .await
    .unwrap();

    let affinity = rows[0].records("afinidad");
    assert_eq!(affinity.len(), 1);
    assert_eq!(affinity[0].u64_field("frecuencia"), None);
}

#[tokio::test]
async fn test_ranking_respects_limit() {
    let rows = run(
        QueryKind::FrequencyRanking,
        Params::new().bind(param::LIMIT, 3u64),
    )
    .await
    .unwrap();

    let frequencies: Vec<u64> = rows.iter().filter_map(|r| r.u64_field("frecuencia")).collect();
    assert_eq!(frequencies, vec![12, 8, 5]);
}

#[tokio::test]
async fn test_missing_parameter_is_invalid_query() {
    let err = run(QueryKind::FrequencyRanking, Params::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::InvalidQuery(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_installers_without_region_returns_all_certified() {
    let rows = run(
        QueryKind::CertifiedInstallers,
        Params::new().bind(param::REGION, Value::Null),
    )
    .await
    .unwrap();

    let regions: Vec<&str> = rows.iter().filter_map(|r| r.str_field("region")).collect();
    assert_eq!(regions, vec!["Santiago", "Valparaiso"]);
}

#[tokio::test]
async fn test_cable_term_matches_regardless_of_accents() {
    for term in ["comunicacion", "Comunicación", "ALIMENTACIÓN"] {
        let rows = run(QueryKind::CableSpecs, Params::new().bind(param::TERM, term))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1, "{term}");
    }
}

#[tokio::test]
async fn test_installer_region_ignores_accents() {
    let rows = run(
        QueryKind::CertifiedInstallers,
        Params::new().bind(param::REGION, "Valparaíso"),
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].str_field("instaladorId"), Some("INS-002"));
}
