use std::sync::Arc;

use techgraph_core::config::BackendConfig;
use techgraph_core::engine::{FailureKind, Payload};
use techgraph_core::graph::{GraphBackend, SurrealBackend};
use techgraph_core::{Config, Engine, IntentKind, StructuredQuery};

const SEED: &str = r#"
CREATE producto:AM160MXVAF SET codigoProducto = 'AM160MXVAF', nombre = 'DVM S 16HP', categoria = 'outdoor-unit', capacidadKw = 45.0;
CREATE producto:AM080MXVAF SET codigoProducto = 'AM080MXVAF', nombre = 'DVM S 8HP', categoria = 'outdoor-unit', capacidadKw = 22.4;
CREATE producto:AM071MNMDKH SET codigoProducto = 'AM071MNMDKH', nombre = 'Cassette 7.1', categoria = 'indoor-unit', capacidadKw = 7.1;
CREATE producto:AM022MNMDKH SET codigoProducto = 'AM022MNMDKH', nombre = 'Cassette 2.2', categoria = 'indoor-unit', capacidadKw = 2.2;

CREATE codigo_error:E458 SET codigoError = 'E458', descripcion = 'Outdoor fan motor error', severidad = 'critical',
    categoria = 'ventilacion', tiempoResolucion = 90, solucionDetallada = ['Power off the unit', 'Inspect the fan blade'];
CREATE codigo_error:E101 SET codigoError = 'E101', descripcion = 'Communication error', severidad = 'high',
    categoria = 'comunicacion', tiempoResolucion = 45, solucionDetallada = ['Check F1/F2 wiring'];

CREATE especificacion_cable:com SET especCableId = 'CAB-COM-01', especificacion = '2 x 0.75 mm2 shielded',
    aplicacion = 'communication bus', longitudMaxima = 1000.0, tipo = 'comunicación';
CREATE especificacion_cable:pwr SET especCableId = 'CAB-PWR-01', especificacion = '3 x 2.5 mm2',
    aplicacion = 'power supply', longitudMaxima = 50.0, tipo = 'alimentacion';

CREATE instalador:ins1 SET instaladorId = 'INS-001', nombre = 'Carla Rojas', empresa = 'Clima Sur SpA',
    region = 'Santiago', whatsapp = '+56911111111', certificacionSamsung = true;
CREATE instalador:ins2 SET instaladorId = 'INS-002', nombre = 'Pablo Soto', empresa = 'Bio Bio',
    region = 'Concepcion', certificacionSamsung = false;

RELATE producto:AM160MXVAF->es_compatible->producto:AM071MNMDKH;
RELATE producto:AM160MXVAF->es_compatible->producto:AM022MNMDKH;
RELATE producto:AM080MXVAF->tiene_error->codigo_error:E458 SET frecuencia = 12, condiciones = ['high ambient'];
RELATE producto:AM160MXVAF->tiene_error->codigo_error:E101 SET frecuencia = 8, condiciones = [];
RELATE producto:AM160MXVAF->tiene_error->codigo_error:E458 SET frecuencia = 0, condiciones = [];
RELATE instalador:ins1->certificado_para->producto:AM160MXVAF;
"#;

async fn seeded_engine() -> (Engine, Arc<SurrealBackend>) {
    let config = BackendConfig {
        endpoint: "mem://".to_string(),
        ..Default::default()
    };
    let backend = Arc::new(SurrealBackend::connect(&config).await.unwrap());
    backend.client().query(SEED).await.unwrap().check().unwrap();

    let engine = Engine::new(backend.clone(), &Config::default()).unwrap();
    (engine, backend)
}

#[tokio::test]
async fn test_surreal_backend_answers_every_intent() {
    let (engine, backend) = seeded_engine().await;

    assert!(backend.ping().await.is_ok());

    let result = engine
        .process_query(StructuredQuery::error("E458").with_product("AM080MXVAF"))
        .await;
    assert!(result.success, "{:?}", result.failure_reason);
    let Some(Payload::ErrorDiagnosis(diagnosis)) = &result.payload else {
        panic!("expected an error diagnosis");
    };
    assert_eq!(diagnosis.error.resolution_steps.len(), 2);
    let context = diagnosis.product.as_ref().unwrap();
    assert!(context.affected);
    assert_eq!(context.frequency, Some(12));

    let result = engine
        .process_query(StructuredQuery::error("E101").with_product("AM080MXVAF"))
        .await;
    let Some(Payload::ErrorDiagnosis(diagnosis)) = &result.payload else {
        panic!("expected an error diagnosis");
    };
    assert!(!diagnosis.product.as_ref().unwrap().affected);

    let result = engine
        .process_query(StructuredQuery::product("AM160MXVAF"))
        .await;
    let Some(Payload::Compatibility(compat)) = &result.payload else {
        panic!("expected compatible products: {:?}", result.failure_reason);
    };
    let skus: Vec<&str> = compat
        .compatible_products
        .iter()
        .map(|p| p.sku.as_str())
        .collect();
    assert_eq!(skus, vec!["AM022MNMDKH", "AM071MNMDKH"]);

    let result = engine.process_query("cable de alimentacion").await;
    let Some(Payload::CableSpecs(specs)) = &result.payload else {
        panic!("expected cable specs: {:?}", result.failure_reason);
    };
    assert_eq!(specs.cable_specs.len(), 1);
    assert_eq!(specs.cable_specs[0].id, "CAB-PWR-01");

    let result = engine.process_query("errores frecuentes").await;
    let Some(Payload::FrequencyRanking(ranking)) = &result.payload else {
        panic!("expected a ranking: {:?}", result.failure_reason);
    };
    let frequencies: Vec<u32> = ranking.ranking.iter().map(|e| e.frequency).collect();
    assert_eq!(frequencies, vec![12, 8]);

    let result = engine.process_query("instalador").await;
    let Some(Payload::Installers(installers)) = &result.payload else {
        panic!("expected installers: {:?}", result.failure_reason);
    };
    assert_eq!(installers.installers.len(), 1);
    assert_eq!(installers.installers[0].certified_for, vec!["AM160MXVAF"]);
}

#[tokio::test]
async fn test_surreal_missing_error_is_no_match() {
    let (engine, _) = seeded_engine().await;

    let result = engine.process_query(StructuredQuery::error("E999")).await;
    assert_eq!(result.intent, IntentKind::ErrorDiagnosis);
    assert_eq!(result.failure_kind, Some(FailureKind::NoMatch));
}

#[tokio::test]
async fn test_surreal_stats_count_labels() {
    let (engine, _) = seeded_engine().await;

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.nodes["Product"], 4);
    assert_eq!(stats.nodes["Installer"], 2);
    assert_eq!(stats.relationships["COMPATIBLE_WITH"], 2);
    assert_eq!(stats.relationships["HAS_ERROR"], 3);
}

#[tokio::test]
async fn test_surreal_term_and_region_ignore_accents() {
    let (engine, _) = seeded_engine().await;

    let result = engine.process_query("cable de comunicacion").await;
    let Some(Payload::CableSpecs(specs)) = &result.payload else {
        panic!("expected cable specs: {:?}", result.failure_reason);
    };
    assert_eq!(specs.cable_specs.len(), 1);
    assert_eq!(specs.cable_specs[0].id, "CAB-COM-01");

    let result = engine.process_query("instalador en Santiago").await;
    let Some(Payload::Installers(installers)) = &result.payload else {
        panic!("expected installers: {:?}", result.failure_reason);
    };
    assert_eq!(installers.installers.len(), 1);
}
