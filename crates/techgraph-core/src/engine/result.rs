//! The structured answer returned for every query.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::graph::models::{CableSpec, ErrorCode, Installer, Product};
use crate::query::IntentKind;

/// Why a query did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Classification failed. The caller can rephrase.
    UnrecognizedQuery,
    /// Valid intent, nothing in the graph answers it.
    NoMatch,
    /// Transport failure or timeout. The caller can try again.
    BackendUnavailable,
    /// A query the engine built or a row it received was malformed.
    InternalQueryError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnrecognizedQuery => "UNRECOGNIZED_QUERY",
            FailureKind::NoMatch => "NO_MATCH",
            FailureKind::BackendUnavailable => "BACKEND_UNAVAILABLE",
            FailureKind::InternalQueryError => "INTERNAL_QUERY_ERROR",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`Engine::process_query`](super::Engine::process_query).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    pub success: bool,
    /// Wall-clock time spent on the query, in milliseconds.
    pub response_time_ms: u64,
    pub intent: IntentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl DiagnosticResult {
    pub fn succeeded(intent: IntentKind, payload: Payload, elapsed: Duration) -> Self {
        Self {
            success: true,
            response_time_ms: millis(elapsed),
            intent,
            payload: Some(payload),
            failure_kind: None,
            failure_reason: None,
        }
    }

    pub fn failed(
        intent: IntentKind,
        kind: FailureKind,
        reason: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            success: false,
            response_time_ms: millis(elapsed),
            intent,
            payload: None,
            failure_kind: Some(kind),
            failure_reason: Some(reason.into()),
        }
    }

    /// Replace the measured time, keeping everything else.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.response_time_ms = millis(elapsed);
        self
    }

    /// Whether the caller may retry the same query later.
    pub fn is_retryable(&self) -> bool {
        self.failure_kind == Some(FailureKind::BackendUnavailable)
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Intent-specific answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    ErrorDiagnosis(ErrorDiagnosis),
    Compatibility(Compatibility),
    CableSpecs(CableSpecs),
    FrequencyRanking(FrequencyRanking),
    Installers(Installers),
}

/// Error details, optionally in the context of one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDiagnosis {
    #[serde(flatten)]
    pub error: ErrorCode,
    #[serde(rename = "producto", skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductContext>,
}

/// How an error relates to the product the caller named.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductContext {
    #[serde(rename = "codigoProducto")]
    pub sku: String,
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// False when the SKU is not in the graph.
    #[serde(rename = "productoEncontrado")]
    pub found: bool,
    /// True when a HAS_ERROR edge links the product to the error.
    #[serde(rename = "errorAfectaProducto")]
    pub affected: bool,
    #[serde(rename = "frecuencia", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,
    #[serde(rename = "condiciones", skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    #[serde(rename = "nota", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Products accepted by a unit, by ascending capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Compatibility {
    pub product_sku: String,
    pub compatible_products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CableSpecs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    pub cable_specs: Vec<CableSpec>,
}

/// Most frequently observed product/error pairs, most frequent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRanking {
    pub limit: usize,
    pub ranking: Vec<FrequencyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyEntry {
    #[serde(rename = "codigoProducto")]
    pub product_sku: String,
    #[serde(rename = "codigoError")]
    pub error_code: String,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "frecuencia")]
    pub frequency: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Installers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub installers: Vec<CertifiedInstaller>,
}

/// A certified installer and the products they are certified for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertifiedInstaller {
    #[serde(flatten)]
    pub installer: Installer,
    #[serde(rename = "certificadoPara")]
    pub certified_for: Vec<String>,
}
