//! Relationship types and graph labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Node labels, with the table each one is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Product,
    ErrorCode,
    CableSpec,
    Installer,
}

impl Label {
    pub const ALL: [Label; 4] = [
        Label::Product,
        Label::ErrorCode,
        Label::CableSpec,
        Label::Installer,
    ];

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            Label::Product => "producto",
            Label::ErrorCode => "codigo_error",
            Label::CableSpec => "especificacion_cable",
            Label::Installer => "instalador",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Label::Product => "Product",
            Label::ErrorCode => "ErrorCode",
            Label::CableSpec => "CableSpec",
            Label::Installer => "Installer",
        };
        f.write_str(name)
    }
}

/// Directed relationships between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Product -> Product: the outdoor unit accepts the indoor unit.
    CompatibleWith,
    /// Product -> ErrorCode, with frequency and trigger conditions.
    HasError,
    /// Installer -> Product.
    CertifiedFor,
}

impl Relation {
    pub const ALL: [Relation; 3] = [
        Relation::CompatibleWith,
        Relation::HasError,
        Relation::CertifiedFor,
    ];

    /// Backing relation table name.
    pub fn table(&self) -> &'static str {
        match self {
            Relation::CompatibleWith => "es_compatible",
            Relation::HasError => "tiene_error",
            Relation::CertifiedFor => "certificado_para",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Relation::CompatibleWith => "COMPATIBLE_WITH",
            Relation::HasError => "HAS_ERROR",
            Relation::CertifiedFor => "CERTIFIED_FOR",
        };
        f.write_str(name)
    }
}

/// Outdoor unit -> indoor unit compatibility. Not symmetric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityEdge {
    /// SKU of the unit that accepts the other.
    pub from: String,
    /// SKU of the accepted unit.
    pub to: String,
}

/// Product -> error code affinity.
///
/// A frequency of zero or none means the error is possible on this
/// product but has not been observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAffinityEdge {
    #[serde(rename = "codigoProducto")]
    pub product: String,
    #[serde(rename = "codigoError")]
    pub error_code: String,
    #[serde(rename = "frecuencia", default)]
    pub frequency: Option<u32>,
    #[serde(rename = "condiciones", default)]
    pub conditions: Vec<String>,
}

impl ErrorAffinityEdge {
    /// Whether the error has actually been observed on the product.
    pub fn is_observed(&self) -> bool {
        self.frequency.is_some_and(|f| f > 0)
    }
}

/// Installer -> product certification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationEdge {
    #[serde(rename = "instaladorId")]
    pub installer: String,
    #[serde(rename = "codigoProducto")]
    pub product: String,
}
