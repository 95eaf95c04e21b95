//! Node types for the equipment graph.
//!
//! Field names are serialized with the graph's property names
//! (`codigoProducto`, `capacidadKw`, ...) so a record fetched from the
//! backend decodes directly into these types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity of an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities, least severe first.
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// The wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// Product category.
///
/// Known categories are normalized; anything else (e.g. a system family
/// label such as `VRF`) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductCategory {
    IndoorUnit,
    OutdoorUnit,
    Accessory,
    Other(String),
}

impl ProductCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ProductCategory::IndoorUnit => "indoor-unit",
            ProductCategory::OutdoorUnit => "outdoor-unit",
            ProductCategory::Accessory => "accessory",
            ProductCategory::Other(s) => s,
        }
    }
}

impl From<String> for ProductCategory {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "indoor-unit" | "indoor" | "interior" | "unidad-interior" => ProductCategory::IndoorUnit,
            "outdoor-unit" | "outdoor" | "exterior" | "unidad-exterior" => ProductCategory::OutdoorUnit,
            "accessory" | "accesorio" => ProductCategory::Accessory,
            _ => ProductCategory::Other(s),
        }
    }
}

impl From<ProductCategory> for String {
    fn from(c: ProductCategory) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An equipment model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// SKU, unique across the graph.
    #[serde(rename = "codigoProducto")]
    pub sku: String,
    /// Display name.
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "categoria")]
    pub category: ProductCategory,
    /// Nominal capacity in kW.
    #[serde(rename = "capacidadKw")]
    pub capacity_kw: f64,
}

/// A diagnostic error code with its resolution procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCode {
    /// Code, unique across the graph (e.g. `E458`).
    #[serde(rename = "codigoError")]
    pub code: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "severidad")]
    pub severity: Severity,
    #[serde(rename = "categoria", default)]
    pub category: String,
    /// Estimated resolution time in minutes.
    #[serde(rename = "tiempoResolucion")]
    pub resolution_minutes: u32,
    /// Ordered resolution steps.
    #[serde(rename = "solucionDetallada", default)]
    pub resolution_steps: Vec<String>,
}

/// Cable specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableSpec {
    #[serde(rename = "especCableId")]
    pub id: String,
    #[serde(rename = "especificacion")]
    pub specification: String,
    /// What the cable is used for.
    #[serde(rename = "aplicacion")]
    pub application: String,
    /// Maximum run length in meters.
    #[serde(rename = "longitudMaxima", default)]
    pub max_length_m: Option<f64>,
    #[serde(rename = "tipo")]
    pub cable_type: String,
}

/// An installer or installation company contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installer {
    #[serde(rename = "instaladorId")]
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "empresa")]
    pub company: String,
    pub region: String,
    #[serde(rename = "whatsapp", default)]
    pub contact: Option<String>,
    #[serde(rename = "certificacionSamsung", default)]
    pub certified: bool,
}
