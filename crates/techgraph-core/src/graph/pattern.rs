//! Backend-neutral pattern queries.
//!
//! A [`PatternQuery`] pairs a [`QueryKind`] with the query text and the
//! parameter names it binds. Backends that speak SurrealQL execute the text;
//! other backends may evaluate the pattern from its kind alone.

use std::fmt;

/// Parameter names bound into pattern queries.
pub mod param {
    pub const ERROR_CODE: &str = "error_code";
    pub const PRODUCT_SKU: &str = "product_sku";
    pub const TERM: &str = "term";
    pub const LIMIT: &str = "limit";
    pub const REGION: &str = "region";
}

/// The graph patterns the engine knows how to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKind {
    /// One error code by its code.
    ErrorDetails,
    /// A product and its affinity edge to one error code.
    ProductAffinity,
    /// Products reachable through outgoing compatibility edges.
    CompatibleProducts,
    /// Cable specifications matching a type/application term.
    CableSpecs,
    /// Top affinity edges by frequency.
    FrequencyRanking,
    /// Certified installers, optionally in one region.
    CertifiedInstallers,
}

impl QueryKind {
    pub const ALL: [QueryKind; 6] = [
        QueryKind::ErrorDetails,
        QueryKind::ProductAffinity,
        QueryKind::CompatibleProducts,
        QueryKind::CableSpecs,
        QueryKind::FrequencyRanking,
        QueryKind::CertifiedInstallers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::ErrorDetails => "error_details",
            QueryKind::ProductAffinity => "product_affinity",
            QueryKind::CompatibleProducts => "compatible_products",
            QueryKind::CableSpecs => "cable_specs",
            QueryKind::FrequencyRanking => "frequency_ranking",
            QueryKind::CertifiedInstallers => "certified_installers",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase and strip Spanish diacritics.
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Comparison form for term and region parameters.
///
/// Folds the text and joins its alphanumeric runs with `-`, the same form
/// SurrealQL's `string::slug` produces, so both backends agree on whether
/// "Comunicación" matches "comunicacion".
pub fn slug(text: &str) -> String {
    fold(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// A parameterized graph-pattern query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternQuery {
    kind: QueryKind,
    text: String,
    params: Vec<String>,
}

impl PatternQuery {
    pub fn new(kind: QueryKind, text: impl Into<String>, params: &[&str]) -> Self {
        Self {
            kind,
            text: text.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Declared parameter names, without the `$` sigil.
    pub fn params(&self) -> &[String] {
        &self.params
    }
}
