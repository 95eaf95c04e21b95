//! Parameterized query templates, one per [`QueryKind`].
//!
//! Templates are written once in SurrealQL and validated when the engine is
//! built: every `$parameter` the text references must be declared and vice
//! versa, and no template may mutate the graph.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::graph::{param, PatternQuery, QueryKind};

/// Template validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("No template registered for {0}")]
    Missing(QueryKind),

    #[error("Template {0} is empty")]
    Empty(QueryKind),

    #[error("Template {kind} references undeclared parameter ${name}")]
    UndeclaredParameter { kind: QueryKind, name: String },

    #[error("Template {kind} declares unused parameter ${name}")]
    UnusedParameter { kind: QueryKind, name: String },

    #[error("Template {kind} contains mutating statement {keyword}")]
    Mutating { kind: QueryKind, keyword: String },
}

// ============================================================================
// SurrealQL Templates
// ============================================================================

const ERROR_DETAILS: &str = r#"
SELECT codigoError, descripcion, severidad, categoria, tiempoResolucion, solucionDetallada
FROM codigo_error
WHERE codigoError = $error_code
LIMIT 1
"#;

const PRODUCT_AFFINITY: &str = r#"
SELECT codigoProducto, nombre,
    (SELECT frecuencia, condiciones FROM tiene_error
        WHERE in = $parent.id AND out.codigoError = $error_code) AS afinidad
FROM producto
WHERE codigoProducto = $product_sku
LIMIT 1
"#;

const COMPATIBLE_PRODUCTS: &str = r#"
SELECT out.codigoProducto AS codigoProducto, out.nombre AS nombre,
    out.categoria AS categoria, out.capacidadKw AS capacidadKw
FROM es_compatible
WHERE in.codigoProducto = $product_sku
ORDER BY capacidadKw ASC
"#;

const CABLE_SPECS: &str = r#"
SELECT especCableId, especificacion, aplicacion, longitudMaxima, tipo
FROM especificacion_cable
WHERE $term = NONE OR $term = NULL
    OR string::slug(tipo) CONTAINS string::slug($term)
    OR string::slug(aplicacion) CONTAINS string::slug($term)
ORDER BY tipo ASC
"#;

const FREQUENCY_RANKING: &str = r#"
SELECT in.codigoProducto AS codigoProducto, out.codigoError AS codigoError,
    out.descripcion AS descripcion, frecuencia
FROM tiene_error
WHERE frecuencia > 0
ORDER BY frecuencia DESC
LIMIT $limit
"#;

const CERTIFIED_INSTALLERS: &str = r#"
SELECT instaladorId, nombre, empresa, region, whatsapp, certificacionSamsung,
    ->certificado_para->producto.codigoProducto AS certificadoPara
FROM instalador
WHERE certificacionSamsung = true
    AND ($region = NONE OR $region = NULL OR string::slug(region) = string::slug($region))
ORDER BY region ASC
"#;

/// The validated template set.
#[derive(Debug, Clone)]
pub struct QueryTemplates {
    templates: HashMap<QueryKind, PatternQuery>,
}

impl QueryTemplates {
    /// The built-in SurrealQL templates.
    pub fn standard() -> Result<Self, TemplateError> {
        Self::from_patterns([
            PatternQuery::new(QueryKind::ErrorDetails, ERROR_DETAILS, &[param::ERROR_CODE]),
            PatternQuery::new(
                QueryKind::ProductAffinity,
                PRODUCT_AFFINITY,
                &[param::ERROR_CODE, param::PRODUCT_SKU],
            ),
            PatternQuery::new(
                QueryKind::CompatibleProducts,
                COMPATIBLE_PRODUCTS,
                &[param::PRODUCT_SKU],
            ),
            PatternQuery::new(QueryKind::CableSpecs, CABLE_SPECS, &[param::TERM]),
            PatternQuery::new(QueryKind::FrequencyRanking, FREQUENCY_RANKING, &[param::LIMIT]),
            PatternQuery::new(
                QueryKind::CertifiedInstallers,
                CERTIFIED_INSTALLERS,
                &[param::REGION],
            ),
        ])
    }

    /// Validate a full set of templates. Every kind must be covered.
    pub fn from_patterns(
        patterns: impl IntoIterator<Item = PatternQuery>,
    ) -> Result<Self, TemplateError> {
        let mut templates = HashMap::new();
        for pattern in patterns {
            validate(&pattern)?;
            templates.insert(pattern.kind(), pattern);
        }
        for kind in QueryKind::ALL {
            if !templates.contains_key(&kind) {
                return Err(TemplateError::Missing(kind));
            }
        }
        Ok(Self { templates })
    }

    /// The template for a kind. Always present once validated.
    pub fn get(&self, kind: QueryKind) -> Result<&PatternQuery, TemplateError> {
        self.templates.get(&kind).ok_or(TemplateError::Missing(kind))
    }
}

/// Built-in SurrealQL parameters that templates may use without declaring.
const BUILTIN_PARAMS: &[&str] = &["parent", "this", "value", "before", "after", "auth", "session"];

fn param_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("static pattern"))
}

fn mutation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(CREATE|UPDATE|UPSERT|DELETE|RELATE|INSERT|DEFINE|REMOVE)\b")
            .expect("static pattern")
    })
}

fn validate(pattern: &PatternQuery) -> Result<(), TemplateError> {
    let kind = pattern.kind();
    if pattern.text().trim().is_empty() {
        return Err(TemplateError::Empty(kind));
    }

    if let Some(m) = mutation_regex().find(pattern.text()) {
        return Err(TemplateError::Mutating {
            kind,
            keyword: m.as_str().to_uppercase(),
        });
    }

    let referenced: BTreeSet<&str> = param_regex()
        .captures_iter(pattern.text())
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .filter(|name| !BUILTIN_PARAMS.contains(name))
        .collect();
    let declared: BTreeSet<&str> = pattern.params().iter().map(String::as_str).collect();

    if let Some(name) = referenced.difference(&declared).next() {
        return Err(TemplateError::UndeclaredParameter {
            kind,
            name: name.to_string(),
        });
    }
    if let Some(name) = declared.difference(&referenced).next() {
        return Err(TemplateError::UnusedParameter {
            kind,
            name: name.to_string(),
        });
    }

    Ok(())
}
