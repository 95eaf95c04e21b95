//! Default values for techgraph configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Backend Defaults
// ============================================================================

/// Default backend kind.
pub const DEFAULT_BACKEND_KIND: &str = "surreal";

/// Default SurrealDB connection string (embedded RocksDB store).
pub const DEFAULT_ENDPOINT: &str = "rocksdb://.techgraph/graph";

/// Default SurrealDB namespace.
pub const DEFAULT_NAMESPACE: &str = "techgraph";

/// Default SurrealDB database.
pub const DEFAULT_DATABASE: &str = "support";

/// Default number of concurrent backend sessions.
pub const DEFAULT_POOL_SIZE: usize = 8;

// ============================================================================
// Engine Defaults
// ============================================================================

/// Overall budget for one query, in milliseconds.
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 2_000;

/// Budget for a single backend fetch, in milliseconds.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 800;

/// Pause before retrying a failed fetch, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 50;

/// Retries after a transport failure. Never more than one.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Upper bound (and default) for frequency rankings.
pub const DEFAULT_FREQUENCY_LIMIT: usize = 10;

// ============================================================================
// Classifier Defaults
// ============================================================================

/// Error code tokens, e.g. `E458`.
pub const DEFAULT_ERROR_CODE_PATTERN: &str = r"(?i)\bE\d{3}\b";

/// Product SKU tokens, e.g. `AM080MXVAF`.
pub const DEFAULT_SKU_PATTERN: &str = r"(?i)\b[A-Z]{2}\d{3}[A-Z]{2}[A-Z0-9]{1,6}\b";

/// Words that, next to a SKU, ask which units it works with.
pub const DEFAULT_COMPATIBILITY_KEYWORDS: &[&str] = &[
    "compatible",
    "compatibilidad",
    "compatibility",
    "acepta",
    "accepts",
    "conectar",
    "connect",
    "combinar",
    "unidades interiores",
    "indoor units",
];

/// Words that ask for cable or wiring specifications.
pub const DEFAULT_SPEC_KEYWORDS: &[&str] = &[
    "cable",
    "cableado",
    "wiring",
    "wire",
    "especificacion",
    "spec",
    "calibre",
    "awg",
    "mm2",
];

/// Cable types/applications usable as a spec lookup filter.
pub const DEFAULT_SPEC_TERMS: &[&str] = &[
    "comunicacion",
    "communication",
    "alimentacion",
    "power",
    "control",
    "apantallado",
    "shielded",
];

/// Words that ask for a ranking of frequent errors.
pub const DEFAULT_FREQUENCY_KEYWORDS: &[&str] = &[
    "frecuente",
    "frequent",
    "mas comun",
    "most common",
    "common error",
    "ranking",
    "top",
];

/// Words that ask for installers.
pub const DEFAULT_INSTALLER_KEYWORDS: &[&str] = &[
    "instalador",
    "installer",
    "tecnico",
    "technician",
];

/// Regions recognised in installer questions.
pub const DEFAULT_REGIONS: &[&str] = &[
    "Arica",
    "Antofagasta",
    "Atacama",
    "Coquimbo",
    "Valparaíso",
    "Santiago",
    "O'Higgins",
    "Maule",
    "Ñuble",
    "Concepción",
    "Biobío",
    "Araucanía",
    "Los Ríos",
    "Los Lagos",
    "Aysén",
    "Magallanes",
];

// ============================================================================
// Server Defaults
// ============================================================================

/// Default HTTP bind host.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default HTTP port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

// ============================================================================
// Config File Locations
// ============================================================================

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = "techgraph.toml";

/// Directory name under the user config dir.
pub const USER_CONFIG_DIR: &str = "techgraph";
