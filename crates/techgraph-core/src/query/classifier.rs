//! Query classification.
//!
//! Free text is matched against an ordered rule table; the first rule whose
//! trigger fires decides the intent. Error code tokens come first, so a text
//! that names an error code is always an error diagnosis, whatever else it
//! asks. A SKU alone only means a compatibility lookup when no other keyword
//! rule claims the text.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ClassifierConfig, ConfigError};
use crate::graph::{fold, slug};

/// Raw input to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryInput {
    /// Free-form text, e.g. "Error E458 en mi equipo AM080MXVAF".
    Text(String),
    /// Typed request with explicit identifiers.
    Structured(StructuredQuery),
}

impl From<&str> for QueryInput {
    fn from(text: &str) -> Self {
        QueryInput::Text(text.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(text: String) -> Self {
        QueryInput::Text(text)
    }
}

impl From<StructuredQuery> for QueryInput {
    fn from(query: StructuredQuery) -> Self {
        QueryInput::Structured(query)
    }
}

/// Typed request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_sku: Option<String>,
    /// Region for installer lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl StructuredQuery {
    pub fn error(code: impl Into<String>) -> Self {
        Self {
            error_code: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn product(sku: impl Into<String>) -> Self {
        Self {
            product_sku: Some(sku.into()),
            ..Default::default()
        }
    }

    pub fn with_product(mut self, sku: impl Into<String>) -> Self {
        self.product_sku = Some(sku.into());
        self
    }
}

/// Intent discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    ErrorDiagnosis,
    CompatibilityLookup,
    SpecLookup,
    FrequencyRanking,
    InstallerLookup,
    Unrecognized,
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntentKind::ErrorDiagnosis => "ERROR_DIAGNOSIS",
            IntentKind::CompatibilityLookup => "COMPATIBILITY_LOOKUP",
            IntentKind::SpecLookup => "SPEC_LOOKUP",
            IntentKind::FrequencyRanking => "FREQUENCY_RANKING",
            IntentKind::InstallerLookup => "INSTALLER_LOOKUP",
            IntentKind::Unrecognized => "UNRECOGNIZED",
        };
        f.write_str(name)
    }
}

/// A classified request with its extracted identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ErrorDiagnosis {
        error_code: String,
        product_sku: Option<String>,
    },
    CompatibilityLookup {
        product_sku: String,
    },
    SpecLookup {
        term: Option<String>,
    },
    FrequencyRanking {
        limit: Option<usize>,
    },
    InstallerLookup {
        region: Option<String>,
    },
    Unrecognized,
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::ErrorDiagnosis { .. } => IntentKind::ErrorDiagnosis,
            Intent::CompatibilityLookup { .. } => IntentKind::CompatibilityLookup,
            Intent::SpecLookup { .. } => IntentKind::SpecLookup,
            Intent::FrequencyRanking { .. } => IntentKind::FrequencyRanking,
            Intent::InstallerLookup { .. } => IntentKind::InstallerLookup,
            Intent::Unrecognized => IntentKind::Unrecognized,
        }
    }
}

/// What makes a rule fire.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// An error code token is present.
    ErrorCodeToken,
    /// A product SKU token is present.
    SkuToken,
    /// A product SKU token and one of the keywords are both present.
    SkuWithKeywords(Vec<String>),
    /// Any of the keywords appears at a word start (accent-insensitive).
    Keywords(Vec<String>),
}

/// One row of the rule table.
#[derive(Debug, Clone)]
pub struct Rule {
    pub trigger: Trigger,
    pub intent: IntentKind,
}

/// Tokens and words extracted from a text once, shared by all rules.
struct Signals {
    error_code: Option<String>,
    sku: Option<String>,
    /// Folded words joined by single spaces, padded on both sides.
    words: String,
}

impl Signals {
    fn has_keyword(&self, keywords: &[String]) -> bool {
        keywords.iter().any(|k| self.has_word(k))
    }

    fn has_word(&self, keyword: &str) -> bool {
        self.words.contains(&format!(" {keyword}"))
    }
}

/// Deterministic rule-table classifier.
pub struct QueryClassifier {
    error_code: Regex,
    sku: Regex,
    top_n: Regex,
    spec_terms: Vec<String>,
    /// Folded region name paired with the configured spelling.
    regions: Vec<(String, String)>,
    rules: Vec<Rule>,
}

impl QueryClassifier {
    /// Build the classifier and its rule table from configuration.
    ///
    /// Rule order: error code, SKU with compatibility keywords, spec
    /// keywords, installer keywords, frequency keywords, bare SKU.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        let compile = |name: &str, pattern: &str| {
            Regex::new(pattern).map_err(|e| ConfigError::Invalid(format!("{name}: {e}")))
        };
        let fold_all = |words: &[String]| -> Vec<String> {
            words
                .iter()
                .map(|w| fold(w).trim().to_string())
                .filter(|w| !w.is_empty())
                .collect()
        };

        let rules = vec![
            Rule {
                trigger: Trigger::ErrorCodeToken,
                intent: IntentKind::ErrorDiagnosis,
            },
            Rule {
                trigger: Trigger::SkuWithKeywords(fold_all(&config.compatibility_keywords)),
                intent: IntentKind::CompatibilityLookup,
            },
            Rule {
                trigger: Trigger::Keywords(fold_all(&config.spec_keywords)),
                intent: IntentKind::SpecLookup,
            },
            Rule {
                trigger: Trigger::Keywords(fold_all(&config.installer_keywords)),
                intent: IntentKind::InstallerLookup,
            },
            Rule {
                trigger: Trigger::Keywords(fold_all(&config.frequency_keywords)),
                intent: IntentKind::FrequencyRanking,
            },
            Rule {
                trigger: Trigger::SkuToken,
                intent: IntentKind::CompatibilityLookup,
            },
        ];
        let regions = config
            .regions
            .iter()
            .map(|r| (slug(r).replace('-', " "), r.trim().to_string()))
            .filter(|(folded, _)| !folded.is_empty())
            .collect();

        Ok(Self {
            error_code: compile("classifier.error_code_pattern", &config.error_code_pattern)?,
            sku: compile("classifier.sku_pattern", &config.sku_pattern)?,
            top_n: compile("top_n", r"\btop\s*(\d{1,3})\b")?,
            spec_terms: fold_all(&config.spec_terms),
            regions,
            rules,
        })
    }

    /// The rule table, in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify a raw input.
    pub fn classify(&self, input: &QueryInput) -> Intent {
        match input {
            QueryInput::Text(text) => self.classify_text(text),
            QueryInput::Structured(query) => self.classify_structured(query),
        }
    }

    fn classify_structured(&self, query: &StructuredQuery) -> Intent {
        let normalize = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_uppercase)
        };
        let error_code = normalize(&query.error_code);
        let product_sku = normalize(&query.product_sku);
        let region = query
            .region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        match (error_code, product_sku, region) {
            (Some(error_code), product_sku, _) => Intent::ErrorDiagnosis {
                error_code,
                product_sku,
            },
            (None, Some(product_sku), _) => Intent::CompatibilityLookup { product_sku },
            (None, None, Some(region)) => Intent::InstallerLookup {
                region: Some(region),
            },
            (None, None, None) => Intent::Unrecognized,
        }
    }

    fn classify_text(&self, text: &str) -> Intent {
        if text.trim().is_empty() {
            return Intent::Unrecognized;
        }

        let signals = self.signals(text);
        for rule in &self.rules {
            let fired = match &rule.trigger {
                Trigger::ErrorCodeToken => signals.error_code.is_some(),
                Trigger::SkuToken => signals.sku.is_some(),
                Trigger::SkuWithKeywords(keywords) => {
                    signals.sku.is_some() && signals.has_keyword(keywords)
                }
                Trigger::Keywords(keywords) => signals.has_keyword(keywords),
            };
            if fired {
                return self.build(rule.intent, &signals);
            }
        }

        Intent::Unrecognized
    }

    fn signals(&self, text: &str) -> Signals {
        let token = |re: &Regex| re.find(text).map(|m| m.as_str().to_uppercase());
        let folded = fold(text);
        let words: Vec<&str> = folded
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        Signals {
            error_code: token(&self.error_code),
            sku: token(&self.sku),
            words: format!(" {} ", words.join(" ")),
        }
    }

    fn build(&self, kind: IntentKind, signals: &Signals) -> Intent {
        match kind {
            IntentKind::ErrorDiagnosis => match &signals.error_code {
                Some(code) => Intent::ErrorDiagnosis {
                    error_code: code.clone(),
                    product_sku: signals.sku.clone(),
                },
                None => Intent::Unrecognized,
            },
            IntentKind::CompatibilityLookup => match &signals.sku {
                Some(sku) => Intent::CompatibilityLookup {
                    product_sku: sku.clone(),
                },
                None => Intent::Unrecognized,
            },
            IntentKind::SpecLookup => Intent::SpecLookup {
                term: self
                    .spec_terms
                    .iter()
                    .find(|t| signals.has_word(t))
                    .cloned(),
            },
            IntentKind::FrequencyRanking => Intent::FrequencyRanking {
                limit: self
                    .top_n
                    .captures(&signals.words)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse().ok()),
            },
            IntentKind::InstallerLookup => Intent::InstallerLookup {
                region: self
                    .regions
                    .iter()
                    .find(|(folded, _)| signals.has_word(folded))
                    .map(|(_, name)| name.clone()),
            },
            IntentKind::Unrecognized => Intent::Unrecognized,
        }
    }
}
