//! From raw input to graph rows.
//!
//! A request flows through three stages:
//!
//! 1. [`QueryClassifier`] maps raw text or a structured request to an [`Intent`]
//! 2. [`QueryPlanner`] turns the intent into independent [`Fetch`]es
//! 3. [`QueryExecutor`] runs the fetches through the backend pool
//!
//! Query text lives in [`QueryTemplates`] and is validated once at startup.

mod classifier;
mod executor;
mod planner;
mod templates;

pub use classifier::{
    Intent, IntentKind, QueryClassifier, QueryInput, Rule, StructuredQuery, Trigger,
};
pub use executor::{ExecutionPolicy, FetchResult, PlanResult, QueryExecutor};
pub use planner::{Fetch, QueryPlan, QueryPlanner};
pub use templates::{QueryTemplates, TemplateError};
