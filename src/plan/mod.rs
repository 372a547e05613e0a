//! Aggregate query plan types.
//!
//! An [`AggregatePlan`] is built once per invocation by
//! [`compile`](compile::compile), consumed immediately by the query
//! executor, and never mutated after build.

pub mod alias;
pub mod compile;
pub mod condition;

pub use alias::AliasAllocator;
pub use compile::compile;
pub use condition::normalize_condition;

use serde::Serialize;

use crate::metric::{ResolvedMetric, ValueType};

/// Error type for plan compilation.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The parser defaults an empty token list to `count`, so this only
    /// fires when the library API is called with an empty slice.
    #[error("At least one metric is required")]
    NoMetrics,
}

/// Result type for plan compilation.
pub type PlanResult<T> = Result<T, PlanError>;

/// One executable aggregate sub-query fragment with its result alias.
///
/// Metrics requesting identical fragments share one expression; the dedup
/// key is the syntactic signature of the aggregate call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateExpression {
    /// e.g. `SUM(Amount)`.
    pub expression: String,
    /// Unique within the shared-expression namespace.
    pub alias: String,
    pub value_type: ValueType,
}

/// How a metric's value is read back out of the raw results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Binding {
    /// One metric, one alias.
    Direct { alias: String },
    /// Value computed post-hoc as numerator / denominator.
    Ratio {
        alias: String,
        numerator: String,
        denominator: String,
    },
}

impl Binding {
    /// The alias identifying this metric in output rows.
    pub fn alias(&self) -> &str {
        match self {
            Binding::Direct { alias } => alias,
            Binding::Ratio { alias, .. } => alias,
        }
    }
}

/// The compiled link between a resolved metric and its result alias(es).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricBinding {
    pub metric: ResolvedMetric,
    pub binding: Binding,
}

/// A standalone query for a `count-if`/`sum-if` metric.
///
/// Conditional metrics cannot share the base query: one query has one WHERE
/// clause, and merging differing predicates would over- or under-filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalQuery {
    /// Unique within the conditional-alias namespace.
    pub alias: String,
    /// `COUNT(Id)` or `SUM(field)`.
    pub expression: String,
    /// Base filter ANDed with the metric's own (normalized) condition.
    pub filter: String,
    /// Full executable query string.
    pub query: String,
}

/// The compiled output of the metric compiler.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatePlan {
    pub object: String,
    /// Normalized base filter, if any.
    pub base_filter: Option<String>,
    /// Shared base query; absent when every metric is conditional.
    pub base_query: Option<String>,
    /// Deduplicated shared expressions, in first-use order.
    pub expressions: Vec<AggregateExpression>,
    /// One binding per input metric, in input order.
    pub bindings: Vec<MetricBinding>,
    /// Standalone conditional queries, in input order.
    pub conditional: Vec<ConditionalQuery>,
    /// Ordered, deduplicated field names referenced by any metric.
    pub sample_fields: Vec<String>,
}

impl AggregatePlan {
    /// Build the row-sampling query: `SELECT Id, <fields> FROM <object>
    /// [WHERE <base>] ORDER BY Id LIMIT <n>`.
    pub fn sample_query(&self, limit: usize) -> String {
        let mut select = vec!["Id".to_string()];
        for field in &self.sample_fields {
            if !field.eq_ignore_ascii_case("Id") {
                select.push(field.clone());
            }
        }

        let mut query = format!("SELECT {} FROM {}", select.join(", "), self.object);
        if let Some(filter) = &self.base_filter {
            query.push_str(" WHERE ");
            query.push_str(filter);
        }
        query.push_str(&format!(" ORDER BY Id LIMIT {}", limit));
        query
    }

    /// All aggregate queries to run against one environment, in order:
    /// the shared base query (if any), then each conditional query.
    pub fn aggregate_queries(&self) -> Vec<&str> {
        let mut queries = Vec::new();
        if let Some(base) = &self.base_query {
            queries.push(base.as_str());
        }
        for cond in &self.conditional {
            queries.push(cond.query.as_str());
        }
        queries
    }
}
