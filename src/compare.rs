//! End-to-end comparison orchestration.
//!
//! ```text
//! tokens → parse → validate (×2, concurrently) → reconcile → compile
//!        → execute (×2, concurrently; sequential within one environment)
//!        → assemble
//! ```
//!
//! The two environments share no mutable state; each is validated against
//! its own describe snapshot and queried over its own connection.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info};

use crate::assemble::{assemble, AliasValues, ComparisonRow};
use crate::exec::{ExecutorError, QueryExecutor};
use crate::metric::{self, MetricError};
use crate::plan::{self, AggregatePlan, PlanError};
use crate::schema::{SchemaError, SchemaProvider};

/// Errors surfaced by a comparison run. All core-side variants are
/// terminal; transport errors pass through unmodified.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error(transparent)]
    Metric(#[from] MetricError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Schema discovery failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("Query execution failed: {0}")]
    Executor(#[from] ExecutorError),
}

pub type CompareResult<T> = Result<T, CompareError>;

/// What to compare.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Object API name.
    pub object: String,
    /// Raw metric tokens; empty defaults to a single `count`.
    pub metrics: Vec<String>,
    /// Optional base filter applied to every query.
    pub filter: Option<String>,
    /// Number of rows to sample per environment, if any.
    pub sample: Option<usize>,
}

/// One environment: a label for diagnostics plus its two collaborators.
pub struct Environment<'a> {
    pub label: &'a str,
    pub schema: &'a dyn SchemaProvider,
    pub executor: &'a dyn QueryExecutor,
}

/// Everything a comparison run produces.
#[derive(Debug)]
pub struct CompareOutcome {
    pub plan: AggregatePlan,
    pub rows: Vec<ComparisonRow>,
    pub source_samples: Option<Vec<serde_json::Map<String, Value>>>,
    pub target_samples: Option<Vec<serde_json::Map<String, Value>>>,
}

/// Run the full comparison pipeline.
pub async fn run_comparison(
    options: &CompareOptions,
    source: &Environment<'_>,
    target: &Environment<'_>,
) -> CompareResult<CompareOutcome> {
    let parsed = metric::parse(&options.metrics)?;
    debug!(count = parsed.len(), object = %options.object, "parsed metrics");

    let (source_schema, target_schema) = futures::join!(
        source.schema.describe_object(&options.object),
        target.schema.describe_object(&options.object)
    );
    let source_resolved = metric::validate(&parsed, &source_schema?, source.label)?;
    let target_resolved = metric::validate(&parsed, &target_schema?, target.label)?;

    let reconciled = metric::reconcile(&source_resolved, &target_resolved)?;

    let plan = plan::compile(&options.object, &reconciled, options.filter.as_deref())?;
    info!(
        object = %options.object,
        queries = plan.aggregate_queries().len(),
        "executing aggregate plan"
    );

    let (source_values, target_values) = futures::join!(
        run_plan_queries(&plan, source),
        run_plan_queries(&plan, target)
    );
    let (source_values, target_values) = (source_values?, target_values?);

    let (source_samples, target_samples) = match options.sample {
        Some(limit) => {
            let query = plan.sample_query(limit);
            debug!(%query, "running sample query");
            let (s, t) = futures::join!(
                source.executor.run_sample_query(&query),
                target.executor.run_sample_query(&query)
            );
            (Some(s?), Some(t?))
        }
        None => (None, None),
    };

    let rows = assemble(&plan, &source_values, &target_values);

    Ok(CompareOutcome {
        plan,
        rows,
        source_samples,
        target_samples,
    })
}

/// Run the shared query then each conditional query, sequentially — one
/// logical connection per environment — merging alias-keyed results.
async fn run_plan_queries(
    plan: &AggregatePlan,
    env: &Environment<'_>,
) -> CompareResult<AliasValues> {
    let mut values: HashMap<String, Value> = HashMap::new();

    if let Some(base) = &plan.base_query {
        debug!(environment = env.label, query = %base, "running shared query");
        values.extend(env.executor.run_aggregate_query(base).await?);
    }

    for cond in &plan.conditional {
        debug!(environment = env.label, query = %cond.query, "running conditional query");
        values.extend(env.executor.run_aggregate_query(&cond.query).await?);
    }

    Ok(values)
}
