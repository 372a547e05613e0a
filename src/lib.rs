//! # orgdiff
//!
//! Reconcile aggregate business metrics for one object across two org
//! connections, without transferring full datasets.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Metric tokens ("count", "sum:Amount", ...)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metric::parse]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  ParsedMetric AST                        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metric::validate, per environment]
//! ┌─────────────────────────────────────────────────────────┐
//! │       ResolvedMetric (×2) + metric::reconcile            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [plan::compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │   AggregatePlan (shared query + conditional queries)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [exec::QueryExecutor, external transport]
//! ┌─────────────────────────────────────────────────────────┐
//! │        assemble → ComparisonRow[] → report               │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod assemble;
pub mod cache;
pub mod compare;
pub mod config;
pub mod exec;
pub mod metric;
pub mod plan;
pub mod report;
pub mod schema;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::assemble::{assemble, AliasValues, ComparisonRow};
    pub use crate::compare::{
        run_comparison, CompareError, CompareOptions, CompareOutcome, CompareResult, Environment,
    };
    pub use crate::metric::{
        parse, reconcile, validate, AggregateFunction, MetricError, ParsedMetric, ResolvedMetric,
        ValueType,
    };
    pub use crate::plan::{compile, AggregatePlan, Binding, MetricBinding, PlanError};
    pub use crate::schema::{FieldMetadata, FieldType, ObjectSchema, SchemaProvider};
}

// Also export the pipeline entry points at crate root for convenience
pub use assemble::assemble;
pub use compare::run_comparison;
pub use metric::{parse, reconcile, validate};
pub use plan::compile;
