//! Metric language: grammar, schema validation, cross-environment
//! reconciliation.
//!
//! A metric arrives as a raw token such as `sum:Amount` or
//! `ratio:sum:Amount/avg:Amount`, is parsed into a [`ParsedMetric`],
//! validated against each environment's schema into a [`ResolvedMetric`],
//! and the two environments' resolved sets are reconciled for structural
//! equivalence before anything is compiled or compared.

pub mod ast;
pub mod error;
pub mod reconcile;
pub mod resolve;

pub use ast::{parse, AggregateFunction, AggregateLeg, ParsedMetric};
pub use error::{MetricError, MetricResult};
pub use reconcile::reconcile;
pub use resolve::{validate, ResolvedField, ResolvedKind, ResolvedLeg, ResolvedMetric, ValueType};
