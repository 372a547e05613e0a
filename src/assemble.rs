//! Result assembly: raw alias-keyed aggregates → comparison rows.
//!
//! Degradation rules: a missing alias is null; a ratio with a non-numeric
//! or zero denominator is null; a difference is computed only for
//! number-typed metrics with both sides numeric. Nothing in here errors —
//! bad values degrade to null.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::metric::ValueType;
use crate::plan::{AggregatePlan, Binding};

/// Raw aggregate results for one environment, keyed by alias.
pub type AliasValues = HashMap<String, Value>;

/// One metric's source/target values and delta.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    /// Token form of the metric, with canonical field casing.
    pub metric: String,
    pub alias: String,
    pub value_type: ValueType,
    pub source: Value,
    pub target: Value,
    /// Target minus source, only for number-typed metrics with both sides
    /// numeric.
    pub difference: Option<f64>,
}

/// Compute final metric values and deltas from both environments' raw
/// aggregate results.
pub fn assemble(plan: &AggregatePlan, source: &AliasValues, target: &AliasValues) -> Vec<ComparisonRow> {
    plan.bindings
        .iter()
        .map(|binding| {
            let source_value = resolve_value(&binding.binding, source);
            let target_value = resolve_value(&binding.binding, target);

            let difference = match binding.metric.value_type {
                ValueType::Number => match (as_number(&source_value), as_number(&target_value)) {
                    (Some(s), Some(t)) => Some(t - s),
                    _ => None,
                },
                // Dates are comparable for display but not subtracted.
                ValueType::Date => None,
            };

            ComparisonRow {
                metric: binding.metric.to_string(),
                alias: binding.binding.alias().to_string(),
                value_type: binding.metric.value_type,
                source: source_value,
                target: target_value,
                difference,
            }
        })
        .collect()
}

fn resolve_value(binding: &Binding, values: &AliasValues) -> Value {
    match binding {
        Binding::Direct { alias } => values.get(alias).cloned().unwrap_or(Value::Null),
        Binding::Ratio {
            numerator,
            denominator,
            ..
        } => {
            let num = values.get(numerator).and_then(as_number);
            let den = values.get(denominator).and_then(as_number);
            match (num, den) {
                (Some(n), Some(d)) if d != 0.0 => serde_json::Number::from_f64(n / d)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            }
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
}
