//! Schema validation of parsed metrics.
//!
//! Pure: the caller supplies an already-fetched [`ObjectSchema`] snapshot,
//! and runs this once per environment. There is deliberately no notion of
//! "two environments" here; see [`super::reconcile`].

use serde::Serialize;

use super::ast::{AggregateFunction, AggregateLeg, ParsedMetric};
use super::error::{MetricError, MetricResult};
use crate::schema::{FieldMetadata, FieldType, ObjectSchema};

/// The type of a metric's computed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    Date,
}

/// A field reference resolved against a schema: canonical name, label, type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedField {
    pub name: String,
    pub label: Option<String>,
    pub field_type: FieldType,
}

impl ResolvedField {
    fn from_metadata(meta: &FieldMetadata) -> Self {
        Self {
            name: meta.name.clone(),
            label: meta.label.clone(),
            field_type: meta.field_type,
        }
    }
}

/// A resolved ratio leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLeg {
    pub function: AggregateFunction,
    pub field: ResolvedField,
}

/// Kind of a resolved metric, mirroring [`ParsedMetric`] with field
/// references replaced by resolved metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ResolvedKind {
    Count,
    FieldAggregate {
        function: AggregateFunction,
        field: ResolvedField,
    },
    CountDistinct {
        field: ResolvedField,
    },
    Ratio {
        numerator: ResolvedLeg,
        denominator: ResolvedLeg,
    },
    CountIf {
        condition: String,
    },
    SumIf {
        field: ResolvedField,
        condition: String,
    },
}

/// A metric whose field references have been checked against a schema and
/// annotated with concrete types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMetric {
    #[serde(flatten)]
    pub kind: ResolvedKind,
    pub value_type: ValueType,
}

impl ResolvedMetric {
    /// Short kind name, matching [`ParsedMetric::kind_name`].
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ResolvedKind::Count => "count",
            ResolvedKind::FieldAggregate { .. } => "field-aggregate",
            ResolvedKind::CountDistinct { .. } => "count-distinct",
            ResolvedKind::Ratio { .. } => "ratio",
            ResolvedKind::CountIf { .. } => "count-if",
            ResolvedKind::SumIf { .. } => "sum-if",
        }
    }
}

impl std::fmt::Display for ResolvedMetric {
    /// Token form with canonical field casing, used as the row label in
    /// comparison output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ResolvedKind::Count => f.write_str("count"),
            ResolvedKind::FieldAggregate { function, field } => {
                write!(f, "{}:{}", function, field.name)
            }
            ResolvedKind::CountDistinct { field } => write!(f, "count-distinct:{}", field.name),
            ResolvedKind::Ratio {
                numerator,
                denominator,
            } => write!(
                f,
                "ratio:{}:{}/{}:{}",
                numerator.function,
                numerator.field.name,
                denominator.function,
                denominator.field.name
            ),
            ResolvedKind::CountIf { condition } => write!(f, "count-if:{}", condition),
            ResolvedKind::SumIf { field, condition } => {
                write!(f, "sum-if:{}:{}", field.name, condition)
            }
        }
    }
}

/// Validate parsed metrics against one environment's schema snapshot.
///
/// Fails on the first metric that references a missing field, a
/// non-aggregatable field, or a field whose type fails the kind-specific
/// gate.
pub fn validate(
    metrics: &[ParsedMetric],
    schema: &ObjectSchema,
    environment: &str,
) -> MetricResult<Vec<ResolvedMetric>> {
    metrics
        .iter()
        .map(|m| resolve_metric(m, schema, environment))
        .collect()
}

fn resolve_metric(
    metric: &ParsedMetric,
    schema: &ObjectSchema,
    environment: &str,
) -> MetricResult<ResolvedMetric> {
    match metric {
        ParsedMetric::Count => Ok(ResolvedMetric {
            kind: ResolvedKind::Count,
            value_type: ValueType::Number,
        }),

        ParsedMetric::FieldAggregate { function, field } => {
            let meta = lookup(schema, field, environment)?;
            gate_function(metric, *function, meta, environment)?;
            let value_type = if meta.field_type.is_date_like() {
                // Only reachable for min/max; other functions reject
                // date-like fields above.
                ValueType::Date
            } else {
                ValueType::Number
            };
            Ok(ResolvedMetric {
                kind: ResolvedKind::FieldAggregate {
                    function: *function,
                    field: ResolvedField::from_metadata(meta),
                },
                value_type,
            })
        }

        ParsedMetric::CountDistinct { field } => {
            let meta = lookup(schema, field, environment)?;
            Ok(ResolvedMetric {
                kind: ResolvedKind::CountDistinct {
                    field: ResolvedField::from_metadata(meta),
                },
                value_type: ValueType::Number,
            })
        }

        ParsedMetric::Ratio {
            numerator,
            denominator,
        } => {
            let numerator = resolve_leg(metric, numerator, schema, environment)?;
            let denominator = resolve_leg(metric, denominator, schema, environment)?;
            Ok(ResolvedMetric {
                kind: ResolvedKind::Ratio {
                    numerator,
                    denominator,
                },
                value_type: ValueType::Number,
            })
        }

        ParsedMetric::CountIf { condition } => Ok(ResolvedMetric {
            kind: ResolvedKind::CountIf {
                condition: condition.clone(),
            },
            value_type: ValueType::Number,
        }),

        ParsedMetric::SumIf { field, condition } => {
            let meta = lookup(schema, field, environment)?;
            if !meta.field_type.is_numeric() {
                return Err(unsupported(metric, meta, "numeric", environment));
            }
            Ok(ResolvedMetric {
                kind: ResolvedKind::SumIf {
                    field: ResolvedField::from_metadata(meta),
                    condition: condition.clone(),
                },
                value_type: ValueType::Number,
            })
        }
    }
}

fn resolve_leg(
    metric: &ParsedMetric,
    leg: &AggregateLeg,
    schema: &ObjectSchema,
    environment: &str,
) -> MetricResult<ResolvedLeg> {
    let meta = lookup(schema, &leg.field, environment)?;
    gate_function(metric, leg.function, meta, environment)?;
    Ok(ResolvedLeg {
        function: leg.function,
        field: ResolvedField::from_metadata(meta),
    })
}

fn lookup<'s>(
    schema: &'s ObjectSchema,
    field: &str,
    environment: &str,
) -> MetricResult<&'s FieldMetadata> {
    let meta = schema
        .field(field)
        .ok_or_else(|| MetricError::FieldNotFound {
            object: schema.name.clone(),
            field: field.to_string(),
            environment: environment.to_string(),
        })?;
    if !meta.aggregatable {
        return Err(MetricError::NonAggregatableField {
            object: schema.name.clone(),
            field: meta.name.clone(),
            environment: environment.to_string(),
        });
    }
    Ok(meta)
}

fn gate_function(
    metric: &ParsedMetric,
    function: AggregateFunction,
    meta: &FieldMetadata,
    environment: &str,
) -> MetricResult<()> {
    if function.numeric_only() {
        if !meta.field_type.is_numeric() {
            return Err(unsupported(metric, meta, "numeric", environment));
        }
    } else if !meta.field_type.is_numeric() && !meta.field_type.is_date_like() {
        return Err(unsupported(metric, meta, "numeric or date", environment));
    }
    Ok(())
}

fn unsupported(
    metric: &ParsedMetric,
    meta: &FieldMetadata,
    required: &str,
    environment: &str,
) -> MetricError {
    MetricError::UnsupportedFieldType {
        field: meta.name.clone(),
        field_type: meta.field_type.to_string(),
        metric: metric.to_string(),
        required: required.to_string(),
        environment: environment.to_string(),
    }
}
