//! The aggregate expression compiler.
//!
//! Takes a reconciled metric set and emits the minimal set of query
//! strings: one shared base query for everything that can be computed as
//! columns of a single aggregate query (with identical sub-expressions
//! deduplicated), plus one standalone query per conditional metric.

use std::collections::HashMap;

use tracing::debug;

use super::alias::{sanitize, AliasAllocator};
use super::condition::normalize_condition;
use super::{
    AggregateExpression, AggregatePlan, Binding, ConditionalQuery, MetricBinding, PlanError,
    PlanResult,
};
use crate::metric::{ResolvedKind, ResolvedLeg, ResolvedMetric, ValueType};

/// Compile a reconciled metric set into an [`AggregatePlan`].
///
/// `base_filter` applies to the shared query, every conditional query
/// (ANDed with the metric's own condition), and the sample query. It is
/// trimmed; empty means no filter.
pub fn compile(
    object: &str,
    metrics: &[ResolvedMetric],
    base_filter: Option<&str>,
) -> PlanResult<AggregatePlan> {
    if metrics.is_empty() {
        return Err(PlanError::NoMetrics);
    }

    let base_filter = base_filter
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string);

    let mut builder = PlanBuilder::new(object, base_filter);
    for metric in metrics {
        builder.add(metric);
    }

    let plan = builder.finish();
    debug!(
        object,
        shared = plan.expressions.len(),
        conditional = plan.conditional.len(),
        "compiled aggregate plan"
    );
    Ok(plan)
}

/// Scoped builder threading the alias collision sets through compilation.
struct PlanBuilder {
    object: String,
    base_filter: Option<String>,
    expressions: Vec<AggregateExpression>,
    /// Syntactic signature (the expression text) → alias.
    dedup: HashMap<String, String>,
    expression_aliases: AliasAllocator,
    binding_aliases: AliasAllocator,
    conditional_aliases: AliasAllocator,
    bindings: Vec<MetricBinding>,
    conditional: Vec<ConditionalQuery>,
    sample_fields: Vec<String>,
}

impl PlanBuilder {
    fn new(object: &str, base_filter: Option<String>) -> Self {
        Self {
            object: object.to_string(),
            base_filter,
            expressions: Vec::new(),
            dedup: HashMap::new(),
            expression_aliases: AliasAllocator::new(),
            binding_aliases: AliasAllocator::new(),
            conditional_aliases: AliasAllocator::new(),
            bindings: Vec::new(),
            conditional: Vec::new(),
            sample_fields: Vec::new(),
        }
    }

    fn add(&mut self, metric: &ResolvedMetric) {
        match &metric.kind {
            ResolvedKind::Count => {
                let alias =
                    self.shared_expression("COUNT(Id)", "count__all", ValueType::Number);
                self.bind_direct(metric, alias);
            }

            ResolvedKind::FieldAggregate { function, field } => {
                let expression = format!("{}({})", function.as_sql(), field.name);
                let base = format!("{}__{}", function.as_str(), sanitize(&field.name));
                let alias = self.shared_expression(&expression, &base, metric.value_type);
                self.bind_direct(metric, alias);
                self.sample_field(&field.name);
            }

            ResolvedKind::CountDistinct { field } => {
                let expression = format!("COUNT_DISTINCT({})", field.name);
                let base = format!("count_distinct__{}", sanitize(&field.name));
                let alias = self.shared_expression(&expression, &base, ValueType::Number);
                self.bind_direct(metric, alias);
                self.sample_field(&field.name);
            }

            ResolvedKind::Ratio {
                numerator,
                denominator,
            } => {
                let num_alias = self.shared_leg(numerator);
                let den_alias = self.shared_leg(denominator);
                let base = format!(
                    "ratio__{}_{}__{}_{}",
                    numerator.function.as_str(),
                    sanitize(&numerator.field.name),
                    denominator.function.as_str(),
                    sanitize(&denominator.field.name)
                );
                let alias = self
                    .binding_aliases
                    .allocate_avoiding(&base, &self.expression_aliases);
                self.bindings.push(MetricBinding {
                    metric: metric.clone(),
                    binding: Binding::Ratio {
                        alias,
                        numerator: num_alias,
                        denominator: den_alias,
                    },
                });
                self.sample_field(&numerator.field.name);
                self.sample_field(&denominator.field.name);
            }

            ResolvedKind::CountIf { condition } => {
                let alias = self.conditional_query("COUNT(Id)", "count_if", condition);
                self.bind_direct(metric, alias);
            }

            ResolvedKind::SumIf { field, condition } => {
                let expression = format!("SUM({})", field.name);
                let base = format!("sum_if__{}", sanitize(&field.name));
                let alias = self.conditional_query(&expression, &base, condition);
                self.bind_direct(metric, alias);
                self.sample_field(&field.name);
            }
        }
    }

    /// Reuse or emit a shared aggregate expression, returning its alias.
    fn shared_expression(
        &mut self,
        expression: &str,
        alias_base: &str,
        value_type: ValueType,
    ) -> String {
        if let Some(alias) = self.dedup.get(expression) {
            return alias.clone();
        }
        let alias = self.expression_aliases.allocate(alias_base);
        self.expressions.push(AggregateExpression {
            expression: expression.to_string(),
            alias: alias.clone(),
            value_type,
        });
        self.dedup.insert(expression.to_string(), alias.clone());
        alias
    }

    fn shared_leg(&mut self, leg: &ResolvedLeg) -> String {
        let expression = format!("{}({})", leg.function.as_sql(), leg.field.name);
        let base = format!("{}__{}", leg.function.as_str(), sanitize(&leg.field.name));
        let value_type = leg_value_type(leg);
        self.shared_expression(&expression, &base, value_type)
    }

    /// Emit a standalone conditional query, returning its alias.
    fn conditional_query(&mut self, expression: &str, alias_base: &str, condition: &str) -> String {
        let alias = self.conditional_aliases.allocate(alias_base);
        let normalized = normalize_condition(condition);
        let filter = match &self.base_filter {
            Some(base) => format!("({}) AND ({})", base, normalized),
            None => normalized,
        };
        let query = format!(
            "SELECT {} {} FROM {} WHERE {}",
            expression, alias, self.object, filter
        );
        self.conditional.push(ConditionalQuery {
            alias: alias.clone(),
            expression: expression.to_string(),
            filter,
            query,
        });
        alias
    }

    fn bind_direct(&mut self, metric: &ResolvedMetric, alias: String) {
        self.bindings.push(MetricBinding {
            metric: metric.clone(),
            binding: Binding::Direct { alias },
        });
    }

    fn sample_field(&mut self, name: &str) {
        if !self
            .sample_fields
            .iter()
            .any(|f| f.eq_ignore_ascii_case(name))
        {
            self.sample_fields.push(name.to_string());
        }
    }

    fn finish(self) -> AggregatePlan {
        let base_query = if self.expressions.is_empty() {
            None
        } else {
            let select = self
                .expressions
                .iter()
                .map(|e| format!("{} {}", e.expression, e.alias))
                .collect::<Vec<_>>()
                .join(", ");
            let mut query = format!("SELECT {} FROM {}", select, self.object);
            if let Some(filter) = &self.base_filter {
                query.push_str(" WHERE ");
                query.push_str(filter);
            }
            Some(query)
        };

        AggregatePlan {
            object: self.object,
            base_filter: self.base_filter,
            base_query,
            expressions: self.expressions,
            bindings: self.bindings,
            conditional: self.conditional,
            sample_fields: self.sample_fields,
        }
    }
}

fn leg_value_type(leg: &ResolvedLeg) -> ValueType {
    let date_like = !leg.function.numeric_only() && leg.field.field_type.is_date_like();
    if date_like {
        ValueType::Date
    } else {
        ValueType::Number
    }
}
