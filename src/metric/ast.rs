//! Metric grammar and AST.
//!
//! Grammar (keywords case-insensitive, field and condition text preserved):
//!
//! ```text
//! count
//! count-distinct:<field>
//! <fn>:<field>                      fn ∈ {sum,avg,min,max,median,stddev,variance}
//! ratio:<fn>:<field>/<fn>:<field>
//! count-if:<condition>
//! sum-if:<field>:<condition>
//! ```
//!
//! Tokens may arrive comma-joined; the parser flattens first. An empty token
//! list defaults to a single `count` — there is always at least one metric.

use super::error::{MetricError, MetricResult};

/// Aggregate function usable in a `<fn>:<field>` metric.
///
/// Every variant must be handled in `as_sql()` - the compiler enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Sum,
    Avg,
    Min,
    Max,
    Median,
    Stddev,
    Variance,
}

impl AggregateFunction {
    /// Parse a function keyword, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Some(AggregateFunction::Sum),
            "avg" => Some(AggregateFunction::Avg),
            "min" => Some(AggregateFunction::Min),
            "max" => Some(AggregateFunction::Max),
            "median" => Some(AggregateFunction::Median),
            "stddev" => Some(AggregateFunction::Stddev),
            "variance" => Some(AggregateFunction::Variance),
            _ => None,
        }
    }

    /// Lowercase keyword form, as written in a metric token.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Median => "median",
            AggregateFunction::Stddev => "stddev",
            AggregateFunction::Variance => "variance",
        }
    }

    /// Uppercase query form.
    pub fn as_sql(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Median => "MEDIAN",
            AggregateFunction::Stddev => "STDDEV",
            AggregateFunction::Variance => "VARIANCE",
        }
    }

    /// Whether the function only accepts numeric fields. `min`/`max` also
    /// accept date-like fields.
    pub fn numeric_only(&self) -> bool {
        !matches!(self, AggregateFunction::Min | AggregateFunction::Max)
    }
}

impl std::fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for AggregateFunction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One side of a ratio: an aggregate function applied to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateLeg {
    pub function: AggregateFunction,
    pub field: String,
}

/// A parsed, unvalidated metric. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMetric {
    /// `count` - row count.
    Count,
    /// `<fn>:<field>`.
    FieldAggregate {
        function: AggregateFunction,
        field: String,
    },
    /// `count-distinct:<field>`.
    CountDistinct { field: String },
    /// `ratio:<fn>:<field>/<fn>:<field>`.
    Ratio {
        numerator: AggregateLeg,
        denominator: AggregateLeg,
    },
    /// `count-if:<condition>` - the condition is opaque text, may contain colons.
    CountIf { condition: String },
    /// `sum-if:<field>:<condition>`.
    SumIf { field: String, condition: String },
}

impl ParsedMetric {
    /// Short kind name, used in mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ParsedMetric::Count => "count",
            ParsedMetric::FieldAggregate { .. } => "field-aggregate",
            ParsedMetric::CountDistinct { .. } => "count-distinct",
            ParsedMetric::Ratio { .. } => "ratio",
            ParsedMetric::CountIf { .. } => "count-if",
            ParsedMetric::SumIf { .. } => "sum-if",
        }
    }
}

impl std::fmt::Display for ParsedMetric {
    /// Re-serializes the metric to its token form; `parse` of the output
    /// yields an equal AST.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParsedMetric::Count => f.write_str("count"),
            ParsedMetric::FieldAggregate { function, field } => {
                write!(f, "{}:{}", function, field)
            }
            ParsedMetric::CountDistinct { field } => write!(f, "count-distinct:{}", field),
            ParsedMetric::Ratio {
                numerator,
                denominator,
            } => write!(
                f,
                "ratio:{}:{}/{}:{}",
                numerator.function, numerator.field, denominator.function, denominator.field
            ),
            ParsedMetric::CountIf { condition } => write!(f, "count-if:{}", condition),
            ParsedMetric::SumIf { field, condition } => {
                write!(f, "sum-if:{}:{}", field, condition)
            }
        }
    }
}

/// Parse a list of raw metric tokens into an AST.
///
/// Tokens are flattened on commas and trimmed first; empty fragments are
/// dropped. An empty result defaults to a single [`ParsedMetric::Count`].
/// Parsing is all-or-nothing: the first invalid token aborts the whole
/// parse.
pub fn parse<S: AsRef<str>>(tokens: &[S]) -> MetricResult<Vec<ParsedMetric>> {
    let fragments: Vec<&str> = tokens
        .iter()
        .flat_map(|t| t.as_ref().split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if fragments.is_empty() {
        return Ok(vec![ParsedMetric::Count]);
    }

    fragments.iter().map(|t| parse_token(t)).collect()
}

fn parse_token(token: &str) -> MetricResult<ParsedMetric> {
    if token.eq_ignore_ascii_case("count") {
        return Ok(ParsedMetric::Count);
    }

    if let Some(rest) = strip_prefix_ci(token, "count-distinct:") {
        let field = rest.trim();
        if field.is_empty() {
            return Err(MetricError::invalid(token, "count-distinct requires a field"));
        }
        return Ok(ParsedMetric::CountDistinct {
            field: field.to_string(),
        });
    }

    if let Some(rest) = strip_prefix_ci(token, "count-if:") {
        let condition = rest.trim();
        if condition.is_empty() {
            return Err(MetricError::invalid(token, "count-if requires a condition"));
        }
        return Ok(ParsedMetric::CountIf {
            condition: condition.to_string(),
        });
    }

    if let Some(rest) = strip_prefix_ci(token, "sum-if:") {
        let (field, condition) = rest.split_once(':').ok_or_else(|| {
            MetricError::invalid(token, "sum-if requires a field and a condition")
        })?;
        let (field, condition) = (field.trim(), condition.trim());
        if field.is_empty() || condition.is_empty() {
            return Err(MetricError::invalid(
                token,
                "sum-if requires a field and a condition",
            ));
        }
        return Ok(ParsedMetric::SumIf {
            field: field.to_string(),
            condition: condition.to_string(),
        });
    }

    if let Some(rest) = strip_prefix_ci(token, "ratio:") {
        let (num, den) = rest.split_once('/').ok_or_else(|| {
            MetricError::invalid(token, "ratio requires '<fn>:<field>/<fn>:<field>'")
        })?;
        return Ok(ParsedMetric::Ratio {
            numerator: parse_leg(token, num)?,
            denominator: parse_leg(token, den)?,
        });
    }

    if let Some((function, field)) = token.split_once(':') {
        if let Some(function) = AggregateFunction::parse(function.trim()) {
            let field = field.trim();
            if field.is_empty() {
                return Err(MetricError::invalid(token, "aggregate requires a field"));
            }
            return Ok(ParsedMetric::FieldAggregate {
                function,
                field: field.to_string(),
            });
        }
    }

    Err(MetricError::invalid(token, "unrecognized metric syntax"))
}

fn parse_leg(token: &str, leg: &str) -> MetricResult<AggregateLeg> {
    let (function, field) = leg
        .trim()
        .split_once(':')
        .ok_or_else(|| MetricError::invalid(token, "ratio leg must be '<fn>:<field>'"))?;
    let function = AggregateFunction::parse(function.trim())
        .ok_or_else(|| MetricError::invalid(token, format!("unknown function '{}'", function.trim())))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(MetricError::invalid(token, "ratio leg requires a field"));
    }
    Ok(AggregateLeg {
        function,
        field: field.to_string(),
    })
}

/// Case-insensitive prefix strip. Prefixes are ASCII keywords.
fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}
