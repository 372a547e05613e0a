//! Best-effort literal quoting for conditional-metric predicates.
//!
//! Only simple `<field> <op> <value>` comparisons are recognized. Compound
//! conditions (`AND`/`OR`) and anything else pass through trimmed and
//! unmodified — the caller is responsible for well-formed complex
//! expressions. This is a quoting convenience, not injection protection.

use once_cell::sync::Lazy;
use regex::Regex;

/// `<field> <op> <value>`, permissive about whitespace. Longer operators
/// must be listed before their prefixes.
static SIMPLE_COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*)\s*(!=|<>|<=|>=|=|<|>)\s*(.+?)$").unwrap()
});

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").unwrap());

/// ISO date `2024-01-31` or datetime `2024-01-31T00:00:00(.000)?(Z|±hh:mm)`.
static ISO_DATE_OR_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?)?$").unwrap()
});

/// Relative date literals: `TODAY`, `THIS_QUARTER`, `LAST_N_DAYS:30`, …
static DATE_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(TODAY|YESTERDAY|TOMORROW|(THIS|LAST|NEXT)_(WEEK|MONTH|QUARTER|YEAR|FISCAL_QUARTER|FISCAL_YEAR)|(LAST|NEXT)_N_(DAYS|WEEKS|MONTHS|QUARTERS|YEARS|FISCAL_QUARTERS|FISCAL_YEARS):\d+)$",
    )
    .unwrap()
});

/// Logical connectives mark a compound condition, which is never rewritten.
static COMPOUND: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(AND|OR|NOT)\b").unwrap());

/// Normalize a conditional-metric predicate.
///
/// If the condition has the simple `<field> <op> <value>` shape and the
/// value is an unquoted bare word that is not numeric, boolean, null, a
/// relative date literal, or an ISO date/datetime, the value is
/// single-quoted with backslash and quote escaping. Everything else is
/// returned trimmed, unmodified.
pub fn normalize_condition(condition: &str) -> String {
    let trimmed = condition.trim();

    if COMPOUND.is_match(trimmed) {
        return trimmed.to_string();
    }

    let Some(caps) = SIMPLE_COMPARISON.captures(trimmed) else {
        return trimmed.to_string();
    };

    let field = &caps[1];
    let op = &caps[2];
    let value = caps[3].trim();

    if needs_quoting(value) {
        format!("{} {} {}", field, op, quote_literal(value))
    } else {
        format!("{} {} {}", field, op, value)
    }
}

fn needs_quoting(value: &str) -> bool {
    if value.starts_with('\'') || value.starts_with('"') {
        return false;
    }
    if value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("null")
    {
        return false;
    }
    if NUMERIC.is_match(value) || ISO_DATE_OR_DATETIME.is_match(value) {
        return false;
    }
    if DATE_LITERAL.is_match(value) {
        return false;
    }
    true
}

/// Single-quote a string literal, escaping backslashes and embedded quotes.
pub fn quote_literal(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}
